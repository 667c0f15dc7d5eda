use crate::models::{Direction, Map, SubmissionId, VoteRecord, VoterToken};

/// Sum the ledger into an aggregate per submission.
///
/// Submissions without any ledger rows are absent from the result and have
/// an aggregate of zero.
pub fn tally<'a>(records: impl IntoIterator<Item = &'a VoteRecord>) -> Map<SubmissionId> {
    let mut totals = Map::default();
    for record in records {
        *totals.entry(record.submission_id).or_insert(0) += record.direction.weight();
    }
    totals
}

/// The ledger entries held by one voter.
pub fn voter_states<'a>(
    records: impl IntoIterator<Item = &'a VoteRecord>,
    voter: &VoterToken,
) -> Map<SubmissionId, Direction> {
    records
        .into_iter()
        .filter(|record| &record.voter == voter)
        .map(|record| (record.submission_id, record.direction))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(submission_id: SubmissionId, voter: &str, direction: Direction) -> VoteRecord {
        VoteRecord {
            submission_id,
            voter: voter.parse().unwrap(),
            direction,
        }
    }

    #[test]
    fn tally_counts_ups_minus_downs() {
        let a = SubmissionId::random();
        let b = SubmissionId::random();
        let ledger = vec![
            row(a, "voter1", Direction::Up),
            row(a, "voter2", Direction::Up),
            row(a, "voter3", Direction::Down),
            row(b, "voter1", Direction::Down),
        ];

        let totals = tally(&ledger);
        assert_eq!(totals.get(&a), Some(&1));
        assert_eq!(totals.get(&b), Some(&-1));
        assert_eq!(totals.get(&SubmissionId::random()), None);
    }

    #[test]
    fn voter_states_keep_only_the_callers_rows() {
        let a = SubmissionId::random();
        let b = SubmissionId::random();
        let ledger = vec![
            row(a, "voter1", Direction::Up),
            row(a, "voter2", Direction::Down),
            row(b, "voter2", Direction::Up),
        ];

        let mine = voter_states(&ledger, &"voter2".parse().unwrap());
        assert_eq!(mine.len(), 2);
        assert_eq!(mine.get(&a), Some(&Direction::Down));
        assert_eq!(mine.get(&b), Some(&Direction::Up));
    }
}
