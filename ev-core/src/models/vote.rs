use super::{SubmissionId, VoterToken};

/// The direction of a vote, or of a request to vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Direction {
    /// An upvote, worth +1
    Up,
    /// A downvote, worth -1
    Down,
}

impl Direction {
    /// The contribution of a vote in this direction to the aggregate
    pub const fn weight(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// The wire representation, as stored in the `vote` column
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("unknown vote direction {other:?}")),
        }
    }
}

/// One voter's current stance on one submission.
///
/// The ledger holds at most one entry per (submission, voter) pair, so a
/// voter is always in exactly one of these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum VoterState {
    /// No vote cast, or the vote was retracted
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "none"))]
    NoVote,
    /// Currently upvoted
    Up,
    /// Currently downvoted
    Down,
}

impl VoterState {
    /// Apply a vote request, returning the new state and the aggregate delta.
    ///
    /// From `NoVote` the requested direction is acquired. From any held vote,
    /// either direction only retracts it: the opposite vote has to be
    /// requested again from `NoVote`. The aggregate therefore never moves by
    /// more than one per action.
    pub const fn transition(self, requested: Direction) -> (Self, i64) {
        match self {
            Self::NoVote => (Self::held(requested), requested.weight()),
            Self::Up => (Self::NoVote, -Direction::Up.weight()),
            Self::Down => (Self::NoVote, -Direction::Down.weight()),
        }
    }

    /// The ledger entry for this state, if any
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::NoVote => None,
            Self::Up => Some(Direction::Up),
            Self::Down => Some(Direction::Down),
        }
    }

    const fn held(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
        }
    }
}

impl From<Option<Direction>> for VoterState {
    fn from(value: Option<Direction>) -> Self {
        match value {
            None => Self::NoVote,
            Some(direction) => Self::held(direction),
        }
    }
}

/// The result of applying a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoteOutcome {
    /// The submission's aggregate after the vote
    pub new_aggregate: i64,
    /// The voter's state after the vote
    pub new_voter_state: VoterState,
}

/// A single ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoteRecord {
    /// The submission voted on
    pub submission_id: SubmissionId,
    /// The voter
    pub voter: VoterToken,
    /// The direction of the vote
    pub direction: Direction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(VoterState::NoVote, Direction::Up, VoterState::Up, 1)]
    #[case(VoterState::NoVote, Direction::Down, VoterState::Down, -1)]
    #[case(VoterState::Up, Direction::Up, VoterState::NoVote, -1)]
    #[case(VoterState::Up, Direction::Down, VoterState::NoVote, -1)]
    #[case(VoterState::Down, Direction::Down, VoterState::NoVote, 1)]
    #[case(VoterState::Down, Direction::Up, VoterState::NoVote, 1)]
    fn transition_table(
        #[case] current: VoterState,
        #[case] requested: Direction,
        #[case] next: VoterState,
        #[case] delta: i64,
    ) {
        assert_eq!(current.transition(requested), (next, delta));
    }

    #[test]
    fn same_direction_twice_is_a_no_op() {
        let (state, first) = VoterState::NoVote.transition(Direction::Up);
        let (state, second) = state.transition(Direction::Up);
        assert_eq!(state, VoterState::NoVote);
        assert_eq!(first + second, 0);
    }

    #[test]
    fn switching_sides_takes_two_actions() {
        let (state, first) = VoterState::Up.transition(Direction::Down);
        assert_eq!((state, first), (VoterState::NoVote, -1));
        let (state, second) = state.transition(Direction::Down);
        assert_eq!((state, second), (VoterState::Down, -1));
    }

    #[test]
    fn states_serialize_in_lowercase() {
        assert_eq!(serde_json::to_string(&VoterState::NoVote).unwrap(), r#""none""#);
        assert_eq!(serde_json::to_string(&Direction::Down).unwrap(), r#""down""#);
        assert_eq!("up".parse::<Direction>(), Ok(Direction::Up));
    }
}
