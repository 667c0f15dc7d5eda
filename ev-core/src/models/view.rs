use super::{CategoryFilter, Submission};
use std::str::FromStr;

/// The number of entries on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 5;

/// The ordering of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SortOption {
    /// Highest aggregate first
    #[default]
    Trending,
    /// Most recent first
    Newest,
    /// Highest aggregate first (same ordering as `Trending`)
    Top,
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trending" => Ok(Self::Trending),
            "newest" => Ok(Self::Newest),
            "top" => Ok(Self::Top),
            other => Err(format!("unknown sort option {other:?}")),
        }
    }
}

/// Filter a snapshot by category, then order it.
///
/// The sort is stable, so submissions with equal keys keep their snapshot
/// order.
pub fn project<'a>(
    submissions: &'a [Submission],
    filter: &CategoryFilter,
    sort: SortOption,
) -> Vec<&'a Submission> {
    let mut view: Vec<&Submission> = submissions
        .iter()
        .filter(|submission| filter.accepts(&submission.category))
        .collect();

    match sort {
        SortOption::Trending | SortOption::Top => {
            view.sort_by(|a, b| b.vote_count.cmp(&a.vote_count))
        }
        SortOption::Newest => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }

    view
}

/// The `size` highest-voted submissions, ignoring any category filter.
pub fn leaderboard(submissions: &[Submission], size: usize) -> Vec<&Submission> {
    let mut view = project(submissions, &CategoryFilter::All, SortOption::Top);
    view.truncate(size);
    view
}
