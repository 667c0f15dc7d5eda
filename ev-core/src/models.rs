mod category;
mod ids;
mod map;
mod submission;
mod timestamp;
mod view;
mod vote;

pub use category::{BASE_CATEGORIES, CATEGORY_ALL, Category, CategoryFilter, CategoryRegistry};
pub use ids::{ExternalPostId, SubmissionId, VoterToken};
pub use map::Map;
pub use submission::Submission;
pub use timestamp::Timestamp;
pub use view::{LEADERBOARD_SIZE, SortOption, leaderboard, project};
pub use vote::{Direction, VoteOutcome, VoteRecord, VoterState};

// The string newtypes below validate on the way in, so (de)serialization goes
// through `String` and the JSON schema is written by hand.
macro_rules! string_schema {
    ($struct:ident, $name:literal, $pattern:literal) => {
        #[cfg(feature = "schemars")]
        impl schemars::JsonSchema for $struct {
            fn inline_schema() -> bool {
                true
            }

            fn schema_name() -> std::borrow::Cow<'static, str> {
                $name.into()
            }

            fn json_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
                schemars::json_schema!({
                    "type": "string",
                    "pattern": $pattern,
                })
            }
        }
    };
}

pub(crate) use string_schema;
