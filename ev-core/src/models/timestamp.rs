use std::fmt::Display;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// A creation time, in milliseconds since the Unix epoch.
///
/// Millisecond integers are what both the JSON documents of the local store
/// and the `timestamp` column of the shared store hold, and they order the
/// same way as the instants they represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The current system time
    pub fn now() -> Self {
        OffsetDateTime::now_utc().into()
    }

    /// Construct from a raw millisecond count
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// The raw millisecond count
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Shift this timestamp by a signed number of milliseconds
    pub const fn offset_millis(self, delta: i64) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(value: OffsetDateTime) -> Self {
        Self((value.unix_timestamp_nanos() / 1_000_000) as i64)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nanos = self.0 as i128 * 1_000_000;
        match OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .ok()
            .and_then(|value| value.format(&Rfc3339).ok())
        {
            Some(formatted) => f.write_str(&formatted),
            None => write!(f, "{}ms", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_rfc3339() {
        let ts = Timestamp::from_millis(1_700_000_000_123);
        assert_eq!(ts.to_string(), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn orders_by_instant() {
        let earlier = Timestamp::from_millis(10);
        assert!(earlier < earlier.offset_millis(1));
        assert!(Timestamp::now() > earlier);
    }
}
