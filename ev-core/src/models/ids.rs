//! Strongly-typed identifiers.
//!
//! Submissions are keyed by a random UUID, voters by an opaque token and
//! posts by the numeric id extracted from their link. Using distinct types
//! keeps them from being mixed up at compile time.

use super::string_schema;
use std::fmt::Display;
use std::str::FromStr;

/// The unique, immutable identifier of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[repr(transparent)]
pub struct SubmissionId(uuid::Uuid);

impl SubmissionId {
    /// Mint a fresh, random identifier
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl From<uuid::Uuid> for SubmissionId {
    fn from(value: uuid::Uuid) -> Self {
        Self(value)
    }
}

impl From<SubmissionId> for uuid::Uuid {
    fn from(value: SubmissionId) -> Self {
        value.0
    }
}

impl FromStr for SubmissionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An opaque, per-device identifier standing in for a user identity.
///
/// A token only has to be stable for the lifetime of a device; nothing else
/// is known about the voter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct VoterToken(String);

impl VoterToken {
    /// Mint a fresh token for a device that has none yet
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// The raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A voter token was empty (or only whitespace)
#[derive(Debug, thiserror::Error)]
#[error("voter token is empty")]
pub struct EmptyToken;

impl TryFrom<String> for VoterToken {
    type Error = EmptyToken;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(EmptyToken)
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }
}

impl FromStr for VoterToken {
    type Err = EmptyToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.to_owned().try_into()
    }
}

impl From<VoterToken> for String {
    fn from(value: VoterToken) -> Self {
        value.0
    }
}

impl Display for VoterToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

string_schema!(VoterToken, "VoterToken", "\\S");

/// The numeric identifier of the external post a submission links to.
///
/// Two submissions may never share one; this is the duplicate check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct ExternalPostId(String);

impl ExternalPostId {
    /// The digits of the id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A post id contained something other than ASCII digits
#[derive(Debug, thiserror::Error)]
#[error("post id must be a non-empty string of digits, got {0:?}")]
pub struct InvalidPostId(pub String);

impl TryFrom<String> for ExternalPostId {
    type Error = InvalidPostId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(value))
        } else {
            Err(InvalidPostId(value))
        }
    }
}

impl FromStr for ExternalPostId {
    type Err = InvalidPostId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.to_owned().try_into()
    }
}

impl From<ExternalPostId> for String {
    fn from(value: ExternalPostId) -> Self {
        value.0
    }
}

impl Display for ExternalPostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

string_schema!(ExternalPostId, "ExternalPostId", "^[0-9]+$");
