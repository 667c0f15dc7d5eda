use crate::Rejection;
use crate::models::{Category, ExternalPostId};
use regex::Regex;
use std::sync::LazyLock;

/// The longest caption accepted, in characters.
pub const MAX_CAPTION_CHARS: usize = 60;

/// The longest author handle accepted (after normalization), in characters.
pub const MAX_AUTHOR_CHARS: usize = 20;

/// The handle used when a submitter leaves the author blank.
pub const ANONYMOUS_AUTHOR: &str = "Anonim Editor";

static POST_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(www\.)?(twitter\.com|x\.com)/[A-Za-z0-9_]+/status/[0-9]+")
        .expect("static regex")
});

static STATUS_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/status/([0-9]+)").expect("static regex"));

/// Extract the numeric post id from a `/status/<digits>` path segment.
pub fn extract_post_id(url: &str) -> Option<ExternalPostId> {
    STATUS_SEGMENT
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Trim a handle and strip its leading `@`s, falling back to
/// [`ANONYMOUS_AUTHOR`] when nothing is left.
pub fn normalize_author(raw: &str) -> String {
    let stripped = raw.trim().trim_start_matches('@').trim();
    if stripped.is_empty() {
        ANONYMOUS_AUTHOR.to_owned()
    } else {
        stripped.to_owned()
    }
}

/// Render a stored handle for display.
pub fn format_author(author: &str) -> String {
    let clean = author.trim();
    if clean.is_empty() {
        ANONYMOUS_AUTHOR.to_owned()
    } else if clean == ANONYMOUS_AUTHOR {
        clean.to_owned()
    } else {
        format!("@{clean}")
    }
}

/// The raw fields of a submission form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Draft {
    /// The link to the post
    pub source_url: String,
    /// A short description
    pub caption: String,
    /// The editor's handle, with or without a leading `@`
    #[cfg_attr(feature = "serde", serde(default))]
    pub author: String,
    /// A category tag, normalized on admission
    pub category: String,
}

/// A draft that passed every check that does not need the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    /// The trimmed link
    pub source_url: String,
    /// The post id extracted from the link
    pub external_post_id: ExternalPostId,
    /// The trimmed caption
    pub caption: String,
    /// The normalized author
    pub author: String,
    /// The normalized category
    pub category: Category,
}

impl Draft {
    /// Run the validation pipeline, stopping at the first failure.
    ///
    /// The duplicate check needs the authoritative store and is left to
    /// [`crate::engine::submit`].
    pub fn validate(&self) -> Result<ValidDraft, Rejection> {
        let source_url = self.source_url.trim();
        if !POST_LINK.is_match(source_url) {
            return Err(Rejection::InvalidLink);
        }
        let external_post_id = extract_post_id(source_url).ok_or(Rejection::InvalidLink)?;

        let caption = self.caption.trim();
        if caption.is_empty() {
            return Err(Rejection::EmptyCaption);
        }
        if caption.chars().count() > MAX_CAPTION_CHARS {
            return Err(Rejection::CaptionTooLong);
        }

        let author = normalize_author(&self.author);
        if author.chars().count() > MAX_AUTHOR_CHARS {
            return Err(Rejection::AuthorTooLong);
        }

        let category = Category::parse(&self.category).ok_or(Rejection::InvalidCategory)?;

        Ok(ValidDraft {
            source_url: source_url.to_owned(),
            external_post_id,
            caption: caption.to_owned(),
            author,
            category,
        })
    }
}
