use std::fmt;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::ReferenceError;

/// Short link, `embed/`, `v/`, `watch?v=` and `watch?...&v=` forms, followed by the 11 character id
static YOUTUBE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:https?://(?:www\.)?|www\.)(?:youtu\.be/|youtube\.com/(?:embed/|v/|watch\?v=|watch\?.+&v=))([A-Za-z0-9_-]{11})",
    )
    .expect("hosted site URL pattern is valid")
});

/// A raw, non-empty video reference supplied by the user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoReference(String);

impl VideoReference {
    pub fn new(raw: impl Into<String>) -> Result<Self, ReferenceError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ReferenceError::Empty);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for VideoReference {
    type Error = ReferenceError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

/// What a reference points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Already a fetchable locator, used verbatim
    DirectMedia { locator: String },
    /// A hosted-site page that needs extraction
    HostedPage { site_id: String },
}

/// Classify a reference. Never fails: anything that is not a recognised
/// hosted-site URL is treated as a direct locator.
pub fn classify(reference: &VideoReference) -> ReferenceKind {
    let kind = match extract_youtube_id(reference.as_str()) {
        Some(site_id) => ReferenceKind::HostedPage { site_id },
        None => ReferenceKind::DirectMedia {
            locator: reference.as_str().to_string(),
        },
    };
    debug!("Classified {} as {:?}", reference, kind);
    kind
}

/// Helper function to extract YouTube video ID from URL
pub fn extract_youtube_id(url: &str) -> Option<String> {
    YOUTUBE_URL
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}
