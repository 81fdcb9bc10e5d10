use serde::Serialize;

/// One encoding offered by the extraction response
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamCandidate {
    /// Sole quality ranking key, no unit assumed
    pub bitrate: i64,
    /// Missing for ciphered entries
    pub url: Option<String>,
}

impl StreamCandidate {
    pub fn new(bitrate: i64, url: impl Into<String>) -> Self {
        Self {
            bitrate,
            url: Some(url.into()),
        }
    }

    /// The url, if present and non-empty
    pub fn usable_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Parsed playback configuration for one hosted video
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackConfig {
    /// Video-only or split audio/video streams
    pub adaptive: Vec<StreamCandidate>,
    /// Combined audio+video streams
    pub muxed: Vec<StreamCandidate>,
    /// Manifests are only considered when this is set
    pub is_live_content: bool,
    /// DASH manifest, preferred over HLS
    pub dash_manifest_url: Option<String>,
    /// HLS master playlist
    pub hls_manifest_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorKind {
    /// Flat media file; must be fetched with the browser-like user agent
    Progressive,
    /// Live DASH or HLS manifest
    Manifest,
}

/// A concrete, directly fetchable media locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLocator {
    pub url: String,
    pub kind: LocatorKind,
}

impl ResolvedLocator {
    pub fn progressive(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: LocatorKind::Progressive,
        }
    }

    pub fn manifest(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: LocatorKind::Manifest,
        }
    }

    /// Build the source handed to the streaming player, attaching the
    /// request headers the locator kind requires.
    pub fn into_media_source(self, user_agent: &str) -> MediaSource {
        match self.kind {
            LocatorKind::Progressive => MediaSource {
                url: self.url,
                kind: SourceKind::Progressive,
                headers: vec![("User-Agent".to_string(), user_agent.to_string())],
            },
            LocatorKind::Manifest => MediaSource {
                url: self.url,
                kind: SourceKind::Manifest,
                headers: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Progressive,
    Manifest,
    /// Caller-supplied locator, loaded as-is
    Literal,
}

/// What the streaming player is asked to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaSource {
    pub url: String,
    pub kind: SourceKind,
    pub headers: Vec<(String, String)>,
}

impl MediaSource {
    pub fn literal(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: SourceKind::Literal,
            headers: Vec::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
