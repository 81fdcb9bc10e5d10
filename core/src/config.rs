use std::time::Duration;

use serde::{Deserialize, Serialize};

/// User agent attached to progressive stream requests
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_API_BASE: &str = "https://www.youtube.com";

pub const DEFAULT_INNERTUBE_CLIENT_VERSION: &str = "19.09.37";

/// Which extraction collaborator fetches the playback configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchBackend {
    /// Public player API, queried directly over HTTP
    #[default]
    Innertube,
    /// External yt-dlp (or youtube-dl) executable
    YtDlp,
}

/// Configuration for stream resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Extraction collaborator to use
    pub backend: FetchBackend,
    /// Timeout for network operations in seconds
    pub timeout_secs: u64,
    /// Browser-like user agent required when fetching progressive streams
    pub user_agent: String,
    /// Use proxy for connection (e.g., "socks5://127.0.0.1:9050")
    pub proxy: Option<String>,
    /// Path to yt-dlp executable (None for auto-detect)
    pub ytdlp_path: Option<String>,
    /// Client version reported to the player API
    pub innertube_client_version: String,
    /// Base URL of the player API
    pub api_base: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            backend: FetchBackend::default(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            ytdlp_path: None,
            innertube_client_version: DEFAULT_INNERTUBE_CLIENT_VERSION.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
