use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::error::{FetchError, ResolutionError};
use crate::media::stream::{PlaybackConfig, ResolvedLocator, StreamCandidate};

/// Fetches and parses the playback configuration of a hosted video
#[async_trait]
pub trait PlaybackConfigFetcher: Send + Sync {
    async fn fetch_playback_config(&self, site_id: &str) -> Result<PlaybackConfig, FetchError>;
}

/// Resolves hosted-site ids into a single playable locator
#[derive(Clone)]
pub struct StreamResolver {
    fetcher: Arc<dyn PlaybackConfigFetcher>,
}

impl StreamResolver {
    pub fn new(fetcher: Arc<dyn PlaybackConfigFetcher>) -> Self {
        Self { fetcher }
    }

    /// One fetch, then candidate selection. No retries.
    pub async fn resolve(&self, site_id: &str) -> Result<ResolvedLocator, ResolutionError> {
        info!("Resolving stream for {}", site_id);
        let config = self.fetcher.fetch_playback_config(site_id).await.map_err(|e| {
            warn!("Extraction failed for {}: {}", site_id, e);
            ResolutionError::from(e)
        })?;

        debug!(
            "Playback config for {}: {} adaptive, {} muxed, live={}",
            site_id,
            config.adaptive.len(),
            config.muxed.len(),
            config.is_live_content
        );

        match select_locator(&config) {
            Ok(locator) => {
                info!("Resolved {} to a {:?} locator", site_id, locator.kind);
                Ok(locator)
            }
            Err(e) => {
                warn!("No playable stream for {}", site_id);
                Err(e)
            }
        }
    }
}

/// Pick the locator to play from a parsed configuration.
///
/// Highest-bitrate adaptive stream, then highest-bitrate muxed stream, then
/// (live content only) the DASH manifest before the HLS one.
pub fn select_locator(config: &PlaybackConfig) -> Result<ResolvedLocator, ResolutionError> {
    if let Some(url) = best_candidate(&config.adaptive) {
        return Ok(ResolvedLocator::progressive(url));
    }

    if let Some(url) = best_candidate(&config.muxed) {
        return Ok(ResolvedLocator::progressive(url));
    }

    if config.is_live_content {
        let manifest = non_empty(&config.dash_manifest_url).or_else(|| non_empty(&config.hls_manifest_url));
        if let Some(url) = manifest {
            return Ok(ResolvedLocator::manifest(url));
        }
    }

    Err(ResolutionError::NoPlayableStream)
}

/// First candidate with the highest bitrate among those with a usable url
fn best_candidate(candidates: &[StreamCandidate]) -> Option<&str> {
    candidates
        .iter()
        .filter(|c| c.usable_url().is_some())
        .min_by_key(|c| Reverse(c.bitrate))
        .and_then(StreamCandidate::usable_url)
}

fn non_empty(url: &Option<String>) -> Option<&str> {
    url.as_deref().filter(|url| !url.is_empty())
}
