mod reference;
mod resolver;
mod stream;
mod youtube;

pub use reference::{ReferenceKind, VideoReference, classify, extract_youtube_id};
pub use resolver::{PlaybackConfigFetcher, StreamResolver, select_locator};
pub use stream::{LocatorKind, MediaSource, PlaybackConfig, ResolvedLocator, SourceKind, StreamCandidate};
pub use youtube::{InnertubeFetcher, YtDlpFetcher, fetcher_for, parse_player_response};

/// Generic streaming player that plays a concrete locator
pub trait StreamingPlayer: Send {
    /// Load, prepare and start playing a source
    fn load(&mut self, source: &MediaSource) -> anyhow::Result<()>;

    /// Stop playback, keeping the player reusable
    fn stop(&mut self);

    /// Release decoder and network resources for good
    fn release(&mut self);
}

/// Hosted-site embedded player that resolves and renders a site id on its own
pub trait EmbeddedPlayer: Send {
    fn load_video(&mut self, site_id: &str) -> anyhow::Result<()>;

    /// Stop the current video; the player stays usable
    fn stop(&mut self);

    fn release(&mut self);
}
