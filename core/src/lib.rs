pub mod config;
pub mod coordinator;
pub mod error;
pub mod media;
pub mod narration;
#[cfg(test)]
mod testing;

// Re-exports
pub use config::{FetchBackend, ResolverConfig};
pub use coordinator::{ActiveSurface, CoordinatorPhase, PlaybackCoordinator, PlaybackSurfaceState};
pub use error::{CoordinatorError, FetchError, ReferenceError, ResolutionError};
pub use media::{
    EmbeddedPlayer, LocatorKind, MediaSource, PlaybackConfig, PlaybackConfigFetcher, ReferenceKind,
    ResolvedLocator, SourceKind, StreamCandidate, StreamResolver, StreamingPlayer, VideoReference,
    classify,
};
pub use narration::{SUMMARY_INSTRUCTION, SpeechSynthesizer, SummaryController, SummaryState, Summarizer};

/// Build a resolver backed by the configured extraction collaborator
pub fn create_resolver(config: &ResolverConfig) -> Result<StreamResolver, FetchError> {
    Ok(StreamResolver::new(media::fetcher_for(config)?))
}

/// Create a coordinator wired to the given players and speech engine
pub fn create_coordinator(
    config: &ResolverConfig,
    generic: Box<dyn StreamingPlayer>,
    embedded: Box<dyn EmbeddedPlayer>,
    speech: Box<dyn SpeechSynthesizer>,
) -> Result<PlaybackCoordinator, FetchError> {
    Ok(PlaybackCoordinator::new(
        create_resolver(config)?,
        generic,
        embedded,
        speech,
        config.user_agent.clone(),
    ))
}

/// Resolve a reference to the source the generic player would load: direct
/// references come back verbatim, hosted ones go through the resolver.
pub async fn resolve_media_source(
    resolver: &StreamResolver,
    reference: &VideoReference,
    user_agent: &str,
) -> Result<MediaSource, ResolutionError> {
    match classify(reference) {
        ReferenceKind::DirectMedia { locator } => Ok(MediaSource::literal(locator)),
        ReferenceKind::HostedPage { site_id } => {
            let locator = resolver.resolve(&site_id).await?;
            Ok(locator.into_media_source(user_agent))
        }
    }
}
