use std::sync::Arc;

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{CoordinatorError, ResolutionError};
use crate::media::{
    EmbeddedPlayer, MediaSource, ReferenceKind, ResolvedLocator, StreamResolver, StreamingPlayer,
    VideoReference, classify,
};
use crate::narration::SpeechSynthesizer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorPhase {
    /// No reference selected
    #[default]
    Idle,
    /// Embedded player loading, fallback resolution in flight
    ResolvingHosted,
    PlayingGeneric,
    PlayingHosted,
    Failed,
}

/// Which of the two mutually exclusive playback surfaces is visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveSurface {
    #[default]
    None,
    Generic,
    HostedEmbedded,
}

/// State published to the playback surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackSurfaceState {
    pub phase: CoordinatorPhase,
    pub active_surface: ActiveSurface,
    /// Site id the embedded player was given
    pub hosted_site_id: Option<String>,
    /// Active surface is loading or buffering
    pub is_loading: bool,
    /// Best-effort locator resolved for the hosted video
    pub fallback: Option<ResolvedLocator>,
    /// User-visible playback error
    pub error: Option<String>,
}

/// Identifies the reference change a resolution was started for
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolutionTicket {
    generation: u64,
    reference: VideoReference,
}

struct Inner {
    /// Plays direct media and resolved fallbacks
    generic: Box<dyn StreamingPlayer>,
    /// Plays hosted videos by site id
    embedded: Box<dyn EmbeddedPlayer>,
    speech: Box<dyn SpeechSynthesizer>,
    /// Bumped on every reference change
    generation: u64,
    /// Reference currently selected, if any
    reference: Option<VideoReference>,
    /// In-flight fallback resolution
    resolution: Option<JoinHandle<()>>,
    /// Embedded player reported an error for the current reference
    embedded_failed: bool,
    /// Players have been released
    disposed: bool,
}

impl Inner {
    fn is_current(&self, ticket: &ResolutionTicket) -> bool {
        !self.disposed
            && self.generation == ticket.generation
            && self.reference.as_ref() == Some(&ticket.reference)
    }

    /// Start a new reference change, superseding whatever was in flight
    fn advance(&mut self, reference: Option<VideoReference>) -> u64 {
        if let Some(task) = self.resolution.take() {
            task.abort();
        }
        self.generation += 1;
        self.reference = reference;
        self.embedded_failed = false;
        self.generation
    }
}

struct Shared {
    inner: Mutex<Inner>,
    state: watch::Sender<PlaybackSurfaceState>,
    user_agent: String,
}

impl Shared {
    fn publish(&self, state: PlaybackSurfaceState) {
        debug!("Playback state: {:?}", state);
        self.state.send_replace(state);
    }

    fn update(&self, f: impl FnOnce(&mut PlaybackSurfaceState)) {
        self.state.send_modify(|state| {
            f(state);
            debug!("Playback state: {:?}", state);
        });
    }

    fn apply_resolution(
        &self,
        ticket: &ResolutionTicket,
        result: Result<ResolvedLocator, ResolutionError>,
    ) {
        let mut inner = self.inner.lock();
        if !inner.is_current(ticket) {
            debug!("Discarding stale resolution for {}", ticket.reference);
            return;
        }
        inner.resolution = None;

        match result {
            Ok(locator) if inner.embedded_failed => self.play_fallback(&mut inner, locator),
            Ok(locator) => self.update(|state| {
                state.phase = CoordinatorPhase::PlayingHosted;
                state.fallback = Some(locator);
            }),
            Err(e) => {
                // The embedded player keeps going on its own
                warn!("Fallback resolution for {} failed: {}", ticket.reference, e);
                let embedded_failed = inner.embedded_failed;
                self.update(|state| {
                    state.phase = CoordinatorPhase::Failed;
                    if embedded_failed {
                        state.is_loading = false;
                    }
                });
            }
        }
    }

    /// Move a hosted video onto the generic surface using its resolved locator
    fn play_fallback(&self, inner: &mut Inner, locator: ResolvedLocator) {
        info!("Switching to generic playback of {:?} locator", locator.kind);
        let source = locator.clone().into_media_source(&self.user_agent);
        inner.embedded.stop();
        let mut state = PlaybackSurfaceState {
            phase: CoordinatorPhase::PlayingGeneric,
            active_surface: ActiveSurface::Generic,
            hosted_site_id: None,
            is_loading: true,
            fallback: Some(locator),
            error: None,
        };
        if let Err(e) = inner.generic.load(&source) {
            error!("Failed to load fallback stream: {:#}", e);
            state.phase = CoordinatorPhase::Failed;
            state.is_loading = false;
            state.error = Some(e.to_string());
        }
        self.publish(state);
    }
}

/// Selects and drives the single active playback surface of a screen
pub struct PlaybackCoordinator {
    shared: Arc<Shared>,
    resolver: StreamResolver,
}

impl PlaybackCoordinator {
    pub fn new(
        resolver: StreamResolver,
        generic: Box<dyn StreamingPlayer>,
        embedded: Box<dyn EmbeddedPlayer>,
        speech: Box<dyn SpeechSynthesizer>,
        user_agent: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(PlaybackSurfaceState::default());
        let inner = Inner {
            generic,
            embedded,
            speech,
            generation: 0,
            reference: None,
            resolution: None,
            embedded_failed: false,
            disposed: false,
        };

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                state,
                user_agent: user_agent.into(),
            }),
            resolver,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSurfaceState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> PlaybackSurfaceState {
        self.shared.state.borrow().clone()
    }

    /// Switch playback to a new reference. Must be called from within a tokio runtime.
    pub fn select_reference(&self, reference: VideoReference) -> Result<(), CoordinatorError> {
        let mut inner = self.shared.inner.lock();
        if inner.disposed {
            return Err(CoordinatorError::Disposed);
        }

        let generation = inner.advance(Some(reference.clone()));
        // Narration of the previous video is stale now
        inner.speech.stop();

        match classify(&reference) {
            ReferenceKind::DirectMedia { locator } => {
                info!("Playing direct media {}", locator);
                inner.embedded.stop();
                let mut state = PlaybackSurfaceState {
                    phase: CoordinatorPhase::PlayingGeneric,
                    active_surface: ActiveSurface::Generic,
                    is_loading: true,
                    ..Default::default()
                };
                if let Err(e) = inner.generic.load(&MediaSource::literal(locator)) {
                    error!("Failed to load {}: {:#}", reference, e);
                    state.phase = CoordinatorPhase::Failed;
                    state.is_loading = false;
                    state.error = Some(e.to_string());
                }
                self.shared.publish(state);
            }
            ReferenceKind::HostedPage { site_id } => {
                info!("Playing hosted video {}", site_id);
                inner.generic.stop();
                self.shared.publish(PlaybackSurfaceState {
                    phase: CoordinatorPhase::ResolvingHosted,
                    active_surface: ActiveSurface::HostedEmbedded,
                    hosted_site_id: Some(site_id.clone()),
                    is_loading: true,
                    ..Default::default()
                });

                if let Err(e) = inner.embedded.load_video(&site_id) {
                    error!("Embedded player failed to load {}: {:#}", site_id, e);
                    inner.embedded_failed = true;
                    self.shared.update(|state| {
                        state.is_loading = false;
                        state.error = Some(e.to_string());
                    });
                }

                let ticket = ResolutionTicket {
                    generation,
                    reference,
                };
                let shared = self.shared.clone();
                let resolver = self.resolver.clone();
                inner.resolution = Some(tokio::spawn(async move {
                    let result = resolver.resolve(&site_id).await;
                    shared.apply_resolution(&ticket, result);
                }));
            }
        }

        Ok(())
    }

    /// Return to `Idle`, stopping playback and narration
    pub fn clear(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.disposed {
            return;
        }
        inner.advance(None);
        inner.speech.stop();
        inner.generic.stop();
        inner.embedded.stop();
        self.shared.publish(PlaybackSurfaceState::default());
    }

    /// Buffering observation from a player; only the visible surface counts
    pub fn report_buffering(&self, surface: ActiveSurface, buffering: bool) {
        let _inner = self.shared.inner.lock();
        if self.shared.state.borrow().active_surface != surface {
            return;
        }
        self.shared.update(|state| state.is_loading = buffering);
    }

    /// Load failure reported by a player
    pub fn report_playback_error(&self, surface: ActiveSurface, message: impl Into<String>) {
        let message = message.into();
        let mut inner = self.shared.inner.lock();
        let current = self.shared.state.borrow().clone();
        if inner.disposed || current.active_surface != surface {
            debug!("Ignoring error from inactive {:?} surface: {}", surface, message);
            return;
        }

        match surface {
            ActiveSurface::HostedEmbedded => {
                warn!("Embedded player error: {}", message);
                inner.embedded_failed = true;
                match current.fallback {
                    Some(locator) => self.shared.play_fallback(&mut inner, locator),
                    None => self.shared.update(|state| {
                        state.phase = CoordinatorPhase::Failed;
                        state.is_loading = false;
                        state.error = Some(message);
                    }),
                }
            }
            ActiveSurface::Generic => {
                error!("Playback error: {}", message);
                self.shared.update(|state| {
                    state.phase = CoordinatorPhase::Failed;
                    state.is_loading = false;
                    state.error = Some(message);
                });
            }
            ActiveSurface::None => {}
        }
    }

    /// Tear down: release both players and abort any in-flight resolution.
    /// Safe to call more than once.
    pub fn dispose(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.disposed {
            return;
        }
        inner.advance(None);
        inner.disposed = true;
        inner.generic.release();
        inner.embedded.release();
        inner.speech.shutdown();
        self.shared.publish(PlaybackSurfaceState::default());
        info!("Playback coordinator disposed");
    }
}

impl Drop for PlaybackCoordinator {
    fn drop(&mut self) {
        self.dispose();
    }
}
