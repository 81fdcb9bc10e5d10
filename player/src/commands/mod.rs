use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;
use smartmedia_core::{
    CoordinatorPhase, MediaSource, ReferenceKind, ResolverConfig, VideoReference, classify,
    create_coordinator, create_resolver, resolve_media_source,
};

use crate::console::{ConsoleEmbeddedPlayer, ConsoleSpeech, ConsoleStreamingPlayer};

/// Extra time allowed past the fetch timeout before giving up on a resolution
const SETTLE_GRACE: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct Resolution<'a> {
    reference: &'a str,
    classification: ReferenceKind,
    source: MediaSource,
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Print how a reference is classified
pub fn print_classification(raw: &str) -> Result<()> {
    let reference = VideoReference::new(raw)?;
    emit(&classify(&reference))
}

/// Print the source a reference resolves to
pub async fn print_resolution(config: &ResolverConfig, raw: &str) -> Result<()> {
    let reference = VideoReference::new(raw)?;
    let resolver = create_resolver(config).context("Failed to set up extraction")?;

    let source = resolve_media_source(&resolver, &reference, &config.user_agent)
        .await
        .with_context(|| format!("Failed to resolve {}", reference))?;

    emit(&Resolution {
        reference: raw,
        classification: classify(&reference),
        source,
    })
}

pub async fn watch(config: &ResolverConfig, references: &[String]) -> Result<()> {
    let coordinator = create_coordinator(
        config,
        Box::new(ConsoleStreamingPlayer::default()),
        Box::new(ConsoleEmbeddedPlayer::default()),
        Box::new(ConsoleSpeech::default()),
    )
    .context("Failed to set up extraction")?;
    let mut states = coordinator.subscribe();
    let deadline = config.timeout() + SETTLE_GRACE;

    for raw in references {
        let reference = VideoReference::new(raw.as_str())?;
        coordinator.select_reference(reference)?;
        let state = states.borrow_and_update().clone();
        emit(&state)?;

        while states.borrow().phase == CoordinatorPhase::ResolvingHosted {
            match tokio::time::timeout(deadline, states.changed()).await {
                Ok(Ok(())) => {
                    let state = states.borrow_and_update().clone();
                    emit(&state)?;
                }
                Ok(Err(_)) => break,
                Err(_) => {
                    warn!("Resolution of {} did not settle within {:?}", raw, deadline);
                    break;
                }
            }
        }
    }

    coordinator.dispose();
    emit(&coordinator.state())
}
