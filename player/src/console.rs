//! Console stand-ins for the playback surfaces: they log what a real
//! player would be asked to do.

use anyhow::Result;
use log::info;
use smartmedia_core::{EmbeddedPlayer, MediaSource, SpeechSynthesizer, StreamingPlayer};

#[derive(Default)]
pub struct ConsoleStreamingPlayer {
    current: Option<MediaSource>,
}

impl StreamingPlayer for ConsoleStreamingPlayer {
    fn load(&mut self, source: &MediaSource) -> Result<()> {
        let headers = source
            .headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join(", ");
        info!("[generic] load {:?} {} [{}]", source.kind, source.url, headers);
        self.current = Some(source.clone());
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(source) = self.current.take() {
            info!("[generic] stop {}", source.url);
        }
    }

    fn release(&mut self) {
        self.current = None;
        info!("[generic] release");
    }
}

#[derive(Default)]
pub struct ConsoleEmbeddedPlayer {
    current: Option<String>,
}

impl EmbeddedPlayer for ConsoleEmbeddedPlayer {
    fn load_video(&mut self, site_id: &str) -> Result<()> {
        info!("[embedded] load {}", site_id);
        self.current = Some(site_id.to_string());
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(site_id) = self.current.take() {
            info!("[embedded] stop {}", site_id);
        }
    }

    fn release(&mut self) {
        match self.current.take() {
            Some(site_id) => info!("[embedded] release ({})", site_id),
            None => info!("[embedded] release"),
        }
    }
}

#[derive(Default)]
pub struct ConsoleSpeech {
    speaking: bool,
}

impl SpeechSynthesizer for ConsoleSpeech {
    fn speak(&mut self, text: &str) -> Result<()> {
        info!("[speech] {}", text);
        self.speaking = true;
        Ok(())
    }

    fn pause(&mut self) {
        info!("[speech] pause");
    }

    fn resume(&mut self) {
        info!("[speech] resume");
    }

    fn stop(&mut self) {
        if self.speaking {
            info!("[speech] stop");
        }
        self.speaking = false;
    }

    fn shutdown(&mut self) {
        self.stop();
        info!("[speech] shutdown");
    }
}
