//! Recording fakes for the external collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use parking_lot::Mutex;
use tokio::sync::{Notify, oneshot};

use crate::error::FetchError;
use crate::media::{EmbeddedPlayer, MediaSource, PlaybackConfig, PlaybackConfigFetcher, StreamingPlayer};
use crate::narration::{SpeechSynthesizer, Summarizer};

/// Ordered log of collaborator calls, shared between fakes
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

#[derive(Default)]
struct FetcherState {
    configs: HashMap<String, PlaybackConfig>,
    gates: HashMap<String, Arc<Notify>>,
    calls: Vec<String>,
}

/// Serves canned configurations; unknown ids are rejected by the "site"
#[derive(Clone, Default)]
pub struct StaticFetcher {
    state: Arc<Mutex<FetcherState>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(self, site_id: &str, config: PlaybackConfig) -> Self {
        self.state.lock().configs.insert(site_id.to_string(), config);
        self
    }

    /// Hold fetches for `site_id` until the returned gate is notified
    pub fn gate(&self, site_id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().gates.insert(site_id.to_string(), gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl PlaybackConfigFetcher for StaticFetcher {
    async fn fetch_playback_config(&self, site_id: &str) -> Result<PlaybackConfig, FetchError> {
        let gate = {
            let mut state = self.state.lock();
            state.calls.push(site_id.to_string());
            state.gates.get(site_id).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.state
            .lock()
            .configs
            .get(site_id)
            .cloned()
            .ok_or_else(|| FetchError::Rejected {
                status: "ERROR".to_string(),
                reason: "Video unavailable".to_string(),
            })
    }
}

pub struct RecordingStreamingPlayer {
    log: CallLog,
    fail_loads: bool,
}

impl RecordingStreamingPlayer {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail_loads: false,
        }
    }

    pub fn failing(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail_loads: true,
        }
    }
}

impl StreamingPlayer for RecordingStreamingPlayer {
    fn load(&mut self, source: &MediaSource) -> anyhow::Result<()> {
        let user_agent = source.header("User-Agent").unwrap_or("-");
        self.log.push(format!(
            "generic.load {:?} {} ua={}",
            source.kind, source.url, user_agent
        ));
        if self.fail_loads {
            return Err(anyhow!("Source error: unable to open {}", source.url));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.log.push("generic.stop");
    }

    fn release(&mut self) {
        self.log.push("generic.release");
    }
}

pub struct RecordingEmbeddedPlayer {
    log: CallLog,
}

impl RecordingEmbeddedPlayer {
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone() }
    }
}

impl EmbeddedPlayer for RecordingEmbeddedPlayer {
    fn load_video(&mut self, site_id: &str) -> anyhow::Result<()> {
        self.log.push(format!("embedded.load {}", site_id));
        Ok(())
    }

    fn stop(&mut self) {
        self.log.push("embedded.stop");
    }

    fn release(&mut self) {
        self.log.push("embedded.release");
    }
}

pub struct RecordingSpeech {
    log: CallLog,
}

impl RecordingSpeech {
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone() }
    }
}

impl SpeechSynthesizer for RecordingSpeech {
    fn speak(&mut self, text: &str) -> anyhow::Result<()> {
        self.log.push(format!("speech.speak {}", text));
        Ok(())
    }

    fn pause(&mut self) {
        self.log.push("speech.pause");
    }

    fn resume(&mut self) {
        self.log.push("speech.resume");
    }

    fn stop(&mut self) {
        self.log.push("speech.stop");
    }

    fn shutdown(&mut self) {
        self.log.push("speech.shutdown");
    }
}

enum Script {
    Chunks(Vec<String>),
    Fail(String),
}

/// Summarizer replaying a fixed script, optionally held until released
#[derive(Clone)]
pub struct ScriptedSummarizer {
    script: Arc<Script>,
    gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedSummarizer {
    fn with_script(script: Script) -> Self {
        Self {
            script: Arc::new(script),
            gate: Arc::new(Mutex::new(None)),
            requests: Arc::default(),
        }
    }

    pub fn chunks(chunks: &[&str]) -> Self {
        Self::with_script(Script::Chunks(chunks.iter().map(|c| c.to_string()).collect()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_script(Script::Fail(message.to_string()))
    }

    pub fn gated(chunks: &[&str]) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let summarizer = Self::chunks(chunks);
        *summarizer.gate.lock() = Some(rx);
        (summarizer, tx)
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(
        &self,
        locator: &str,
        instruction: &str,
    ) -> anyhow::Result<BoxStream<'static, anyhow::Result<String>>> {
        self.requests
            .lock()
            .push((locator.to_string(), instruction.to_string()));

        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match self.script.as_ref() {
            Script::Chunks(chunks) => Ok(stream::iter(chunks.clone().into_iter().map(Ok)).boxed()),
            Script::Fail(message) => Err(anyhow!("{}", message)),
        }
    }
}
