use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use log::{debug, error, info};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;

/// Fixed instruction sent along with every summarization request
pub const SUMMARY_INSTRUCTION: &str = "Summarize this video in the form of top 3-4 takeaways only. Write in the form of bullet points. Don't assume if you don't know";

const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// Generative summarization service
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Start summarizing the media at `locator`, yielding text chunks as they arrive
    async fn summarize(
        &self,
        locator: &str,
        instruction: &str,
    ) -> anyhow::Result<BoxStream<'static, anyhow::Result<String>>>;
}

/// Text-to-speech engine reading the summary aloud
pub trait SpeechSynthesizer: Send {
    fn speak(&mut self, text: &str) -> anyhow::Result<()>;
    fn pause(&mut self);
    fn resume(&mut self);
    /// Stop any narration in progress
    fn stop(&mut self);
    fn shutdown(&mut self);
}

/// Output of the summarization request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum SummaryState {
    #[default]
    Initial,
    Loading,
    Success(String),
    Error(String),
}

/// Drives one summary at a time and publishes its state
pub struct SummaryController {
    summarizer: Arc<dyn Summarizer>,
    state: watch::Sender<SummaryState>,
    generation: Mutex<u64>,
}

impl SummaryController {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        let (state, _) = watch::channel(SummaryState::Initial);
        Self {
            summarizer,
            state,
            generation: Mutex::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SummaryState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SummaryState {
        self.state.borrow().clone()
    }

    /// Reset to `Initial`, discarding any summary still in flight
    pub fn clear(&self) {
        let mut generation = self.generation.lock();
        *generation += 1;
        self.state.send_replace(SummaryState::Initial);
    }

    /// Summarize the media at `locator`. The outcome is published unless a
    /// newer request or `clear` superseded this one.
    pub async fn summarize(&self, locator: &str) {
        let generation = {
            let mut generation = self.generation.lock();
            *generation += 1;
            self.state.send_replace(SummaryState::Loading);
            *generation
        };

        info!("Requesting summary for {}", locator);
        let next = match self.collect(locator).await {
            Ok(text) => SummaryState::Success(text),
            Err(e) => {
                error!("Error processing prompt: {:#}", e);
                let message = e.to_string();
                if message.is_empty() {
                    SummaryState::Error(UNKNOWN_ERROR.to_string())
                } else {
                    SummaryState::Error(message)
                }
            }
        };

        let current = self.generation.lock();
        if *current == generation {
            self.state.send_replace(next);
        } else {
            debug!("Discarding summary for {} (superseded)", locator);
        }
    }

    async fn collect(&self, locator: &str) -> anyhow::Result<String> {
        let mut chunks = self.summarizer.summarize(locator, SUMMARY_INSTRUCTION).await?;
        let mut text = String::new();
        while let Some(chunk) = chunks.next().await {
            text.push_str(&chunk?);
        }
        Ok(text)
    }
}
