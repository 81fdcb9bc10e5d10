use thiserror::Error;

/// Rejection of a raw reference before it reaches the classifier
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Video reference is empty")]
    Empty,
}

/// Failure of the playback-configuration fetch collaborator
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request rejected by site ({status}): {reason}")]
    Rejected { status: String, reason: String },

    #[error("Failed to parse playback configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Extractor failed: {0}")]
    Extractor(String),

    #[error("Background fetch task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for FetchError {
    fn from(err: tokio::task::JoinError) -> Self {
        FetchError::Task(err.to_string())
    }
}

/// Failure of the stream resolver
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Classification is total, so this is never produced by `classify`.
    #[error("Video reference is ambiguous")]
    ClassificationAmbiguous,

    #[error("Extraction failed: {cause}")]
    ExtractionFailed {
        #[source]
        cause: FetchError,
    },

    #[error("No playable stream found")]
    NoPlayableStream,
}

impl From<FetchError> for ResolutionError {
    fn from(cause: FetchError) -> Self {
        ResolutionError::ExtractionFailed { cause }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("Playback coordinator has been disposed")]
    Disposed,
}
