use std::path::PathBuf;

/// Errors surfaced by the playground core.
///
/// Snippet faults never appear here: they are part of the run transcript.
#[derive(Debug, thiserror::Error)]
pub enum PlaygroundError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snippet store at {path} is corrupt: {reason}")]
    CorruptStore { path: PathBuf, reason: String },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("capture error: {0}")]
    Capture(String),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("channel closed: {0}")]
    Channel(String),
}

pub type Result<T> = std::result::Result<T, PlaygroundError>;
