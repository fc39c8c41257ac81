//! Player errors

use fos_media::MediaError;

/// Player error
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("Usage: {0}")]
    Usage(String),

    #[error("Cannot read cue script: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed cue script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid track: {0}")]
    Media(#[from] MediaError),
}
