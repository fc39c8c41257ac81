//! Caption engine errors

/// Caption error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptionError {
    #[error("Cue type already registered: {0}")]
    DuplicateCueType(String),

    #[error("Unknown cue type: {0}")]
    UnknownCueType(String),
}
