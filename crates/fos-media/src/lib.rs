//! fOS Media
//!
//! Media element and timed-text track model consumed by the caption renderer.
//!
//! Features:
//! - TextTrack / TextTrackCue with playback-synchronized activation
//! - HTMLMediaElement playback state and the `MediaController` seam

pub mod element;
pub mod tracks;

pub use element::{HTMLMediaElement, HTMLVideoElement, MediaController, MediaErrorCode, ReadyState};
pub use tracks::{
    CueContent, CueId, TextTrack, TextTrackCue, TextTrackKind, TextTrackMode,
    TextTrackReadyState, TrackId,
};

/// Media error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MediaError {
    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}
