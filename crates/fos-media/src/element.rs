//! Media Elements
//!
//! Playback state of the media element a caption overlay is synchronized with.

use crate::MediaError;

/// Ready state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    #[default]
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorCode {
    Aborted = 1,
    Network = 2,
    Decode = 3,
    SrcNotSupported = 4,
}

/// Playback controller seen by the caption renderer.
///
/// The renderer pulls the current time on `timeupdate` and issues best-effort
/// pause requests when a `pause_on_exit` cue expires.
pub trait MediaController {
    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Request playback to pause
    fn pause(&mut self) -> Result<(), MediaError>;
}

/// Base media element (shared between video/audio)
#[derive(Debug)]
pub struct HTMLMediaElement {
    // State
    pub ready_state: ReadyState,
    pub error: Option<MediaErrorCode>,

    // Playback
    pub current_time: f64,
    pub duration: f64,
    pub paused: bool,
    pub ended: bool,

    // Controls
    pub controls: bool,
}

impl HTMLMediaElement {
    pub fn new() -> Self {
        Self {
            ready_state: ReadyState::HaveNothing,
            error: None,
            current_time: 0.0,
            duration: f64::NAN,
            paused: true,
            ended: false,
            controls: false,
        }
    }

    /// Play media
    pub fn play(&mut self) -> Result<(), MediaError> {
        if self.ready_state < ReadyState::HaveFutureData {
            return Err(MediaError::InvalidState("Not enough data".into()));
        }
        self.paused = false;
        self.ended = false;
        Ok(())
    }

    /// Seek to time
    pub fn seek(&mut self, time: f64) {
        let time = if time.is_finite() { time.max(0.0) } else { 0.0 };
        self.current_time = if self.duration.is_nan() {
            time
        } else {
            time.min(self.duration)
        };
        self.ended = !self.duration.is_nan() && self.current_time >= self.duration;
    }
}

impl Default for HTMLMediaElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaController for HTMLMediaElement {
    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        if let Some(code) = self.error {
            return Err(MediaError::InvalidState(format!(
                "cannot pause media in error state {code:?}"
            )));
        }
        self.paused = true;
        Ok(())
    }
}

/// HTML Video Element
#[derive(Debug, Default)]
pub struct HTMLVideoElement {
    pub base: HTMLMediaElement,
    pub width: u32,
    pub height: u32,
}

impl HTMLVideoElement {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            base: HTMLMediaElement::new(),
            width,
            height,
        }
    }
}

impl MediaController for HTMLVideoElement {
    fn current_time(&self) -> f64 {
        self.base.current_time
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.base.pause()
    }
}
