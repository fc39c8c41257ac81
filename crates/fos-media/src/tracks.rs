//! Text Tracks
//!
//! TextTrack and TextTrackCue with playback-synchronized activation.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::MediaError;

static NEXT_TRACK_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_CUE_ID: AtomicU64 = AtomicU64::new(1);

/// Track identity, unique per constructed track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(u64);

impl TrackId {
    fn next() -> Self {
        Self(NEXT_TRACK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Cue identity, unique per constructed cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CueId(u64);

impl CueId {
    fn next() -> Self {
        Self(NEXT_CUE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Text track kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextTrackKind {
    Subtitles,
    #[default]
    Captions,
    Descriptions,
    Chapters,
    Metadata,
}

impl TextTrackKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TextTrackKind::Subtitles => "subtitles",
            TextTrackKind::Captions => "captions",
            TextTrackKind::Descriptions => "descriptions",
            TextTrackKind::Chapters => "chapters",
            TextTrackKind::Metadata => "metadata",
        }
    }
}

impl FromStr for TextTrackKind {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subtitles" => Ok(TextTrackKind::Subtitles),
            "captions" => Ok(TextTrackKind::Captions),
            "descriptions" => Ok(TextTrackKind::Descriptions),
            "chapters" => Ok(TextTrackKind::Chapters),
            "metadata" => Ok(TextTrackKind::Metadata),
            other => Err(MediaError::NotSupported(format!("text track kind '{other}'"))),
        }
    }
}

impl fmt::Display for TextTrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text track mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextTrackMode {
    #[default]
    Disabled,
    Hidden,
    Showing,
}

/// Text track load state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextTrackReadyState {
    #[default]
    Loading,
    Loaded,
    Error,
}

/// Cue payload.
///
/// The fields a content diff compares; anything a renderer draws lives here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CueContent {
    /// Cue text, possibly with inline timestamp markers for karaoke cues
    pub text: String,
    /// Speaker voice
    pub voice: Option<String>,
    /// Raw positioning settings as supplied by the parser
    pub settings: Option<String>,
}

/// Text track cue
#[derive(Debug, Clone)]
pub struct TextTrackCue {
    id: CueId,
    /// Identifier as it appeared in the source file
    pub identifier: String,
    pub start_time: f64,
    pub end_time: f64,
    pub pause_on_exit: bool,
    /// Type tag selecting custom render behavior
    pub cue_type: Option<String>,
    pub content: CueContent,
    /// Maintained by the owning track; recomputed whenever its time is set
    pub active: bool,
}

impl TextTrackCue {
    pub fn new(start_time: f64, end_time: f64, text: &str) -> Self {
        Self {
            id: CueId::next(),
            identifier: String::new(),
            start_time,
            end_time,
            pause_on_exit: false,
            cue_type: None,
            content: CueContent {
                text: text.to_string(),
                ..Default::default()
            },
            active: false,
        }
    }

    pub fn with_identifier(mut self, identifier: &str) -> Self {
        self.identifier = identifier.to_string();
        self
    }

    pub fn with_pause_on_exit(mut self, pause_on_exit: bool) -> Self {
        self.pause_on_exit = pause_on_exit;
        self
    }

    pub fn with_type(mut self, cue_type: &str) -> Self {
        self.cue_type = Some(cue_type.to_string());
        self
    }

    pub fn with_voice(mut self, voice: &str) -> Self {
        self.content.voice = Some(voice.to_string());
        self
    }

    pub fn id(&self) -> CueId {
        self.id
    }

    /// Check if the cue interval contains `time`
    pub fn contains(&self, time: f64) -> bool {
        self.start_time <= time && self.end_time > time
    }
}

/// Text track
#[derive(Debug, Clone)]
pub struct TextTrack {
    id: TrackId,
    pub kind: TextTrackKind,
    pub label: String,
    pub language: String,
    pub mode: TextTrackMode,
    pub ready_state: TextTrackReadyState,
    cues: Vec<TextTrackCue>,
    active_cues: Vec<usize>,
    current_time: f64,
}

impl TextTrack {
    pub fn new(kind: TextTrackKind, label: &str, language: &str) -> Self {
        Self {
            id: TrackId::next(),
            kind,
            label: label.to_string(),
            language: language.to_string(),
            mode: TextTrackMode::Disabled,
            ready_state: TextTrackReadyState::Loading,
            cues: Vec::new(),
            active_cues: Vec::new(),
            current_time: 0.0,
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Cues ordered by start time
    pub fn cues(&self) -> &[TextTrackCue] {
        &self.cues
    }

    pub fn cue(&self, id: CueId) -> Option<&TextTrackCue> {
        self.cues.iter().find(|c| c.id == id)
    }

    /// Mutable access to a cue. Order and activation are refreshed on the next
    /// time update.
    pub fn cue_mut(&mut self, id: CueId) -> Option<&mut TextTrackCue> {
        self.cues.iter_mut().find(|c| c.id == id)
    }

    /// Insert a cue, keeping start-time order. Cues with equal start keep insertion order.
    pub fn add_cue(&mut self, mut cue: TextTrackCue) -> CueId {
        let id = cue.id;
        cue.active = cue.contains(self.current_time);
        let at = self.cues.partition_point(|c| c.start_time <= cue.start_time);
        self.cues.insert(at, cue);
        self.refresh_active();
        id
    }

    pub fn remove_cue(&mut self, id: CueId) -> Option<TextTrackCue> {
        let at = self.cues.iter().position(|c| c.id == id)?;
        let cue = self.cues.remove(at);
        self.refresh_active();
        Some(cue)
    }

    /// Currently active cues, in start-time order
    pub fn active_cues(&self) -> impl Iterator<Item = &TextTrackCue> {
        self.active_cues.iter().filter_map(|&i| self.cues.get(i))
    }

    /// Set the track time and recompute the active cue set
    pub fn set_current_time(&mut self, time: f64) -> Result<(), MediaError> {
        if self.ready_state == TextTrackReadyState::Error {
            return Err(MediaError::InvalidState(format!(
                "track '{}' failed to load",
                self.label
            )));
        }
        self.current_time = time;
        // Start times may have been edited through `cue_mut`
        self.cues.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        for cue in &mut self.cues {
            cue.active = cue.contains(time);
        }
        self.refresh_active();
        tracing::debug!(
            "Track {:?} at {:.3}s: {} of {} cues active",
            self.id,
            time,
            self.active_cues.len(),
            self.cues.len()
        );
        Ok(())
    }

    fn refresh_active(&mut self) {
        self.active_cues = self
            .cues
            .iter()
            .enumerate()
            .filter(|(_, c)| c.active)
            .map(|(i, _)| i)
            .collect();
    }
}
