//! Cue scripts
//!
//! JSON description of the tracks to play:
//!
//! ```json
//! {
//!   "duration": 6.0,
//!   "tracks": [
//!     {
//!       "kind": "subtitles", "label": "English", "language": "en", "mode": "showing",
//!       "cues": [{ "start": 1.0, "end": 3.0, "text": "Hello" }]
//!     }
//!   ]
//! }
//! ```

use fos_media::{TextTrack, TextTrackCue, TextTrackKind, TextTrackMode, TextTrackReadyState};
use serde::Deserialize;

use crate::error::PlayerError;

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Playback length; defaults to the last cue end
    #[serde(default)]
    pub duration: Option<f64>,
    /// Whether the simulated video shows native controls
    #[serde(default)]
    pub controls: bool,
    #[serde(default)]
    pub tracks: Vec<TrackDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackDef {
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub mode: ModeDef,
    #[serde(default)]
    pub cues: Vec<CueDef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeDef {
    Disabled,
    Hidden,
    #[default]
    Showing,
}

impl From<ModeDef> for TextTrackMode {
    fn from(mode: ModeDef) -> Self {
        match mode {
            ModeDef::Disabled => TextTrackMode::Disabled,
            ModeDef::Hidden => TextTrackMode::Hidden,
            ModeDef::Showing => TextTrackMode::Showing,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CueDef {
    #[serde(default)]
    pub id: String,
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default, rename = "type")]
    pub cue_type: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub pause_on_exit: bool,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, PlayerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Explicit duration, or the latest cue end
    pub fn duration(&self) -> f64 {
        self.duration.unwrap_or_else(|| {
            self.tracks
                .iter()
                .flat_map(|t| &t.cues)
                .map(|c| c.end)
                .fold(0.0, f64::max)
        })
    }

    /// Build loaded tracks, in script order
    pub fn build_tracks(&self) -> Result<Vec<TextTrack>, PlayerError> {
        self.tracks.iter().map(TrackDef::build).collect()
    }
}

impl TrackDef {
    fn build(&self) -> Result<TextTrack, PlayerError> {
        let kind: TextTrackKind = self.kind.parse()?;
        let mut track = TextTrack::new(kind, &self.label, &self.language);
        track.mode = self.mode.into();
        track.ready_state = TextTrackReadyState::Loaded;
        for def in &self.cues {
            let mut cue = TextTrackCue::new(def.start, def.end, &def.text)
                .with_identifier(&def.id)
                .with_pause_on_exit(def.pause_on_exit);
            if let Some(cue_type) = &def.cue_type {
                cue = cue.with_type(cue_type);
            }
            if let Some(voice) = &def.voice {
                cue = cue.with_voice(voice);
            }
            track.add_cue(cue);
        }
        Ok(track)
    }
}
