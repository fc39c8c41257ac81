//! fOS Captions
//!
//! Synchronizes timed-text tracks against a playback clock and renders the
//! active cues onto an overlay surface.
//!
//! Each cycle:
//! - collects the active cues of every enabled, loaded track
//! - diffs them against the cues rendered last cycle (new / changed / expired)
//! - re-renders dirty cues through a pluggable render hook
//! - packs visible cues into non-overlapping regions, bottom-up
//!
//! # Example
//! ```rust,ignore
//! use fos_captions::{CaptionRenderer, RendererOptions};
//! use fos_dom::DomTree;
//! use fos_media::TextTrackKind;
//!
//! let mut renderer = CaptionRenderer::new(DomTree::new(), RendererOptions::default());
//! let track = renderer.add_text_track(TextTrackKind::Subtitles, "English", "en");
//! renderer.set_time(1.5);
//! ```

mod collector;
mod cue_type;
mod direction;
mod error;
mod karaoke;
mod layout;
mod options;
mod render;
mod rendered;
mod renderer;

pub use collector::{ActiveCues, collect_cues};
pub use cue_type::{CueBehavior, CueTypeRegistry, DefaultCueBehavior};
pub use direction::TextDirection;
pub use error::CaptionError;
pub use karaoke::{KARAOKE_CUE_TYPE, KaraokeCue, KaraokeSegment, parse_karaoke};
pub use layout::{BaseFont, CueArea, DisplayMetrics, default_position_cue};
pub use options::RendererOptions;
pub use render::{DefaultRenderFn, RenderHook, default_render_cue};
pub use rendered::{CueKey, CueSnapshot, Finalizer, FinalizerHandle, RenderedCue, renders_node};
pub use renderer::{CaptionRenderer, CycleReport, HostEvent};
