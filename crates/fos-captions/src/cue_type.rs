//! Cue types
//!
//! A cue's type tag selects its positioning, time-update and content-diff
//! behavior. Tags without a registration use the defaults.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use fos_dom::Surface;
use fos_media::TextTrackCue;

use crate::CaptionError;
use crate::karaoke::{KARAOKE_CUE_TYPE, KaraokeCue};
use crate::layout::{CueArea, DisplayMetrics, default_position_cue};
use crate::rendered::RenderedCue;

/// Per-type cue behavior. Every method has a default, so implementors only
/// override what they customize.
///
/// Implementations must not re-enter the renderer that invokes them.
pub trait CueBehavior {
    /// Place the cue and shrink `area` so later cues do not overlap it
    fn position_cue(
        &self,
        rendered: &mut RenderedCue,
        area: &mut CueArea,
        metrics: &DisplayMetrics,
        surface: &mut dyn Surface,
    ) {
        default_position_cue(rendered, area, metrics, surface);
    }

    /// Reflect elapsed time on the rendered node. Returning `true` requests
    /// repositioning without a full re-render.
    fn update_cue_time(&self, _rendered: &mut RenderedCue, _time: f64, _surface: &mut dyn Surface) -> bool {
        false
    }

    /// Compare the cue against the stored snapshot, updating it. Returns
    /// whether the content changed.
    fn update_cue_content(&self, rendered: &mut RenderedCue, cue: &TextTrackCue) -> bool {
        rendered.properties_mut().update_from(cue)
    }
}

/// Behavior for untagged and unregistered cue types
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCueBehavior;

impl CueBehavior for DefaultCueBehavior {}

/// Registry mapping type tags to behaviors
pub struct CueTypeRegistry {
    types: HashMap<String, Rc<dyn CueBehavior>>,
    fallback: Rc<dyn CueBehavior>,
}

impl CueTypeRegistry {
    /// Empty registry; every cue uses the default behavior
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
            fallback: Rc::new(DefaultCueBehavior),
        }
    }

    /// Registry with the built-in types (`karaoke`)
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry
            .types
            .insert(KARAOKE_CUE_TYPE.to_string(), Rc::new(KaraokeCue));
        registry
    }

    pub fn register(&mut self, tag: &str, behavior: Rc<dyn CueBehavior>) -> Result<(), CaptionError> {
        if self.types.contains_key(tag) {
            return Err(CaptionError::DuplicateCueType(tag.to_string()));
        }
        self.types.insert(tag.to_string(), behavior);
        tracing::debug!("Registered cue type '{}'", tag);
        Ok(())
    }

    pub fn unregister(&mut self, tag: &str) -> Result<Rc<dyn CueBehavior>, CaptionError> {
        self.types
            .remove(tag)
            .ok_or_else(|| CaptionError::UnknownCueType(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    /// Behavior for a cue's type tag, falling back to the default
    pub fn resolve(&self, tag: Option<&str>) -> Rc<dyn CueBehavior> {
        tag.and_then(|t| self.types.get(t))
            .map(Rc::clone)
            .unwrap_or_else(|| Rc::clone(&self.fallback))
    }
}

impl Default for CueTypeRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl fmt::Debug for CueTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&String> = self.types.keys().collect();
        tags.sort();
        f.debug_struct("CueTypeRegistry").field("types", &tags).finish()
    }
}
