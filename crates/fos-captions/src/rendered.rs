//! Rendered Cue
//!
//! Live rendering state for one active (cue, track) pairing. Created when
//! the cue becomes active, consumed by `cleanup` when it expires.

use std::fmt;
use std::rc::Rc;

use fos_dom::{DOMRect, NodeId, Surface};
use fos_media::{CueContent, CueId, TextTrack, TextTrackCue, TextTrackKind, TextTrackMode, TrackId};

use crate::cue_type::CueBehavior;
use crate::layout::{CueArea, DisplayMetrics};

/// Identity of an active cue: the cue together with its owning track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CueKey {
    pub track: TrackId,
    pub cue: CueId,
}

impl CueKey {
    pub fn new(track: &TextTrack, cue: &TextTrackCue) -> Self {
        Self {
            track: track.id(),
            cue: cue.id(),
        }
    }
}

/// Whether cues of this kind get a visual node at all
pub fn renders_node(kind: TextTrackKind) -> bool {
    !matches!(kind, TextTrackKind::Chapters | TextTrackKind::Metadata)
}

/// Last-observed cue fields, compared field by field to detect content changes
#[derive(Debug, Clone, PartialEq)]
pub struct CueSnapshot {
    pub identifier: String,
    pub start_time: f64,
    pub end_time: f64,
    pub pause_on_exit: bool,
    pub cue_type: Option<String>,
    pub content: CueContent,
}

impl CueSnapshot {
    pub fn of(cue: &TextTrackCue) -> Self {
        Self {
            identifier: cue.identifier.clone(),
            start_time: cue.start_time,
            end_time: cue.end_time,
            pause_on_exit: cue.pause_on_exit,
            cue_type: cue.cue_type.clone(),
            content: cue.content.clone(),
        }
    }

    /// Copy every field that differs from `cue`; returns whether anything changed
    pub fn update_from(&mut self, cue: &TextTrackCue) -> bool {
        let mut changed = false;
        if self.identifier != cue.identifier {
            self.identifier = cue.identifier.clone();
            changed = true;
        }
        // Bitwise comparison so a NaN time does not register as a change every cycle
        if self.start_time.to_bits() != cue.start_time.to_bits() {
            self.start_time = cue.start_time;
            changed = true;
        }
        if self.end_time.to_bits() != cue.end_time.to_bits() {
            self.end_time = cue.end_time;
            changed = true;
        }
        if self.pause_on_exit != cue.pause_on_exit {
            self.pause_on_exit = cue.pause_on_exit;
            changed = true;
        }
        if self.cue_type != cue.cue_type {
            self.cue_type = cue.cue_type.clone();
            changed = true;
        }
        if self.content.text != cue.content.text {
            self.content.text = cue.content.text.clone();
            changed = true;
        }
        if self.content.voice != cue.content.voice {
            self.content.voice = cue.content.voice.clone();
            changed = true;
        }
        if self.content.settings != cue.content.settings {
            self.content.settings = cue.content.settings.clone();
            changed = true;
        }
        changed
    }
}

/// Cleanup callback run once when a rendered cue is disposed
pub type Finalizer = Box<dyn FnOnce(&mut dyn Surface)>;

/// Handle for removing a registered finalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizerHandle(u64);

/// Rendering state for one active cue
pub struct RenderedCue {
    key: CueKey,
    kind: TextTrackKind,
    mode: TextTrackMode,
    language: String,
    track_label: String,
    /// Content differs from the last render
    pub dirty: bool,
    /// At least one render pass has completed
    pub done: bool,
    /// Never auto-placed when false (descriptions, metadata)
    pub auto_position: bool,
    node: Option<NodeId>,
    properties: CueSnapshot,
    placement: Option<DOMRect>,
    behavior: Rc<dyn CueBehavior>,
    finalizers: Vec<(FinalizerHandle, Finalizer)>,
    next_finalizer: u64,
}

impl RenderedCue {
    pub fn new(key: CueKey, cue: &TextTrackCue, track: &TextTrack, behavior: Rc<dyn CueBehavior>) -> Self {
        let mut rendered = Self {
            key,
            kind: track.kind,
            mode: track.mode,
            language: track.language.clone(),
            track_label: track.label.clone(),
            dirty: true,
            done: false,
            auto_position: !matches!(track.kind, TextTrackKind::Descriptions | TextTrackKind::Metadata),
            node: None,
            properties: CueSnapshot::of(cue),
            placement: None,
            behavior,
            finalizers: Vec::new(),
            next_finalizer: 1,
        };
        // Seed custom snapshot state; the cue is dirty either way
        let behavior = Rc::clone(&rendered.behavior);
        behavior.update_cue_content(&mut rendered, cue);
        rendered.dirty = true;
        rendered
    }

    pub fn key(&self) -> CueKey {
        self.key
    }

    pub fn kind(&self) -> TextTrackKind {
        self.kind
    }

    pub fn mode(&self) -> TextTrackMode {
        self.mode
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn track_label(&self) -> &str {
        &self.track_label
    }

    pub fn properties(&self) -> &CueSnapshot {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut CueSnapshot {
        &mut self.properties
    }

    pub fn pause_on_exit(&self) -> bool {
        self.properties.pause_on_exit
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Replace the visual node. The previous node is released; the new one
    /// gets the `caption-cue` class.
    pub fn set_node(&mut self, surface: &mut dyn Surface, node: Option<NodeId>) {
        if let Some(old) = self.node {
            if Some(old) != node {
                surface.remove_node(old);
            }
        }
        self.node = node.filter(|&n| surface.contains(n));
        if let Some(node) = self.node {
            surface.add_class(node, "caption-cue");
        }
        self.placement = None;
    }

    /// Rectangle assigned by the last positioning pass
    pub fn placement(&self) -> Option<DOMRect> {
        self.placement
    }

    pub fn set_placement(&mut self, rect: DOMRect) {
        self.placement = Some(rect);
    }

    pub fn clear_placement(&mut self) {
        self.placement = None;
    }

    /// Node attached to the caption surface, or to the description surface while it is shown
    pub fn is_visible(&self, surface: &dyn Surface, container: NodeId, descriptor: NodeId, show_descriptions: bool) -> bool {
        let Some(node) = self.node else {
            return false;
        };
        match surface.parent(node) {
            Some(parent) if parent == container => true,
            Some(parent) if parent == descriptor => show_descriptions,
            _ => false,
        }
    }

    /// Refresh track-owned fields that may change while the cue stays active.
    /// A mode change marks the cue dirty so it is attached or dropped on re-render.
    pub(crate) fn sync_track(&mut self, track: &TextTrack) {
        if self.mode != track.mode {
            self.mode = track.mode;
            self.dirty = true;
        }
        self.language.clone_from(&track.language);
        self.track_label.clone_from(&track.label);
    }

    /// Run the cue type's positioning function. Skipped for cues that are not
    /// auto-positioned or not visible.
    pub fn position_cue(&mut self, area: &mut CueArea, metrics: &DisplayMetrics, surface: &mut dyn Surface, visible: bool) {
        if !self.auto_position || !visible {
            return;
        }
        let behavior = Rc::clone(&self.behavior);
        behavior.position_cue(self, area, metrics, surface);
    }

    /// Run the cue type's time-update function; `true` requests repositioning
    pub fn update_time(&mut self, time: f64, surface: &mut dyn Surface) -> bool {
        if self.node.is_none() {
            return false;
        }
        let behavior = Rc::clone(&self.behavior);
        behavior.update_cue_time(self, time, surface)
    }

    /// Run the cue type's content diff; marks the cue dirty on change
    pub fn update_content(&mut self, cue: &TextTrackCue) -> bool {
        let behavior = Rc::clone(&self.behavior);
        let changed = behavior.update_cue_content(self, cue);
        self.dirty |= changed;
        changed
    }

    /// Register a cleanup callback; callbacks run in registration order
    pub fn add_finalizer<F>(&mut self, finalizer: F) -> FinalizerHandle
    where
        F: FnOnce(&mut dyn Surface) + 'static,
    {
        let handle = FinalizerHandle(self.next_finalizer);
        self.next_finalizer += 1;
        self.finalizers.push((handle, Box::new(finalizer)));
        handle
    }

    /// Unregister a finalizer before it runs
    pub fn remove_finalizer(&mut self, handle: FinalizerHandle) -> bool {
        let before = self.finalizers.len();
        self.finalizers.retain(|(h, _)| *h != handle);
        self.finalizers.len() != before
    }

    /// Dispose: run every finalizer once, then release the node
    pub fn cleanup(mut self, surface: &mut dyn Surface) {
        for (_, finalizer) in self.finalizers.drain(..) {
            finalizer(surface);
        }
        if let Some(node) = self.node.take() {
            surface.remove_node(node);
        }
        tracing::trace!("Cleaned up rendered cue {:?}", self.key);
    }
}

impl fmt::Debug for RenderedCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedCue")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("dirty", &self.dirty)
            .field("done", &self.done)
            .field("auto_position", &self.auto_position)
            .field("node", &self.node)
            .field("properties", &self.properties)
            .field("finalizers", &self.finalizers.len())
            .finish()
    }
}
