//! Caption Renderer
//!
//! Owns the caption and description surfaces, the registered tracks and the
//! active cue mapping, and drives the per-frame cycle:
//! collect -> diff -> render (if dirty) -> layout (if dirty or repositioned).
//!
//! Hooks (render hook, cue behaviors) must not call back into the renderer.

use std::sync::atomic::{AtomicU64, Ordering};

use fos_dom::{NodeId, StyleValue, Subscription, Surface};
use fos_media::{
    MediaController, TextTrack, TextTrackKind, TextTrackMode, TextTrackReadyState, TrackId,
};

use crate::collector::{ActiveCues, collect_cues};
use crate::cue_type::CueTypeRegistry;
use crate::layout::{BaseFont, CueArea, DisplayMetrics};
use crate::options::RendererOptions;
use crate::render::{DefaultRenderFn, RenderHook, default_render_cue};
use crate::rendered::{CueKey, RenderedCue, renders_node};

static NEXT_DESCRIPTOR: AtomicU64 = AtomicU64::new(1);

/// Push notification from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Playback position changed
    TimeUpdate(f64),
    /// Host viewport resized; carries the subscription being notified
    Resize(Subscription),
}

/// What one cycle did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Rendered cues created (including recreated ones on a forced rebuild)
    pub created: usize,
    /// Rendered cues cleaned up
    pub expired: usize,
    /// Cues passed through the render hook
    pub rendered: usize,
    /// Whether a layout pass ran
    pub laid_out: bool,
    /// Whether an expiring cue requested a pause
    pub pause_requested: bool,
}

/// Caption renderer
pub struct CaptionRenderer<S: Surface> {
    surface: S,
    container: NodeId,
    descriptor: NodeId,
    descriptor_id: String,
    append_to: NodeId,
    target: Option<NodeId>,
    tracks: Vec<TextTrack>,
    rendered: ActiveCues<RenderedCue>,
    current_time: f64,
    options: RendererOptions,
    render_hook: Option<RenderHook>,
    cue_types: CueTypeRegistry,
    media: Option<Box<dyn MediaController>>,
    resize: Option<Subscription>,
    available_area: Option<CueArea>,
}

impl<S: Surface> CaptionRenderer<S> {
    /// Create the caption surfaces under `options.append_to` (or the surface
    /// root) and subscribe to host resize notifications.
    pub fn new(mut surface: S, options: RendererOptions) -> Self {
        let container = surface.create_element("div");
        surface.add_class(container, "caption-cue-canvas");
        surface.set_attribute(container, "aria-live", "off");

        let descriptor_id = format!(
            "description-display-{:x}",
            NEXT_DESCRIPTOR.fetch_add(1, Ordering::Relaxed)
        );
        let descriptor = surface.create_element("div");
        surface.set_attribute(descriptor, "id", &descriptor_id);
        surface.add_class(descriptor, "caption-desc-area");
        surface.set_attribute(descriptor, "aria-live", "assertive");

        let append_to = options
            .append_to
            .filter(|&node| surface.contains(node))
            .unwrap_or_else(|| surface.root());
        surface.append_child(append_to, container);
        surface.append_child(append_to, descriptor);

        let target = options.target.filter(|&node| surface.contains(node));
        let resize = Some(surface.subscribe_resize());

        let mut renderer = Self {
            surface,
            container,
            descriptor,
            descriptor_id,
            append_to,
            target,
            tracks: Vec::new(),
            rendered: ActiveCues::new(),
            current_time: 0.0,
            options,
            render_hook: None,
            cue_types: CueTypeRegistry::default(),
            media: None,
            resize,
            available_area: None,
        };
        if let Some(target) = target {
            renderer.wire_target(target);
        }
        tracing::info!("Caption renderer created ({})", renderer.descriptor_id);
        renderer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct surface access. Callers must not move or remove the caption surfaces.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Main caption surface
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Description surface
    pub fn descriptor(&self) -> NodeId {
        self.descriptor
    }

    /// Element id of the description surface, referenced by the target's `aria-describedby`
    pub fn descriptor_id(&self) -> &str {
        &self.descriptor_id
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn append_to(&self) -> NodeId {
        self.append_to
    }

    pub fn show_descriptions(&self) -> bool {
        self.options.show_descriptions
    }

    /// Area left unclaimed by the last layout pass
    pub fn available_area(&self) -> Option<CueArea> {
        self.available_area
    }

    pub fn cue_types(&self) -> &CueTypeRegistry {
        &self.cue_types
    }

    pub fn cue_types_mut(&mut self) -> &mut CueTypeRegistry {
        &mut self.cue_types
    }

    // ------------------------------------------------------------------
    // Tracks
    // ------------------------------------------------------------------

    /// Create and register an empty, loaded track
    pub fn add_text_track(&mut self, kind: TextTrackKind, label: &str, language: &str) -> TrackId {
        let mut track = TextTrack::new(kind, label, language);
        track.ready_state = TextTrackReadyState::Loaded;
        let id = track.id();
        self.tracks.push(track);
        id
    }

    /// Register an existing track. Returns `None` if that track is already registered.
    pub fn add_track(&mut self, track: TextTrack) -> Option<TrackId> {
        let id = track.id();
        if self.tracks.iter().any(|t| t.id() == id) {
            tracing::debug!("Track {:?} already registered", id);
            return None;
        }
        self.tracks.push(track);
        Some(id)
    }

    /// Deregister a track. Its rendered cues expire on the next cycle.
    pub fn remove_text_track(&mut self, id: TrackId) -> Option<TextTrack> {
        let at = self.tracks.iter().position(|t| t.id() == id)?;
        Some(self.tracks.remove(at))
    }

    /// Registered tracks, in registration order
    pub fn tracks(&self) -> &[TextTrack] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> Option<&TextTrack> {
        self.tracks.iter().find(|t| t.id() == id)
    }

    /// Mutable track access; changes are picked up by the next cycle
    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut TextTrack> {
        self.tracks.iter_mut().find(|t| t.id() == id)
    }

    // ------------------------------------------------------------------
    // Active cues
    // ------------------------------------------------------------------

    pub fn rendered_cues(&self) -> impl Iterator<Item = &RenderedCue> {
        self.rendered.values()
    }

    pub fn rendered_cue(&self, key: &CueKey) -> Option<&RenderedCue> {
        self.rendered.get(key)
    }

    /// Mutable access, e.g. for registering finalizers
    pub fn rendered_cue_mut(&mut self, key: &CueKey) -> Option<&mut RenderedCue> {
        self.rendered.get_mut(key)
    }

    // ------------------------------------------------------------------
    // Host wiring
    // ------------------------------------------------------------------

    /// Bind the media controller. The renderer adopts its current time.
    /// Returns the previously bound controller.
    pub fn bind_media(&mut self, media: Option<Box<dyn MediaController>>) -> Option<Box<dyn MediaController>> {
        let previous = std::mem::replace(&mut self.media, media);
        let time = self.media.as_ref().map(|m| m.current_time());
        if let Some(time) = time {
            self.set_time(time);
        }
        previous
    }

    pub fn media(&self) -> Option<&dyn MediaController> {
        self.media.as_deref()
    }

    /// `timeupdate` from the bound media controller
    pub fn on_time_update(&mut self) -> CycleReport {
        let time = self.media.as_ref().map(|m| m.current_time()).unwrap_or(0.0);
        self.set_time(time)
    }

    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::TimeUpdate(time) => {
                self.set_time(time);
            }
            HostEvent::Resize(subscription) => {
                if self.resize == Some(subscription) {
                    self.refresh_layout();
                }
            }
        }
    }

    /// Rebind the overlay to another media element and run a forced rebuild,
    /// or detach it with `None`. Handles the surface does not know are ignored.
    pub fn attach_target(&mut self, target: Option<NodeId>) {
        if target == self.target {
            return;
        }
        if let Some(node) = target {
            if !self.surface.contains(node) {
                tracing::warn!("Ignoring unknown caption target {:?}", node);
                return;
            }
        }

        if let Some(old) = self.target.take() {
            self.unwire_target(old);
        }
        self.target = target;

        match target {
            Some(node) => {
                self.wire_target(node);
                tracing::info!("Captions attached to {:?}", node);
                self.rebuild_captions(true);
            }
            None => {
                self.hide_surfaces();
                tracing::info!("Captions detached");
            }
        }
    }

    /// Move both caption surfaces under `node`; unknown nodes fall back to the surface root
    pub fn set_append_to(&mut self, node: NodeId) {
        let node = if self.surface.contains(node) { node } else { self.surface.root() };
        if node == self.append_to {
            return;
        }
        self.append_to = node;
        self.surface.append_child(node, self.container);
        self.surface.append_child(node, self.descriptor);
        self.refresh_layout();
    }

    /// Replace the render hook (`None` restores the default) and rebuild
    pub fn set_render_hook(&mut self, hook: Option<RenderHook>) {
        self.render_hook = hook;
        self.rebuild_captions(true);
    }

    pub fn set_show_descriptions(&mut self, show: bool) {
        if self.options.show_descriptions != show {
            self.options.show_descriptions = show;
            self.refresh_layout();
        }
    }

    fn wire_target(&mut self, target: NodeId) {
        let described_by = match self.surface.attribute(target, "aria-describedby") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing, self.descriptor_id),
            _ => self.descriptor_id.clone(),
        };
        self.surface.set_attribute(target, "aria-describedby", &described_by);
        self.surface.add_class(target, "captioned");
    }

    fn unwire_target(&mut self, target: NodeId) {
        self.surface.remove_class(target, "captioned");
        if let Some(existing) = self.surface.attribute(target, "aria-describedby") {
            let remaining: Vec<&str> = existing
                .split_whitespace()
                .filter(|id| *id != self.descriptor_id)
                .collect();
            if remaining.is_empty() {
                self.surface.remove_attribute(target, "aria-describedby");
            } else {
                self.surface.set_attribute(target, "aria-describedby", &remaining.join(" "));
            }
        }
    }

    // ------------------------------------------------------------------
    // Cycle
    // ------------------------------------------------------------------

    /// Advance playback time, propagate it to every track and run a cycle
    pub fn set_time(&mut self, time: f64) -> CycleReport {
        let time = if time.is_finite() { time } else { 0.0 };
        self.current_time = time;
        for track in &mut self.tracks {
            if let Err(e) = track.set_current_time(time) {
                tracing::debug!("Skipping time update for track {:?}: {}", track.id(), e);
            }
        }
        self.rebuild_captions(false)
    }

    /// Run one cycle. `force` discards and recreates every rendered cue and
    /// clears both surfaces first. Without a target there is nothing to
    /// rebuild; the forced rebuild in `attach_target` catches up later.
    pub fn rebuild_captions(&mut self, force: bool) -> CycleReport {
        let force = force && self.target.is_some();
        let mut report = CycleReport::default();
        let mut dirty = force;
        let mut reposition = false;
        let time = self.current_time;

        let Self {
            surface,
            container,
            descriptor,
            target,
            tracks,
            rendered,
            cue_types,
            render_hook,
            media,
            ..
        } = self;
        let (container, descriptor) = (*container, *descriptor);

        if force {
            hide(surface, container, descriptor);
            surface.clear_children(container);
            surface.clear_children(descriptor);
        }

        let mut active = collect_cues(tracks, |track, cue| {
            let key = CueKey::new(track, cue);
            match rendered.remove(&key) {
                Some(mut cached) if !force => {
                    cached.sync_track(track);
                    cached.update_content(cue);
                    dirty |= cached.dirty;
                    reposition |= cached.update_time(time, surface);
                    cached
                }
                stale => {
                    if let Some(old) = stale {
                        old.cleanup(surface);
                        report.expired += 1;
                    }
                    dirty = true;
                    report.created += 1;
                    tracing::trace!("Activated cue {:?}", key);
                    RenderedCue::new(key, cue, track, cue_types.resolve(cue.cue_type.as_deref()))
                }
            }
        });

        // Anything left has gone inactive
        let mut pause = false;
        for (key, old) in rendered.drain() {
            tracing::trace!("Expired cue {:?}", key);
            dirty = true;
            reposition = true;
            pause |= old.pause_on_exit();
            old.cleanup(surface);
            report.expired += 1;
        }

        if pause {
            report.pause_requested = true;
            if let Some(media) = media.as_mut() {
                if let Err(e) = media.pause() {
                    tracing::debug!("Pause on cue exit failed: {}", e);
                }
            }
        }

        if target.is_some() && dirty {
            hide(surface, container, descriptor);
            for cue in active.values_mut() {
                if !cue.dirty {
                    continue;
                }
                match render_hook.as_mut() {
                    Some(hook) => hook(&mut *cue, &mut *surface, default_render_cue as DefaultRenderFn),
                    None => default_render_cue(cue, surface),
                }
                cue.done = true;
                cue.dirty = false;
                report.rendered += 1;

                let Some(node) = cue.node() else {
                    continue;
                };
                if !surface.has_attribute(node, "lang") {
                    surface.set_attribute(node, "lang", cue.language());
                }
                if cue.mode() != TextTrackMode::Showing {
                    continue;
                }
                cue.update_time(time, surface);
                if surface.parent(node).is_some() {
                    continue;
                }
                if cue.kind() == TextTrackKind::Descriptions {
                    surface.append_child(descriptor, node);
                } else if renders_node(cue.kind()) {
                    surface.append_child(container, node);
                }
            }
        }

        *rendered = active;
        let has_target = target.is_some();

        if has_target && (dirty || reposition) {
            report.laid_out = self.calc_layout();
        }

        tracing::debug!(
            "Caption cycle at {:.3}s: {} active, {:?}",
            time,
            self.rendered.len(),
            report
        );
        report
    }

    /// Layout-only cycle for host resizes; reuses the current active set
    pub fn refresh_layout(&mut self) -> bool {
        if self.target.is_none() {
            return false;
        }
        self.hide_surfaces();
        let time = self.current_time;
        let Self { surface, rendered, .. } = self;
        for cue in rendered.values_mut() {
            cue.update_time(time, surface);
        }
        self.calc_layout()
    }

    /// Display geometry of the target, relative to the attachment root
    pub fn display_metrics(&self) -> Option<DisplayMetrics> {
        let target = self.target?;
        let surface = &self.surface;

        let control_height = match self.options.control_height {
            Some(height) => height,
            None if surface.has_attribute(target, "controls") => self.options.default_control_height,
            None => 0.0,
        };

        let (mut top, mut left) = (0.0, 0.0);
        let mut visited = Vec::new();
        let mut current = Some(target);
        while let Some(node) = current {
            if node == self.append_to {
                break;
            }
            if visited.contains(&node) {
                tracing::warn!("Offset parent chain of {:?} loops at {:?}", target, node);
                break;
            }
            visited.push(node);
            let offset = surface.offset(node);
            top += offset.top;
            left += offset.left;
            current = offset.parent;
        }

        let (width, height) = surface.computed_size(target);
        Some(DisplayMetrics {
            top,
            left,
            width: width.trunc(),
            height: (height.trunc() - control_height).max(0.0),
        })
    }

    fn calc_layout(&mut self) -> bool {
        let Some(metrics) = self.display_metrics() else {
            return false;
        };
        let show_descriptions = self.options.show_descriptions;
        let mut area = CueArea::new(&metrics);
        let font = BaseFont::compute(&metrics, &self.options);
        let styles = font.container_styles(&metrics);

        self.surface.apply_styles(self.container, &styles);
        if show_descriptions {
            self.surface.apply_styles(self.descriptor, &styles);
        }

        let Self { surface, rendered, container, descriptor, .. } = self;
        for cue in rendered.values_mut() {
            let visible = cue.is_visible(&*surface, *container, *descriptor, show_descriptions);
            cue.position_cue(&mut area, &metrics, surface, visible);
        }

        self.surface.set_style(self.container, "opacity", StyleValue::Number(1.0));
        if show_descriptions {
            self.surface.set_style(self.descriptor, "opacity", StyleValue::Number(1.0));
        }
        tracing::trace!("Layout pass: {:?}, remaining area {:?}", metrics, area);
        self.available_area = Some(area);
        true
    }

    fn hide_surfaces(&mut self) {
        hide(&mut self.surface, self.container, self.descriptor);
    }

    /// Tear down: finalize every rendered cue, unwire the target, release both
    /// surfaces and the resize subscription. Returns the surface.
    pub fn destroy(mut self) -> S {
        let count = self.rendered.len();
        for (_, cue) in self.rendered.drain() {
            cue.cleanup(&mut self.surface);
        }
        if let Some(target) = self.target.take() {
            self.unwire_target(target);
        }
        self.surface.remove_node(self.container);
        self.surface.remove_node(self.descriptor);
        if let Some(subscription) = self.resize.take() {
            self.surface.unsubscribe_resize(subscription);
        }
        tracing::info!("Caption renderer destroyed ({} cues finalized)", count);
        self.surface
    }
}

fn hide<S: Surface + ?Sized>(surface: &mut S, container: NodeId, descriptor: NodeId) {
    surface.set_style(container, "opacity", StyleValue::Number(0.0));
    surface.set_style(descriptor, "opacity", StyleValue::Number(0.0));
}
