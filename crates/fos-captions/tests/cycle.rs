//! Caption cycle tests: activation, diffing, expiry and cleanup

use std::cell::Cell;
use std::rc::Rc;

use fos_captions::{CaptionRenderer, CueKey, RendererOptions};
use fos_dom::{DomTree, NodeId, Surface, TextMetrics};
use fos_media::{
    MediaController, MediaError, TextTrack, TextTrackCue, TextTrackKind, TextTrackMode,
    TextTrackReadyState, TrackId,
};

fn setup() -> (CaptionRenderer<DomTree>, NodeId) {
    let mut tree = DomTree::with_metrics(TextMetrics { char_width: 8.0, line_height: 20.0 });
    let video = tree.create_element("video");
    let root = tree.root();
    tree.append_child(root, video);
    tree.set_size(video, 320.0, 200.0);
    let renderer = CaptionRenderer::new(tree, RendererOptions::default().with_target(video));
    (renderer, video)
}

fn showing_track(renderer: &mut CaptionRenderer<DomTree>, kind: TextTrackKind) -> TrackId {
    let id = renderer.add_text_track(kind, "English", "en");
    renderer.track_mut(id).unwrap().mode = TextTrackMode::Showing;
    id
}

fn only_key(renderer: &CaptionRenderer<DomTree>) -> CueKey {
    let keys: Vec<CueKey> = renderer.rendered_cues().map(|c| c.key()).collect();
    assert_eq!(keys.len(), 1);
    keys[0]
}

#[derive(Clone)]
struct CountingMedia {
    time: Rc<Cell<f64>>,
    pauses: Rc<Cell<u32>>,
    fail: bool,
}

impl MediaController for CountingMedia {
    fn current_time(&self) -> f64 {
        self.time.get()
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.pauses.set(self.pauses.get() + 1);
        if self.fail {
            return Err(MediaError::InvalidState("pause refused".into()));
        }
        Ok(())
    }
}

fn counting_media(fail: bool) -> CountingMedia {
    CountingMedia {
        time: Rc::new(Cell::new(0.0)),
        pauses: Rc::new(Cell::new(0)),
        fail,
    }
}

#[test]
fn test_single_cue_lifecycle() {
    let (mut renderer, _) = setup();
    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(1.0, 3.0, "Hello"));

    let report = renderer.set_time(0.5);
    assert_eq!(report.created, 0);
    assert_eq!(renderer.rendered_cues().count(), 0);
    assert!(renderer.surface().children(renderer.container()).is_empty());

    let report = renderer.set_time(1.5);
    assert_eq!(report.created, 1);
    assert_eq!(report.rendered, 1);
    assert!(report.laid_out);

    let cue = renderer.rendered_cues().next().unwrap();
    let node = cue.node().unwrap();
    assert!(cue.done);
    assert!(!cue.dirty);
    assert_eq!(renderer.surface().parent(node), Some(renderer.container()));
    assert_eq!(renderer.surface().text_content(node), "Hello");
    assert_eq!(renderer.surface().attribute(node, "lang").as_deref(), Some("en"));

    // One line of text anchored to the bottom of a 200px display
    let rect = cue.placement().unwrap();
    assert_eq!(rect.height, 20.0);
    assert_eq!(rect.bottom(), 200.0);

    let report = renderer.set_time(3.5);
    assert_eq!(report.expired, 1);
    assert_eq!(renderer.rendered_cues().count(), 0);
    assert!(!renderer.surface().contains(node));
    assert!(renderer.surface().children(renderer.container()).is_empty());
}

#[test]
fn test_unchanged_cycle_is_idempotent() {
    let (mut renderer, _) = setup();
    let track = showing_track(&mut renderer, TextTrackKind::Captions);
    renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(1.0, 3.0, "Hello"));
    renderer.set_time(1.5);

    let mutations = renderer.surface().mutation_count();
    let report = renderer.set_time(1.5);
    assert_eq!(report, Default::default());
    assert_eq!(renderer.surface().mutation_count(), mutations);

    let report = renderer.set_time(2.0);
    assert_eq!(report, Default::default());
    assert_eq!(renderer.surface().mutation_count(), mutations);
}

#[test]
fn test_content_change_rerenders() {
    let (mut renderer, _) = setup();
    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    let cue = renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(1.0, 3.0, "Hello"));
    renderer.set_time(1.5);
    let old_node = renderer.rendered_cues().next().unwrap().node().unwrap();

    renderer.track_mut(track).unwrap().cue_mut(cue).unwrap().content.text = "Changed".into();
    let report = renderer.set_time(1.6);
    assert_eq!(report.created, 0);
    assert_eq!(report.rendered, 1);

    let new_node = renderer.rendered_cues().next().unwrap().node().unwrap();
    assert_ne!(new_node, old_node);
    assert!(!renderer.surface().contains(old_node));
    assert_eq!(renderer.surface().text_content(new_node), "Changed");

    // Same text written again is not a change
    renderer.track_mut(track).unwrap().cue_mut(cue).unwrap().content.text = "Changed".into();
    assert_eq!(renderer.set_time(1.7).rendered, 0);
}

#[test]
fn test_every_snapshot_field_is_diffed() {
    let (mut renderer, _) = setup();
    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    let cue = renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(1.0, 3.0, "Hello"));
    renderer.set_time(1.5);

    let edits: Vec<Box<dyn Fn(&mut TextTrackCue)>> = vec![
        Box::new(|c| c.identifier = "intro".into()),
        Box::new(|c| c.end_time = 4.0),
        Box::new(|c| c.pause_on_exit = true),
        Box::new(|c| c.content.voice = Some("Narrator".into())),
        Box::new(|c| c.content.settings = Some("align:start".into())),
    ];
    for edit in edits {
        edit(renderer.track_mut(track).unwrap().cue_mut(cue).unwrap());
        assert_eq!(renderer.set_time(1.5).rendered, 1);
        assert_eq!(renderer.set_time(1.5).rendered, 0);
    }
}

#[test]
fn test_inactive_tracks_render_nothing() {
    let (mut renderer, _) = setup();

    // New tracks start disabled
    let disabled = renderer.add_text_track(TextTrackKind::Subtitles, "", "en");
    renderer.track_mut(disabled).unwrap().add_cue(TextTrackCue::new(0.0, 5.0, "disabled"));

    let mut loading = TextTrack::new(TextTrackKind::Subtitles, "", "fr");
    loading.mode = TextTrackMode::Showing;
    loading.add_cue(TextTrackCue::new(0.0, 5.0, "loading"));
    renderer.add_track(loading).unwrap();

    let mut failed = TextTrack::new(TextTrackKind::Subtitles, "", "de");
    failed.mode = TextTrackMode::Showing;
    failed.ready_state = TextTrackReadyState::Error;
    failed.add_cue(TextTrackCue::new(0.0, 5.0, "failed"));
    renderer.add_track(failed).unwrap();

    let report = renderer.set_time(1.0);
    assert_eq!(report.created, 0);
    assert_eq!(renderer.rendered_cues().count(), 0);
}

#[test]
fn test_add_track_rejects_duplicates() {
    let (mut renderer, _) = setup();
    let track = TextTrack::new(TextTrackKind::Captions, "", "en");
    let copy = track.clone();
    assert!(renderer.add_track(track).is_some());
    assert!(renderer.add_track(copy).is_none());
    assert_eq!(renderer.tracks().len(), 1);
}

#[test]
fn test_hidden_track_renders_without_attaching() {
    let (mut renderer, _) = setup();
    let track = renderer.add_text_track(TextTrackKind::Subtitles, "", "en");
    renderer.track_mut(track).unwrap().mode = TextTrackMode::Hidden;
    renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(0.0, 5.0, "hidden"));

    renderer.set_time(1.0);
    let cue = renderer.rendered_cues().next().unwrap();
    let node = cue.node().unwrap();
    assert_eq!(renderer.surface().parent(node), None);
    assert!(cue.placement().is_none());

    // Switching to showing re-renders the cached cue into the container
    renderer.track_mut(track).unwrap().mode = TextTrackMode::Showing;
    let report = renderer.set_time(1.0);
    assert_eq!((report.created, report.rendered), (0, 1));
    let node = renderer.rendered_cues().next().unwrap().node().unwrap();
    assert_eq!(renderer.surface().parent(node), Some(renderer.container()));
    assert!(renderer.rendered_cues().next().unwrap().placement().is_some());
}

#[test]
fn test_metadata_cues_get_no_node() {
    let (mut renderer, _) = setup();
    let track = showing_track(&mut renderer, TextTrackKind::Metadata);
    renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(0.0, 5.0, "{\"id\": 1}"));

    renderer.set_time(1.0);
    let cue = renderer.rendered_cues().next().unwrap();
    assert!(cue.done);
    assert!(cue.node().is_none());
    assert!(renderer.surface().children(renderer.container()).is_empty());
}

#[test]
fn test_removed_track_expires_next_cycle() {
    let (mut renderer, _) = setup();
    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(0.0, 5.0, "bye"));
    renderer.set_time(1.0);

    assert!(renderer.remove_text_track(track).is_some());
    assert_eq!(renderer.rendered_cues().count(), 1);

    let report = renderer.set_time(1.0);
    assert_eq!(report.expired, 1);
    assert_eq!(renderer.rendered_cues().count(), 0);
}

#[test]
fn test_pause_on_exit_fires_once() {
    let (mut renderer, _) = setup();
    let media = counting_media(false);
    let pauses = Rc::clone(&media.pauses);
    renderer.bind_media(Some(Box::new(media)));

    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    renderer
        .track_mut(track)
        .unwrap()
        .add_cue(TextTrackCue::new(1.0, 2.0, "Wait").with_pause_on_exit(true));

    assert!(!renderer.set_time(1.5).pause_requested);
    assert_eq!(pauses.get(), 0);

    assert!(renderer.set_time(2.5).pause_requested);
    assert_eq!(pauses.get(), 1);

    assert!(!renderer.set_time(3.0).pause_requested);
    assert_eq!(pauses.get(), 1);
}

#[test]
fn test_failed_pause_is_ignored() {
    let (mut renderer, _) = setup();
    let media = counting_media(true);
    let pauses = Rc::clone(&media.pauses);
    renderer.bind_media(Some(Box::new(media)));

    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    renderer
        .track_mut(track)
        .unwrap()
        .add_cue(TextTrackCue::new(1.0, 2.0, "Wait").with_pause_on_exit(true));
    renderer.set_time(1.5);

    let report = renderer.set_time(2.5);
    assert!(report.pause_requested);
    assert_eq!(report.expired, 1);
    assert_eq!(pauses.get(), 1);
}

#[test]
fn test_time_update_pulls_from_media() {
    let (mut renderer, _) = setup();
    let media = counting_media(false);
    let time = Rc::clone(&media.time);
    renderer.bind_media(Some(Box::new(media)));

    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(1.0, 2.0, "Now"));

    time.set(1.25);
    let report = renderer.on_time_update();
    assert_eq!(report.created, 1);
    assert_eq!(renderer.current_time(), 1.25);

    assert!(renderer.bind_media(None).is_some());
    assert!(renderer.media().is_none());
}

#[test]
fn test_non_finite_time_is_zero() {
    let (mut renderer, _) = setup();
    renderer.set_time(f64::NAN);
    assert_eq!(renderer.current_time(), 0.0);
    renderer.set_time(f64::INFINITY);
    assert_eq!(renderer.current_time(), 0.0);
}

#[test]
fn test_finalizers_run_once_on_expiry() {
    let (mut renderer, _) = setup();
    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(1.0, 3.0, "Hello"));
    renderer.set_time(1.5);

    let runs = Rc::new(Cell::new(0));
    let key = only_key(&renderer);
    let counter = Rc::clone(&runs);
    renderer
        .rendered_cue_mut(&key)
        .unwrap()
        .add_finalizer(move |_| counter.set(counter.get() + 1));

    renderer.set_time(2.0);
    assert_eq!(runs.get(), 0);

    renderer.set_time(3.5);
    assert_eq!(runs.get(), 1);
    renderer.set_time(4.0);
    assert_eq!(runs.get(), 1);
}

#[test]
fn test_removed_finalizer_does_not_run() {
    let (mut renderer, _) = setup();
    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(1.0, 3.0, "Hello"));
    renderer.set_time(1.5);

    let runs = Rc::new(Cell::new(0));
    let key = only_key(&renderer);
    let counter = Rc::clone(&runs);
    let cue = renderer.rendered_cue_mut(&key).unwrap();
    let handle = cue.add_finalizer(move |_| counter.set(counter.get() + 1));
    assert!(cue.remove_finalizer(handle));
    assert!(!cue.remove_finalizer(handle));

    renderer.set_time(3.5);
    assert_eq!(runs.get(), 0);
}

#[test]
fn test_forced_rebuild_finalizes_and_recreates() {
    let (mut renderer, _) = setup();
    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(1.0, 3.0, "Hello"));
    renderer.set_time(1.5);

    let runs = Rc::new(Cell::new(0));
    let key = only_key(&renderer);
    let old_node = renderer.rendered_cue(&key).unwrap().node().unwrap();
    let counter = Rc::clone(&runs);
    renderer
        .rendered_cue_mut(&key)
        .unwrap()
        .add_finalizer(move |_| counter.set(counter.get() + 1));

    let report = renderer.rebuild_captions(true);
    assert_eq!(report.expired, 1);
    assert_eq!(report.created, 1);
    assert_eq!(report.rendered, 1);
    assert_eq!(runs.get(), 1);

    // Same cue identity, fresh node
    let new_node = renderer.rendered_cue(&key).unwrap().node().unwrap();
    assert_ne!(new_node, old_node);
    assert_eq!(renderer.surface().children(renderer.container()), vec![new_node]);

    renderer.set_time(3.5);
    assert_eq!(runs.get(), 1);
}

#[test]
fn test_destroy_finalizes_and_unwires() {
    let (mut renderer, video) = setup();
    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(1.0, 3.0, "Hello"));
    renderer.set_time(1.5);

    let runs = Rc::new(Cell::new(0));
    let key = only_key(&renderer);
    let counter = Rc::clone(&runs);
    renderer
        .rendered_cue_mut(&key)
        .unwrap()
        .add_finalizer(move |_| counter.set(counter.get() + 1));

    let (container, descriptor) = (renderer.container(), renderer.descriptor());
    let tree = renderer.destroy();
    assert_eq!(runs.get(), 1);
    assert!(!tree.contains(container));
    assert!(!tree.contains(descriptor));
    // Only the root and the video remain
    assert_eq!(tree.len(), 2);
    assert!(!tree.has_class(video, "captioned"));
    assert!(!tree.has_attribute(video, "aria-describedby"));
    assert!(tree.resize_subscribers().is_empty());
}

#[test]
fn test_long_session_keeps_node_count_bounded() {
    let (mut renderer, _) = setup();
    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    for i in 0..1000 {
        let start = f64::from(i);
        renderer
            .track_mut(track)
            .unwrap()
            .add_cue(TextTrackCue::new(start, start + 1.0, &format!("Cue {i}")));
    }
    let before = renderer.surface().len();

    for i in 0..1000 {
        renderer.set_time(f64::from(i) + 0.5);
        assert_eq!(renderer.rendered_cues().count(), 1);
    }
    // One live cue node, and released slots are reused
    assert_eq!(renderer.surface().len(), before + 1);
    assert!(renderer.surface().capacity() <= before + 2);
}

#[test]
fn test_forced_rebuild_without_target_leaves_surface_alone() {
    let mut tree = DomTree::new();
    let video = tree.create_element("video");
    let root = tree.root();
    tree.append_child(root, video);
    tree.set_size(video, 320.0, 200.0);
    let mut renderer = CaptionRenderer::new(tree, RendererOptions::default());
    let track = showing_track(&mut renderer, TextTrackKind::Subtitles);
    renderer.track_mut(track).unwrap().add_cue(TextTrackCue::new(1.0, 3.0, "Hello"));
    renderer.set_time(1.5);

    let mutations = renderer.surface().mutation_count();
    renderer.set_render_hook(None);
    renderer.rebuild_captions(true);
    assert_eq!(renderer.surface().mutation_count(), mutations);
    assert_eq!(renderer.rendered_cues().count(), 1);

    // Attaching catches up with a full render
    renderer.attach_target(Some(video));
    let key = only_key(&renderer);
    let node = renderer.rendered_cue(&key).unwrap().node().unwrap();
    assert_eq!(renderer.surface().parent(node), Some(renderer.container()));
}
