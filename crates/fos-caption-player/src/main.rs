//! fOS Caption Player - headless caption playback
//!
//! Plays a JSON cue script against a simulated video element and prints the
//! caption layout at every step.

mod error;
mod script;

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use fos_captions::{CaptionRenderer, CycleReport, RendererOptions};
use fos_dom::{DomTree, Surface};
use fos_media::{HTMLVideoElement, MediaController, MediaError, ReadyState};
use tracing_subscriber::EnvFilter;

use crate::error::PlayerError;
use crate::script::Script;

const USAGE: &str =
    "fos-caption-player <script.json> [--step SECONDS] [--width PX] [--height PX] [--show-descriptions]";

/// Command line options
#[derive(Debug, Clone, PartialEq)]
struct Args {
    script: String,
    step: f64,
    width: u32,
    height: u32,
    show_descriptions: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, PlayerError> {
        let mut parsed = Args {
            script: String::new(),
            step: 0.5,
            width: 640,
            height: 360,
            show_descriptions: false,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--step" => parsed.step = value(&mut args, "--step")?,
                "--width" => parsed.width = value(&mut args, "--width")?,
                "--height" => parsed.height = value(&mut args, "--height")?,
                "--show-descriptions" => parsed.show_descriptions = true,
                flag if flag.starts_with("--") => {
                    return Err(PlayerError::Usage(format!("unknown option {flag}")));
                }
                script => parsed.script = script.to_string(),
            }
        }
        if parsed.script.is_empty() {
            return Err(PlayerError::Usage(USAGE.into()));
        }
        if parsed.step.is_nan() || parsed.step <= 0.0 {
            return Err(PlayerError::Usage("--step must be positive".into()));
        }
        Ok(parsed)
    }
}

fn value<T: std::str::FromStr>(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<T, PlayerError> {
    args.next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| PlayerError::Usage(format!("{flag} needs a numeric value")))
}

/// Video element shared between the playback loop and the renderer
#[derive(Clone)]
struct SharedVideo(Rc<RefCell<HTMLVideoElement>>);

impl MediaController for SharedVideo {
    fn current_time(&self) -> f64 {
        self.0.borrow().current_time()
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.0.borrow_mut().pause()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    run(&args)?;
    Ok(())
}

fn run(args: &Args) -> Result<(), PlayerError> {
    let json = std::fs::read_to_string(&args.script)?;
    let script = Script::from_json(&json)?;
    let tracks = script.build_tracks()?;
    let duration = script.duration();
    tracing::info!("Playing {} ({} tracks, {:.3}s)", args.script, tracks.len(), duration);

    let mut tree = DomTree::new();
    let video_node = tree.create_element("video");
    let root = tree.root();
    tree.append_child(root, video_node);
    tree.set_size(video_node, f64::from(args.width), f64::from(args.height));
    if script.controls {
        tree.set_attribute(video_node, "controls", "");
    }

    let mut video = HTMLVideoElement::new(args.width, args.height);
    video.base.duration = duration;
    video.base.ready_state = ReadyState::HaveEnoughData;
    video.base.controls = script.controls;
    video.base.play()?;
    let video = SharedVideo(Rc::new(RefCell::new(video)));

    let options = RendererOptions::default()
        .with_target(video_node)
        .with_show_descriptions(args.show_descriptions);
    let mut renderer = CaptionRenderer::new(tree, options);
    for track in tracks {
        renderer.add_track(track);
    }
    renderer.bind_media(Some(Box::new(video.clone())));

    let mut time = 0.0;
    loop {
        video.0.borrow_mut().base.seek(time);
        let report = renderer.on_time_update();
        print_frame(&renderer, &report);

        if video.0.borrow().base.paused {
            tracing::info!("Paused on cue exit at {:.3}s, resuming", renderer.current_time());
            video.0.borrow_mut().base.play()?;
        }
        if video.0.borrow().base.ended {
            break;
        }
        time += args.step;
    }

    renderer.destroy();
    Ok(())
}

fn print_frame(renderer: &CaptionRenderer<DomTree>, report: &CycleReport) {
    let surface = renderer.surface();
    println!(
        "t={:.3}s active={} created={} expired={} rendered={} layout={}",
        renderer.current_time(),
        renderer.rendered_cues().count(),
        report.created,
        report.expired,
        report.rendered,
        report.laid_out,
    );
    for cue in renderer.rendered_cues() {
        let text = cue
            .node()
            .map(|node| surface.text_content(node))
            .unwrap_or_else(|| cue.properties().content.text.clone());
        match cue.placement() {
            Some(rect) => println!(
                "  [{}] {:?} at ({}, {}) {}x{}",
                cue.kind(),
                text,
                rect.x,
                rect.y,
                rect.width,
                rect.height
            ),
            None => println!("  [{}] {:?} (not placed)", cue.kind(), text),
        }
    }
}
