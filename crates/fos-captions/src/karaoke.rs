//! Karaoke cues
//!
//! Progressive highlighting driven by inline timestamp markers
//! (`<00:01.500>` or `<00:00:01.500>`). Each marker starts a new segment;
//! segments whose start has passed get the `past` class, the rest `future`.

use fos_dom::Surface;

use crate::cue_type::CueBehavior;
use crate::rendered::RenderedCue;

/// Type tag of the built-in karaoke behavior
pub const KARAOKE_CUE_TYPE: &str = "karaoke";

const BUILT_ATTR: &str = "data-karaoke";

/// A run of cue text revealed at `start`
#[derive(Debug, Clone, PartialEq)]
pub struct KaraokeSegment {
    pub start: f64,
    pub text: String,
}

/// Split cue text at timestamp markers. Text before the first marker starts
/// with the cue. Tags that are not timestamps stay in the text.
pub fn parse_karaoke(text: &str, cue_start: f64) -> Vec<KaraokeSegment> {
    let mut segments = Vec::new();
    let mut current = KaraokeSegment { start: cue_start, text: String::new() };
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>').map(|c| open + c) else {
            break;
        };
        current.text.push_str(&rest[..open]);
        let tag = &rest[open + 1..close];
        match parse_timestamp(tag) {
            Some(start) => {
                let next = KaraokeSegment { start, text: String::new() };
                let done = std::mem::replace(&mut current, next);
                if !done.text.is_empty() {
                    segments.push(done);
                }
            }
            None => current.text.push_str(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }
    current.text.push_str(rest);
    if !current.text.is_empty() {
        segments.push(current);
    }
    segments
}

/// Parse `hh:mm:ss.fff` or `mm:ss.fff` into seconds
fn parse_timestamp(tag: &str) -> Option<f64> {
    let parts: Vec<&str> = tag.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0u32, *m, *s),
        [h, m, s] => (h.parse().ok()?, *m, *s),
        _ => return None,
    };
    if !seconds.contains('.') {
        return None;
    }
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: f64 = seconds.parse().ok()?;
    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return None;
    }
    Some(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds)
}

/// Built-in progressive highlighting behavior
#[derive(Debug, Clone, Copy, Default)]
pub struct KaraokeCue;

impl CueBehavior for KaraokeCue {
    fn update_cue_time(&self, rendered: &mut RenderedCue, time: f64, surface: &mut dyn Surface) -> bool {
        let Some(node) = rendered.node() else {
            return false;
        };
        let props = rendered.properties();
        let segments = parse_karaoke(&props.content.text, props.start_time);

        let mut spans = surface.children(node);
        let mut changed = false;
        if !surface.has_attribute(node, BUILT_ATTR) || spans.len() != segments.len() {
            for span in spans {
                surface.remove_node(span);
            }
            surface.set_text(node, "");
            spans = segments
                .iter()
                .map(|segment| {
                    let span = surface.create_element("span");
                    surface.set_text(span, &segment.text);
                    surface.append_child(node, span);
                    span
                })
                .collect();
            surface.set_attribute(node, BUILT_ATTR, "");
            changed = true;
        }

        for (&span, segment) in spans.iter().zip(&segments) {
            let (on, off) = if segment.start <= time { ("past", "future") } else { ("future", "past") };
            if !surface.has_class(span, on) || surface.has_class(span, off) {
                surface.remove_class(span, off);
                surface.add_class(span, on);
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use fos_dom::DomTree;
    use fos_media::{TextTrack, TextTrackCue, TextTrackKind};

    use crate::render::default_render_cue;
    use crate::rendered::CueKey;

    #[test]
    fn test_parse_segments() {
        let segments = parse_karaoke("Never <00:11.000>gonna <00:00:11.500>give", 10.0);
        assert_eq!(
            segments,
            vec![
                KaraokeSegment { start: 10.0, text: "Never ".into() },
                KaraokeSegment { start: 11.0, text: "gonna ".into() },
                KaraokeSegment { start: 11.5, text: "give".into() },
            ]
        );
    }

    #[test]
    fn test_parse_keeps_other_tags() {
        let segments = parse_karaoke("<00:01.000><i>la</i> la", 0.0);
        assert_eq!(segments, vec![KaraokeSegment { start: 1.0, text: "<i>la</i> la".into() }]);
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("01:02:03.500"), Some(3723.5));
        assert_eq!(parse_timestamp("02:03.250"), Some(123.25));
        assert_eq!(parse_timestamp("02:03"), None);
        assert_eq!(parse_timestamp("75:00.000"), None);
        assert_eq!(parse_timestamp("b"), None);
    }

    #[test]
    fn test_progressive_highlighting() {
        let track = TextTrack::new(TextTrackKind::Subtitles, "", "en");
        let cue = TextTrackCue::new(0.0, 5.0, "one <00:01.000>two <00:02.000>three").with_type(KARAOKE_CUE_TYPE);
        let mut tree = DomTree::new();
        let mut rendered = RenderedCue::new(CueKey::new(&track, &cue), &cue, &track, Rc::new(KaraokeCue));
        default_render_cue(&mut rendered, &mut tree);
        let node = rendered.node().unwrap();

        assert!(rendered.update_time(0.5, &mut tree));
        let spans = tree.children(node);
        assert_eq!(spans.len(), 3);
        assert_eq!(tree.text_content(node), "one two three");
        assert!(tree.has_class(spans[0], "past"));
        assert!(tree.has_class(spans[1], "future"));

        // Nothing new to highlight
        assert!(!rendered.update_time(0.7, &mut tree));

        assert!(rendered.update_time(1.5, &mut tree));
        assert!(tree.has_class(spans[1], "past"));
        assert!(!tree.has_class(spans[1], "future"));
        assert!(tree.has_class(spans[2], "future"));
    }
}
