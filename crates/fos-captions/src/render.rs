//! Cue rendering hooks

use fos_dom::Surface;

use crate::rendered::{RenderedCue, renders_node};

/// Signature of the built-in renderer, handed to custom hooks
pub type DefaultRenderFn = fn(&mut RenderedCue, &mut dyn Surface);

/// Pluggable renderer.
///
/// Must leave `rendered.node()` set to a freshly created element, or unset to
/// suppress rendering of that cue. Must not re-enter the renderer.
pub type RenderHook = Box<dyn FnMut(&mut RenderedCue, &mut dyn Surface, DefaultRenderFn)>;

/// Render a cue as a `div` holding its text. Chapter and metadata cues get no node.
pub fn default_render_cue(rendered: &mut RenderedCue, surface: &mut dyn Surface) {
    if !renders_node(rendered.kind()) {
        rendered.set_node(surface, None);
        return;
    }
    let node = surface.create_element("div");
    let text = rendered.properties().content.text.clone();
    surface.set_text(node, &text);
    rendered.set_node(surface, Some(node));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use fos_dom::DomTree;
    use fos_media::{TextTrack, TextTrackCue, TextTrackKind};

    use crate::cue_type::DefaultCueBehavior;
    use crate::rendered::CueKey;

    fn rendered(kind: TextTrackKind) -> RenderedCue {
        let track = TextTrack::new(kind, "", "en");
        let cue = TextTrackCue::new(0.0, 1.0, "Some text");
        RenderedCue::new(CueKey::new(&track, &cue), &cue, &track, Rc::new(DefaultCueBehavior))
    }

    #[test]
    fn test_default_render() {
        let mut tree = DomTree::new();
        let mut r = rendered(TextTrackKind::Captions);
        default_render_cue(&mut r, &mut tree);

        let node = r.node().unwrap();
        assert_eq!(tree.text_content(node), "Some text");
        assert!(tree.has_class(node, "caption-cue"));
    }

    #[test]
    fn test_no_node_for_chapters_and_metadata() {
        let mut tree = DomTree::new();
        for kind in [TextTrackKind::Chapters, TextTrackKind::Metadata] {
            let mut r = rendered(kind);
            default_render_cue(&mut r, &mut tree);
            assert!(r.node().is_none());
        }
    }
}
