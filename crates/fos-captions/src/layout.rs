//! Caption Layout
//!
//! Greedy packing of simultaneously visible cues. Every placed cue claims a
//! horizontal band of the available area, which then shrinks from whichever
//! side leaves the larger region for the next cue.

use fos_dom::{DOMRect, StyleValue, Surface};

use crate::direction::TextDirection;
use crate::options::RendererOptions;
use crate::rendered::RenderedCue;

/// Display geometry of the overlaid media element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplayMetrics {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Remaining unclaimed rectangle during one layout pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CueArea {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub height: f64,
    pub width: f64,
}

impl CueArea {
    /// The whole display, in display-local coordinates
    pub fn new(metrics: &DisplayMetrics) -> Self {
        Self {
            top: 0.0,
            left: 0.0,
            bottom: metrics.height,
            right: metrics.width,
            height: metrics.height,
            width: metrics.width,
        }
    }

    /// Claim the band `[cue_top, cue_top + cue_height)`.
    ///
    /// Shrinks from the bottom when the bottom edge stays below the cue top and
    /// the span freed by raising the top (`cue_top - 2 * top`) is at least the
    /// span freed by lowering the bottom; otherwise raises the top. Ties go to
    /// the bottom. The area never inverts: `bottom >= top` always holds.
    pub fn claim(&mut self, cue_top: f64, cue_height: f64) {
        let cue_bottom = cue_top + cue_height;
        if cue_top - 2.0 * self.top >= self.bottom - cue_bottom && self.bottom > cue_top {
            self.bottom = cue_top.max(self.top);
        } else if self.top < cue_bottom {
            self.top = cue_bottom.min(self.bottom);
        }
        self.height = self.bottom - self.top;
    }

    /// Whether a cue of `cue_height` still fits
    pub fn fits(&self, cue_height: f64) -> bool {
        cue_height <= self.height
    }
}

/// Base typography derived from the display height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseFont {
    /// Font size (pt)
    pub font_size: f64,
    /// Line height (pt)
    pub line_height: f64,
}

impl BaseFont {
    pub fn compute(metrics: &DisplayMetrics, options: &RendererOptions) -> Self {
        let font_size = ((metrics.height * options.font_size_ratio / 96.0) * 72.0).max(options.min_font_size);
        let line_height = (font_size * options.line_height_ratio).floor().max(options.min_line_height);
        Self { font_size, line_height }
    }

    /// Style properties for a caption surface covering the display
    pub fn container_styles(&self, metrics: &DisplayMetrics) -> Vec<(&'static str, StyleValue)> {
        vec![
            ("height", StyleValue::Px(metrics.height)),
            ("width", StyleValue::Px(metrics.width)),
            ("top", StyleValue::Px(metrics.top)),
            ("left", StyleValue::Px(metrics.left)),
            ("font-size", StyleValue::Pt(self.font_size)),
            ("line-height", StyleValue::Pt(self.line_height)),
        ]
    }
}

/// Default positioning: full available width, centered, anchored to the
/// bottom of the available area with a content-measured height.
///
/// A cue taller than what is left of the area is hidden and left unplaced.
pub fn default_position_cue(
    rendered: &mut RenderedCue,
    area: &mut CueArea,
    metrics: &DisplayMetrics,
    surface: &mut dyn Surface,
) {
    let Some(node) = rendered.node() else {
        return;
    };

    let cue_width = area.width;
    let cue_x = (area.right - cue_width) / 2.0 + area.left;
    let direction = TextDirection::detect(&surface.text_content(node));

    surface.apply_styles(
        node,
        &[
            ("display", "inline-block".into()),
            ("position", "absolute".into()),
            ("unicode-bidi", "plaintext".into()),
            ("overflow", "hidden".into()),
            // Baseline for the content measurement below
            ("height", StyleValue::Px(1.0)),
            ("width", StyleValue::Px(cue_width)),
            ("left", StyleValue::Px(cue_x)),
            ("padding", format!("0px {}px", (metrics.width / 100.0).floor()).into()),
            ("text-align", "center".into()),
            ("direction", direction.as_str().into()),
            ("line-height", "normal".into()),
            ("box-sizing", "border-box".into()),
        ],
    );

    let cue_height = surface.scroll_height(node);
    if !area.fits(cue_height) {
        tracing::debug!("No room for cue {:?} ({}px, {}px left)", rendered.key(), cue_height, area.height);
        surface.set_style(node, "visibility", "hidden".into());
        rendered.clear_placement();
        return;
    }
    surface.set_style(node, "visibility", "visible".into());

    let cue_y = area.height + area.top - cue_height;
    surface.set_style(node, "height", StyleValue::Px(cue_height));
    surface.set_style(node, "top", StyleValue::Px(cue_y));

    area.claim(cue_y, cue_height);
    rendered.set_placement(DOMRect::from_xywh(cue_x, cue_y, cue_width, cue_height));
}
