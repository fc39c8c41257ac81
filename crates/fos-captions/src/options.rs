//! Renderer Configuration

use fos_dom::NodeId;

/// Caption renderer options
#[derive(Debug, Clone, PartialEq)]
pub struct RendererOptions {
    /// Base font size as a fraction of display height
    pub font_size_ratio: f64,

    /// Lower bound for the base font size (pt)
    pub min_font_size: f64,

    /// Line height as a multiple of the base font size
    pub line_height_ratio: f64,

    /// Lower bound for the base line height (pt)
    pub min_line_height: f64,

    /// Show the description surface
    pub show_descriptions: bool,

    /// Height of the media control strip, subtracted from the display height.
    /// When unset, targets with a `controls` attribute use `default_control_height`.
    pub control_height: Option<f64>,

    /// Control strip height assumed for targets with native controls (px)
    pub default_control_height: f64,

    /// Element the caption surfaces are attached under; the surface root when unset
    pub append_to: Option<NodeId>,

    /// Media element to overlay
    pub target: Option<NodeId>,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            font_size_ratio: 0.045,
            min_font_size: 10.0,
            line_height_ratio: 1.333,
            min_line_height: 16.0,
            show_descriptions: false,
            control_height: None,
            default_control_height: 35.0,
            append_to: None,
            target: None,
        }
    }
}

impl RendererOptions {
    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_append_to(mut self, node: NodeId) -> Self {
        self.append_to = Some(node);
        self
    }

    pub fn with_show_descriptions(mut self, show: bool) -> Self {
        self.show_descriptions = show;
        self
    }

    pub fn with_control_height(mut self, height: f64) -> Self {
        self.control_height = Some(height);
        self
    }

    /// Set font size ratio and minimum together
    pub fn with_font(mut self, ratio: f64, min_size: f64) -> Self {
        self.font_size_ratio = ratio;
        self.min_font_size = min_size;
        self
    }

    /// Set line height ratio and minimum together
    pub fn with_line_height(mut self, ratio: f64, min_height: f64) -> Self {
        self.line_height_ratio = ratio;
        self.min_line_height = min_height;
        self
    }
}
