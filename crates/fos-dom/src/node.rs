//! Node - element record stored in the headless tree

use std::collections::HashMap;

use crate::{NodeId, StyleValue};

/// Element node
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Tag name
    pub tag: String,
    /// Parent node (None if detached or root)
    pub parent: Option<NodeId>,
    /// Children in document order
    pub children: Vec<NodeId>,
    /// Own text content
    pub text: String,
    pub styles: HashMap<String, StyleValue>,
    pub attributes: HashMap<String, String>,
    pub classes: Vec<String>,
    /// Fixed size for host elements (media targets); others derive size from styles
    pub size: Option<(f64, f64)>,
    pub offset_top: f64,
    pub offset_left: f64,
    pub offset_parent: Option<NodeId>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    /// Pixel length stored for a style property
    pub fn style_px(&self, property: &str) -> Option<f64> {
        self.styles.get(property).and_then(StyleValue::as_px)
    }
}
