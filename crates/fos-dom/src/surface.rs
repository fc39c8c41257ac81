//! Surface - host rendering capability
//!
//! Everything the caption renderer needs from the host: positionable
//! containers, style and attribute application, attachment, geometry and
//! content measurement, and resize notification subscription.

use crate::{NodeId, Offset, StyleValue};

/// Resize subscription handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub u64);

/// Host visual surface.
///
/// Node handles are owned by the caller that created them; the surface only
/// tracks the tree structure. A node is attached to at most one parent.
pub trait Surface {
    /// Default attachment root
    fn root(&self) -> NodeId;

    /// Check that a handle refers to a live node
    fn contains(&self, node: NodeId) -> bool;

    /// Create a detached, positionable element
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Detach and release a node together with its descendants. Released
    /// handles are no longer `contains`. The root cannot be removed.
    fn remove_node(&mut self, node: NodeId);

    /// Replace the text content of a node
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Text of the node and its descendants, in document order
    fn text_content(&self, node: NodeId) -> String;

    fn set_style(&mut self, node: NodeId, property: &str, value: StyleValue);

    fn style(&self, node: NodeId, property: &str) -> Option<StyleValue>;

    /// Apply several style properties at once
    fn apply_styles(&mut self, node: NodeId, styles: &[(&str, StyleValue)]) {
        for (property, value) in styles {
            self.set_style(node, property, value.clone());
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Append `child` to `parent`, detaching it from any previous parent first
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Detach a node from its parent. No-op when already detached.
    fn detach(&mut self, node: NodeId);

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Detach every child of `node`
    fn clear_children(&mut self, node: NodeId);

    /// Computed (width, height)
    fn computed_size(&self, node: NodeId) -> (f64, f64);

    /// Offset position relative to the offset parent
    fn offset(&self, node: NodeId) -> Offset;

    /// Content height after layout
    fn scroll_height(&self, node: NodeId) -> f64;

    /// Start receiving host resize notifications
    fn subscribe_resize(&mut self) -> Subscription;

    /// Release a resize subscription
    fn unsubscribe_resize(&mut self, subscription: Subscription);
}
