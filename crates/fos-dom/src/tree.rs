//! DOM Tree (arena-based allocation)
//!
//! Headless `Surface` implementation. Text is measured with a fixed-advance
//! font model so layout is deterministic without a rasterizer.

use std::collections::HashSet;

use crate::{Node, NodeId, Offset, StyleValue, Subscription, Surface};

/// Fixed-advance text model used for content measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Advance of a single character in pixels
    pub char_width: f64,
    /// Height of one line box in pixels
    pub line_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
        }
    }
}

/// Arena-based node tree. Removed slots go on a free list and are reused
/// with a bumped generation.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<u32>,
    metrics: TextMetrics,
    subscriptions: HashSet<u64>,
    next_subscription: u64,
    mutations: u64,
}

impl DomTree {
    /// Create a tree holding only the root (`body`) node
    pub fn new() -> Self {
        Self::with_metrics(TextMetrics::default())
    }

    pub fn with_metrics(metrics: TextMetrics) -> Self {
        Self {
            nodes: vec![Some(Node::element("body"))],
            generations: vec![0],
            free_list: Vec::new(),
            metrics,
            subscriptions: HashSet::new(),
            next_subscription: 1,
            mutations: 0,
        }
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if self.generations.get(id.index()) != Some(&id.generation) {
            return None;
        }
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.generations.get(id.index()) != Some(&id.generation) {
            return None;
        }
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Number of live nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of allocated slots, live or free
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn text_metrics(&self) -> TextMetrics {
        self.metrics
    }

    /// Fix the computed size of a host element
    pub fn set_size(&mut self, node: NodeId, width: f64, height: f64) {
        if let Some(n) = self.get_mut(node) {
            n.size = Some((width, height));
        }
    }

    /// Set the offset position of a host element
    pub fn set_offset(&mut self, node: NodeId, top: f64, left: f64, parent: Option<NodeId>) {
        if let Some(n) = self.get_mut(node) {
            n.offset_top = top;
            n.offset_left = left;
            n.offset_parent = parent;
        }
    }

    /// Live resize subscriptions; the host notifies each of them on resize
    pub fn resize_subscribers(&self) -> Vec<Subscription> {
        let mut subs: Vec<Subscription> = self.subscriptions.iter().map(|&id| Subscription(id)).collect();
        subs.sort_by_key(|s| s.0);
        subs
    }

    /// Count of structural, style, attribute and text mutations so far
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// Check whether `node` is `ancestor` or one of its descendants
    pub fn is_inclusive_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Some(n) = self.get(node) {
            out.push_str(&n.text);
            for &child in &n.children {
                self.collect_text(child, out);
            }
        }
    }

    /// Horizontal padding from a `padding` shorthand (`"V H"` or `"A"`)
    fn horizontal_padding(node: &Node) -> f64 {
        let Some(padding) = node.styles.get("padding") else {
            return 0.0;
        };
        match padding {
            StyleValue::Px(v) => *v,
            StyleValue::Keyword(s) => {
                let parts: Vec<&str> = s.split_whitespace().collect();
                let horizontal = if parts.len() >= 2 { parts[1] } else { parts.first().copied().unwrap_or("0px") };
                StyleValue::from(horizontal).as_px().unwrap_or(0.0)
            }
            _ => 0.0,
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for DomTree {
    fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    fn contains(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        let index = match self.free_list.pop() {
            Some(index) => {
                self.nodes[index as usize] = Some(Node::element(tag));
                index
            }
            None => {
                self.nodes.push(Some(Node::element(tag)));
                self.generations.push(0);
                (self.nodes.len() - 1) as u32
            }
        };
        self.mutations += 1;
        NodeId {
            index,
            generation: self.generations[index as usize],
        }
    }

    fn remove_node(&mut self, node: NodeId) {
        if node == NodeId::ROOT || !self.contains(node) {
            return;
        }
        self.detach(node);

        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            let Some(released) = self.nodes.get_mut(id.index()).and_then(Option::take) else {
                continue;
            };
            pending.extend(released.children);
            // Bump generation so old handles immediately go stale
            self.generations[id.index()] = self.generations[id.index()].wrapping_add(1);
            self.free_list.push(id.index);
        }
        self.mutations += 1;
        tracing::trace!("Released node {:?}", node);
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.get_mut(node) {
            n.text = text.to_string();
            self.mutations += 1;
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: StyleValue) {
        if let Some(n) = self.get_mut(node) {
            n.styles.insert(property.to_string(), value);
            self.mutations += 1;
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<StyleValue> {
        self.get(node).and_then(|n| n.styles.get(property).cloned())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.get(node).and_then(|n| n.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.get_mut(node) {
            n.attributes.insert(name.to_string(), value.to_string());
            self.mutations += 1;
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.get_mut(node) {
            if n.attributes.remove(name).is_some() {
                self.mutations += 1;
            }
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.get_mut(node) {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
                self.mutations += 1;
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.get_mut(node) {
            let before = n.classes.len();
            n.classes.retain(|c| c != class);
            if n.classes.len() != before {
                self.mutations += 1;
            }
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node).is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return;
        }
        // Refuse to create a cycle
        if self.is_inclusive_descendant(parent, child) {
            tracing::warn!("Refusing to append {:?} under its own descendant {:?}", child, parent);
            return;
        }
        self.detach(child);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
        self.mutations += 1;
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.get(node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        if let Some(n) = self.get_mut(node) {
            n.parent = None;
        }
        self.mutations += 1;
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.get(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn clear_children(&mut self, node: NodeId) {
        for child in self.children(node) {
            self.detach(child);
        }
    }

    fn computed_size(&self, node: NodeId) -> (f64, f64) {
        let Some(n) = self.get(node) else {
            return (0.0, 0.0);
        };
        if let Some(size) = n.size {
            return size;
        }
        (
            n.style_px("width").unwrap_or(0.0),
            n.style_px("height").unwrap_or(0.0),
        )
    }

    fn offset(&self, node: NodeId) -> Offset {
        self.get(node)
            .map(|n| Offset {
                top: n.offset_top,
                left: n.offset_left,
                parent: n.offset_parent,
            })
            .unwrap_or_default()
    }

    fn scroll_height(&self, node: NodeId) -> f64 {
        let Some(n) = self.get(node) else {
            return 0.0;
        };
        let text = self.text_content(node);
        if text.trim().is_empty() {
            return 0.0;
        }

        let (width, _) = self.computed_size(node);
        let border_box = n
            .styles
            .get("box-sizing")
            .and_then(StyleValue::as_keyword)
            .is_some_and(|v| v == "border-box");
        let content_width = if border_box {
            width - 2.0 * Self::horizontal_padding(n)
        } else {
            width
        };

        let per_line = ((content_width / self.metrics.char_width).floor() as usize).max(1);
        let lines: usize = text
            .lines()
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum();

        lines as f64 * self.metrics.line_height
    }

    fn subscribe_resize(&mut self) -> Subscription {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscriptions.insert(id);
        tracing::trace!("Resize subscription {} registered", id);
        Subscription(id)
    }

    fn unsubscribe_resize(&mut self, subscription: Subscription) {
        if self.subscriptions.remove(&subscription.0) {
            tracing::trace!("Resize subscription {} released", subscription.0);
        }
    }
}
