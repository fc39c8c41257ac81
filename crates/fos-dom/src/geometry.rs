//! Geometry
//!
//! DOMRect and offset positions.

use crate::NodeId;

/// DOMRect - rectangle geometry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top edge (same as y)
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge (same as x)
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Check if rects overlap. Shared edges do not count.
    pub fn intersects(&self, other: &DOMRect) -> bool {
        !(self.right() <= other.x
            || self.x >= other.right()
            || self.bottom() <= other.y
            || self.y >= other.bottom())
    }

    /// Check if the vertical spans overlap. Shared edges do not count.
    pub fn overlaps_vertically(&self, other: &DOMRect) -> bool {
        self.y < other.bottom() && other.y < self.bottom()
    }
}

/// Offset position relative to the offset parent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Offset {
    pub top: f64,
    pub left: f64,
    pub parent: Option<NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_rect() {
        let rect = DOMRect::from_xywh(10.0, 20.0, 100.0, 50.0);

        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.left(), 10.0);
    }

    #[test]
    fn test_intersects() {
        let rect1 = DOMRect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let rect2 = DOMRect::from_xywh(50.0, 50.0, 100.0, 100.0);
        let rect3 = DOMRect::from_xywh(200.0, 200.0, 50.0, 50.0);

        assert!(rect1.intersects(&rect2));
        assert!(!rect1.intersects(&rect3));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let lower = DOMRect::from_xywh(0.0, 160.0, 100.0, 40.0);
        let upper = DOMRect::from_xywh(0.0, 120.0, 100.0, 40.0);

        assert!(!lower.intersects(&upper));
        assert!(!lower.overlaps_vertically(&upper));
    }
}
