//! fOS DOM - Visual surface primitive
//!
//! The host capabilities the caption renderer draws through, plus an
//! arena-backed headless tree that implements them.

mod geometry;
mod node;
mod style;
mod surface;
mod tree;

pub use geometry::{DOMRect, Offset};
pub use node::Node;
pub use style::StyleValue;
pub use surface::{Subscription, Surface};
pub use tree::{DomTree, TextMetrics};

/// Node identifier: arena slot plus the generation it was allocated in.
///
/// Slots are recycled after `Surface::remove_node`; the generation makes a
/// released handle stale instead of aliasing the slot's next occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId { index: 0, generation: 0 };

    /// Arena index
    pub fn index(self) -> usize {
        self.index as usize
    }
}
