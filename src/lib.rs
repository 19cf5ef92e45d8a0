//! A position-indexed, order-balanced range tree.
//!
//! The tree stores a sequence of variable-length *segments*. Each segment is an opaque payload
//! with a known length. Segments can be inserted at any position, and arbitrary ranges can be
//! deleted, in time logarithmic in the number of segments. The tree stays height balanced
//! (every leaf is at the same depth) after every operation.
//!
//! The tree doesn't know anything about the segments it stores, beyond their length. When an
//! edit lands in the middle of a segment, the tree calls a split callback supplied in the
//! [`TreeConfig`] to cut the segment in two. Payload types can supply this callback by
//! implementing [`Segment`].
//!
//! Nodes are stored in an arena, so the doubly linked chain of leaves is just a list of
//! indexes. Deleting a range hands the removed segments back to the caller as a
//! [`SegmentRange`], which is itself a chain of leaves.
//!
//! ```rust
//! use range_tree::RangeTree;
//! use range_tree::testsegment::TestSegment;
//!
//! let mut tree = RangeTree::<TestSegment>::for_segment(2).unwrap();
//! tree.insert_range(0, 10, TestSegment::run(0, 10));
//! tree.insert_range(5, 3, TestSegment::run(100, 3));
//! assert_eq!(tree.len(), 13);
//!
//! let (offset, segment) = tree.get_item(6);
//! assert_eq!(offset, 1);
//! assert_eq!(segment.value_at(offset), 101);
//!
//! let removed = tree.delete_range(4, 5);
//! assert_eq!(removed.len(), 5);
//! assert_eq!(tree.len(), 8);
//! tree.dbg_check();
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use config::{ConfigError, ExtractFn, Segment, TreeConfig};
pub use check::InvariantError;
pub use debug::TreeStats;
pub use iter::{LeafIter, SegmentIter};
pub use node::LeafNode;
pub use root::RangeTree;
pub use segment_range::SegmentRange;

mod config;
mod node;
mod root;
mod insert;
mod delete;
mod segment_range;
mod iter;
mod check;
mod debug;
pub mod testsegment;

// In debug mode, nodes are kept intentionally small to exercise the node splitting / joining code
// more.
#[cfg(debug_assertions)]
pub const DEFAULT_ORDER: usize = 2;
#[cfg(not(debug_assertions))]
pub const DEFAULT_ORDER: usize = 7;

/// Slot arrays are stored inline up to this many slots. This covers leaves with an order of up
/// to 7. Larger orders spill to the heap.
pub(crate) const INLINE_SLOTS: usize = 16;

/// Length written into unoccupied slots.
pub(crate) const EMPTY_LEN: usize = usize::MAX;

/// Index of a node in the tree's arena, or of a leaf in a [`SegmentRange`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeIdx(pub(crate) usize);

impl NodeIdx {
    pub const NONE: NodeIdx = NodeIdx(usize::MAX);

    pub fn exists(&self) -> bool { self.0 != usize::MAX }
}

impl Default for NodeIdx {
    fn default() -> Self { Self::NONE }
}
