use std::fmt::{Debug, Formatter};

use crate::{LeafIter, LeafNode, NodeIdx, SegmentIter};
use crate::iter::LeafSource;

/// The content removed from a tree by [`RangeTree::delete_range`](crate::RangeTree::delete_range).
///
/// This is a standalone chain of leaves, linked through their `prev` and `next` fields. The
/// chain is owned by the caller. It can be read, dropped, or spliced onto another removed range
/// (eg to keep a free list of segments for reuse).
#[derive(Clone)]
pub struct SegmentRange<T> {
    leaves: Vec<LeafNode<T>>,
    len: usize,
    leaf_capacity: usize,
    empty: T,
}

impl<T: Clone> SegmentRange<T> {
    pub(crate) fn new(leaf_capacity: usize, empty: T) -> Self {
        Self {
            leaves: vec![],
            len: 0,
            leaf_capacity,
            empty,
        }
    }

    fn link_leaf(&mut self, mut leaf: LeafNode<T>) {
        let idx = self.leaves.len();
        leaf.prev = if idx > 0 { NodeIdx(idx - 1) } else { NodeIdx::NONE };
        leaf.next = NodeIdx::NONE;
        if let Some(last) = self.leaves.last_mut() {
            last.next = NodeIdx(idx);
        }
        self.leaves.push(leaf);
    }

    /// Add a single segment onto the end of the chain.
    pub(crate) fn push(&mut self, len: usize, segment: T) {
        debug_assert!(len > 0);
        self.len += len;

        if let Some(last) = self.leaves.last_mut() {
            if last.slots.size < last.slots.capacity() {
                last.slots.push(len, segment);
                return;
            }
        }

        let mut leaf = LeafNode::new(self.leaf_capacity, &self.empty);
        leaf.slots.push(len, segment);
        self.link_leaf(leaf);
    }

    /// Move a whole leaf (detached from its tree) onto the end of the chain.
    pub(crate) fn push_leaf(&mut self, leaf: LeafNode<T>) {
        if leaf.size() == 0 { return; }
        self.len += leaf.total_len();
        self.link_leaf(leaf);
    }

    /// Splice another removed range onto the end of this one.
    pub fn append(&mut self, other: SegmentRange<T>) {
        for leaf in other.leaves {
            self.push_leaf(leaf);
        }
    }

    /// The removed segments, in order.
    pub fn into_segments(self) -> Vec<(usize, T)> {
        let mut result = Vec::with_capacity(self.count_segments());
        for leaf in self.leaves {
            let size = leaf.slots.size;
            result.extend(leaf.slots.lengths.into_iter().zip(leaf.slots.items).take(size));
        }
        result
    }
}

impl<T> SegmentRange<T> {
    /// Total length of all removed segments.
    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn num_leaves(&self) -> usize { self.leaves.len() }

    pub fn count_segments(&self) -> usize {
        self.leaves.iter().map(|leaf| leaf.size()).sum()
    }

    fn first(&self) -> NodeIdx {
        if self.leaves.is_empty() { NodeIdx::NONE } else { NodeIdx(0) }
    }

    /// Iterate the leaves of the chain by following their links.
    pub fn leaves(&self) -> LeafIter<'_, T> {
        LeafIter::new(LeafSource::Range(&self.leaves), self.first())
    }

    /// Iterate the (length, segment) pairs of the chain.
    pub fn iter(&self) -> SegmentIter<'_, T> {
        SegmentIter::new(self.leaves())
    }
}

impl<T: Debug> Debug for SegmentRange<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentRange")
            .field("len", &self.len)
            .field("(content)", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Clone> IntoIterator for SegmentRange<T> {
    type Item = (usize, T);
    type IntoIter = std::vec::IntoIter<(usize, T)>;

    fn into_iter(self) -> Self::IntoIter { self.into_segments().into_iter() }
}

impl<'a, T> IntoIterator for &'a SegmentRange<T> {
    type Item = (usize, &'a T);
    type IntoIter = SegmentIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testsegment::TestSegment;

    fn range_of(lens: &[usize]) -> SegmentRange<TestSegment> {
        let mut range = SegmentRange::new(4, TestSegment::default());
        let mut next = 0;
        for len in lens {
            range.push(*len, TestSegment::run(next, *len));
            next += *len as u32;
        }
        range
    }

    #[test]
    fn empty_range() {
        let range = range_of(&[]);
        assert!(range.is_empty());
        assert_eq!(range.num_leaves(), 0);
        assert_eq!(range.iter().count(), 0);
        assert!(range.into_segments().is_empty());
    }

    #[test]
    fn push_fills_leaves_and_links_them() {
        let range = range_of(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(range.len(), 21);
        assert_eq!(range.num_leaves(), 2);
        assert_eq!(range.count_segments(), 6);

        let leaves: Vec<_> = range.leaves().collect();
        assert_eq!(leaves[0].prev(), NodeIdx::NONE);
        assert_eq!(leaves[0].next(), NodeIdx(1));
        assert_eq!(leaves[1].prev(), NodeIdx(0));
        assert_eq!(leaves[1].next(), NodeIdx::NONE);

        let lens: Vec<_> = range.iter().map(|(len, _)| len).collect();
        assert_eq!(lens, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn append_keeps_order() {
        let mut a = range_of(&[3, 3, 3, 3, 3]);
        let b = range_of(&[7]);
        a.append(b);
        assert_eq!(a.len(), 22);
        assert_eq!(a.num_leaves(), 3);

        let segments = a.into_segments();
        assert_eq!(segments.len(), 6);
        assert_eq!(segments[5], (7, TestSegment::run(0, 7)));
        assert_eq!(segments[0], (3, TestSegment::run(0, 3)));
    }
}
