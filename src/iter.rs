use crate::{LeafNode, NodeIdx, RangeTree};
use crate::node::Arena;

/// Where a chain of leaves lives. Tree leaves are stored in the arena, and the leaves of a
/// removed range are stored in a plain list.
pub(crate) enum LeafSource<'a, T> {
    Tree(&'a Arena<T>),
    Range(&'a [LeafNode<T>]),
}

impl<'a, T> Clone for LeafSource<'a, T> {
    fn clone(&self) -> Self { *self }
}
impl<'a, T> Copy for LeafSource<'a, T> {}

impl<'a, T> LeafSource<'a, T> {
    fn get(self, idx: NodeIdx) -> &'a LeafNode<T> {
        match self {
            LeafSource::Tree(arena) => arena.leaf(idx),
            LeafSource::Range(leaves) => &leaves[idx.0],
        }
    }
}

/// Iterator over leaves by following the `next` links of the leaf chain.
pub struct LeafIter<'a, T> {
    source: LeafSource<'a, T>,
    next: NodeIdx,
}

impl<'a, T> LeafIter<'a, T> {
    pub(crate) fn new(source: LeafSource<'a, T>, first: NodeIdx) -> Self {
        Self { source, next: first }
    }
}

impl<'a, T> Iterator for LeafIter<'a, T> {
    type Item = &'a LeafNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.exists() { return None; }

        let leaf = self.source.get(self.next);
        self.next = leaf.next;
        Some(leaf)
    }
}

/// Iterator over the (length, segment) pairs in a leaf chain, left to right.
pub struct SegmentIter<'a, T> {
    leaves: LeafIter<'a, T>,
    current: Option<&'a LeafNode<T>>,
    idx: usize,
}

impl<'a, T> SegmentIter<'a, T> {
    pub(crate) fn new(leaves: LeafIter<'a, T>) -> Self {
        Self { leaves, current: None, idx: 0 }
    }
}

impl<'a, T> Iterator for SegmentIter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(leaf) = self.current {
                if self.idx < leaf.size() {
                    let i = self.idx;
                    self.idx += 1;
                    return Some((leaf.lengths()[i], &leaf.segments()[i]));
                }
            }

            // Empty leaves (only ever the root of an empty tree) are skipped here.
            self.current = Some(self.leaves.next()?);
            self.idx = 0;
        }
    }
}

impl<T: Clone> RangeTree<T> {
    /// Iterate through all the leaves in the tree, in order.
    pub fn iter_leaves(&self) -> LeafIter<'_, T> {
        LeafIter::new(LeafSource::Tree(&self.arena), self.first_leaf())
    }

    /// Iterate through all (length, segment) pairs in the tree, in order.
    pub fn iter(&self) -> SegmentIter<'_, T> {
        SegmentIter::new(self.iter_leaves())
    }
}

impl<'a, T: Clone> IntoIterator for &'a RangeTree<T> {
    type Item = (usize, &'a T);
    type IntoIter = SegmentIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

#[cfg(test)]
mod test {
    use crate::RangeTree;
    use crate::testsegment::TestSegment;

    #[test]
    fn iter_empty_tree() {
        let tree = RangeTree::<TestSegment>::for_segment(2).unwrap();
        assert_eq!(tree.iter().count(), 0);
        assert_eq!(tree.iter_leaves().count(), 1);
    }

    #[test]
    fn iter_matches_positions() {
        let mut tree = RangeTree::for_segment(1).unwrap();
        for i in 0..50 {
            tree.insert_range(0, 2, TestSegment::run(i * 10, 2));
        }

        let segments: Vec<_> = tree.iter().collect();
        assert_eq!(segments.len(), 50);
        assert!(tree.iter_leaves().count() > 1);

        let mut pos = 0;
        for (len, seg) in &tree {
            assert_eq!(tree.get_item(pos), (0, seg));
            pos += len;
        }
        assert_eq!(pos, tree.len());
        assert_eq!(segments.first().map(|(_, s)| s.value_at(0)), Some(490));
    }
}
