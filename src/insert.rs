use crate::{NodeIdx, RangeTree};
use crate::node::{InteriorNode, LeafNode, Node};

/// A node overflowed and was split in two. The new node is the right half, and needs to be
/// inserted into the parent directly after the node which split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Split {
    pub(crate) len: usize,
    pub(crate) node: NodeIdx,
}

impl<T: Clone> RangeTree<T> {
    /// Insert a segment with the given length at `pos`. If `pos` lands inside an existing
    /// segment, that segment is split in two around the new one.
    ///
    /// Inserting a zero length segment does nothing.
    ///
    /// Panics if `pos > self.len()`.
    pub fn insert_range(&mut self, pos: usize, len: usize, segment: T) {
        assert!(pos <= self.total_len, "Insert position {} past the end of the tree (len {})", pos, self.total_len);
        if len == 0 { return; }

        let split = self.insert_node(self.root, self.height, pos, len, segment);
        self.total_len += len;

        if let Some(split) = split {
            self.grow_root(split.node, split.len);
        }
    }

    fn insert_node(&mut self, idx: NodeIdx, height: usize, pos: usize, len: usize, segment: T) -> Option<Split> {
        if height == 0 {
            return self.insert_in_leaf(idx, pos, len, segment);
        }

        // Appending to the end of a child is fine. We don't need a new child for that.
        let (i, offset) = self.arena.interior(idx).slots.locate_end(pos);
        let child = self.arena.interior(idx).slots.items[i];
        let child_split = self.insert_node(child, height - 1, offset, len, segment);

        let slots = &mut self.arena.interior_mut(idx).slots;
        slots.lengths[i] += len;

        if let Some(split) = child_split {
            slots.lengths[i] -= split.len;
            slots.insert(i + 1, split.len, split.node);

            if slots.size > self.config.max_size() {
                return Some(self.split_interior(idx));
            }
        }
        None
    }

    fn insert_in_leaf(&mut self, idx: NodeIdx, pos: usize, len: usize, segment: T) -> Option<Split> {
        let extract = self.config.extract;
        let leaf = self.arena.leaf_mut(idx);
        let (i, offset) = leaf.slots.locate(pos);

        if offset == 0 {
            leaf.slots.insert(i, len, segment);
        } else {
            // Cut the existing segment in two, and put the new segment between the halves.
            let existing_len = leaf.slots.lengths[i];
            let existing = leaf.slots.take(i, &self.config.empty_segment);
            let (retained, removed) = extract(existing, offset, existing_len - offset);

            leaf.slots.lengths[i] = offset;
            leaf.slots.items[i] = retained;
            leaf.slots.insert(i + 1, len, segment);
            leaf.slots.insert(i + 2, existing_len - offset, removed);
        }

        if leaf.slots.size > self.config.max_size() {
            Some(self.split_leaf(idx))
        } else { None }
    }

    /// Move the upper half of an overflowing leaf into a new leaf, which is linked into the leaf
    /// chain directly after it.
    fn split_leaf(&mut self, idx: NodeIdx) -> Split {
        let capacity = self.config.leaf_capacity();
        let leaf = self.arena.leaf_mut(idx);
        let at = leaf.slots.size - leaf.slots.size / 2;
        let slots = leaf.slots.split_off(at, capacity, &self.config.empty_segment);
        let next = leaf.next;

        let len = slots.total_len();
        let new_idx = self.arena.alloc(Node::Leaf(LeafNode { slots, prev: idx, next }));

        self.arena.leaf_mut(idx).next = new_idx;
        if next.exists() {
            self.arena.leaf_mut(next).prev = new_idx;
        }

        Split { len, node: new_idx }
    }

    pub(crate) fn split_interior(&mut self, idx: NodeIdx) -> Split {
        let capacity = self.config.interior_capacity();
        let slots = &mut self.arena.interior_mut(idx).slots;
        let at = slots.size - slots.size / 2;
        let slots = slots.split_off(at, capacity, &NodeIdx::NONE);

        let len = slots.total_len();
        let new_idx = self.arena.alloc(Node::Interior(InteriorNode { slots }));
        Split { len, node: new_idx }
    }
}
