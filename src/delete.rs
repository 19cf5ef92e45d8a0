use std::ops::Range;

use smallvec::SmallVec;

use crate::{INLINE_SLOTS, NodeIdx, RangeTree, SegmentRange};
use crate::insert::Split;
use crate::node::{Node, Slots};

/// A subtree left behind by a deletion which can't stay where it was. This happens when a node
/// is left with a single child (or no children at all). The node is released, and its remaining
/// content is handed up to be grafted back into the tree somewhere else.
///
/// The orphan's root may be underfull, but every node inside it is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Orphan {
    pub(crate) node: NodeIdx,
    pub(crate) len: usize,
    /// How many levels below the vacated slot the orphan's root sits. Always at least 1.
    pub(crate) height_delta: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rebalance {
    /// Both nodes were already at least half full.
    Untouched,
    /// Slots moved between the nodes. Both nodes are now valid.
    Redistributed,
    /// Everything moved into the left node. The right node has been released.
    Merged,
}

/// What's left at one side of a deleted range which spans multiple children.
enum Edge {
    /// The range covered the edge child entirely.
    Gone,
    /// The edge child was trimmed, and is still in its slot.
    Child,
    /// The edge child was released, leaving an orphan behind.
    Orphan(Orphan),
}

/// Balance two adjacent slot arrays by moving the fewest slots needed so both hold at least
/// `min` items.
fn redistribute<V: Clone>(left: &mut Slots<V>, right: &mut Slots<V>, min: usize, empty: &V) {
    if left.size < min {
        let count = min - left.size;
        left.take_front_of(right, count, empty);
    } else {
        let count = min - right.size;
        right.take_back_of(left, count, empty);
    }
}

impl<T: Clone> RangeTree<T> {
    /// Remove `len` items starting at `pos`. Segments which straddle the edges of the range are
    /// split. The removed content is returned, in order.
    ///
    /// Panics if the range extends past the end of the tree.
    pub fn delete_range(&mut self, pos: usize, len: usize) -> SegmentRange<T> {
        assert!(pos <= self.total_len && len <= self.total_len - pos,
            "Deleted range {}..{} past the end of the tree (len {})", pos, pos.saturating_add(len), self.total_len);

        let mut removed = self.new_segment_range();
        if len == 0 { return removed; }

        if len == self.total_len {
            self.take_subtree(self.root, self.height, &mut removed);
            self.root = self.new_leaf();
            self.height = 0;
            self.total_len = 0;
            return removed;
        }

        if self.height == 0 {
            self.delete_in_leaf(self.root, pos, len, &mut removed);
        } else if let Some(orphan) = self.delete_node(self.root, self.height, pos, len, &mut removed) {
            // The root itself was released. Whatever is left becomes the new root.
            self.root = orphan.node;
            self.height -= orphan.height_delta;
        }

        self.total_len -= len;
        self.collapse_root();
        removed
    }

    /// Delete from a subtree which keeps some of its content. Nodes inside the subtree are left
    /// valid, though the subtree's root may be underfull.
    fn delete_partial(&mut self, idx: NodeIdx, height: usize, pos: usize, len: usize, removed: &mut SegmentRange<T>) -> Option<Orphan> {
        if height == 0 {
            self.delete_in_leaf(idx, pos, len, removed);
            None
        } else {
            self.delete_node(idx, height, pos, len, removed)
        }
    }

    fn delete_node(&mut self, idx: NodeIdx, height: usize, pos: usize, len: usize, removed: &mut SegmentRange<T>) -> Option<Orphan> {
        let slots = &self.arena.interior(idx).slots;
        let (start_idx, start_offset) = slots.locate(pos);
        let (end_idx, end_offset) = slots.locate_end(pos + len);

        if start_idx == end_idx {
            self.delete_in_child(idx, height, start_idx, start_offset, len, removed)
        } else {
            self.partition_node(idx, height, start_idx, start_offset, end_idx, end_offset, removed)
        }
    }

    fn delete_in_leaf(&mut self, idx: NodeIdx, pos: usize, len: usize, removed: &mut SegmentRange<T>) {
        let extract = self.config.extract;
        let empty = &self.config.empty_segment;
        let slots = &mut self.arena.leaf_mut(idx).slots;

        let (start_idx, start_offset) = slots.locate(pos);
        let (end_idx, end_offset) = slots.locate_end(pos + len);

        if start_idx == end_idx {
            let seg_len = slots.lengths[start_idx];
            if start_offset == 0 && len == seg_len {
                for (len, seg) in slots.remove(start_idx..start_idx + 1, empty) {
                    removed.push(len, seg);
                }
            } else {
                let seg = slots.take(start_idx, empty);
                let (retained, gone) = extract(seg, start_offset, len);
                slots.items[start_idx] = retained;
                slots.lengths[start_idx] -= len;
                removed.push(len, gone);
            }
            return;
        }

        // Whole slots to remove.
        let mut whole = start_idx..end_idx + 1;

        if start_offset > 0 {
            let seg_len = slots.lengths[start_idx];
            let seg = slots.take(start_idx, empty);
            let (retained, gone) = extract(seg, start_offset, seg_len - start_offset);
            slots.items[start_idx] = retained;
            slots.lengths[start_idx] = start_offset;
            removed.push(seg_len - start_offset, gone);
            whole.start += 1;
        }

        let end_len = slots.lengths[end_idx];
        let tail = if end_offset < end_len {
            let seg = slots.take(end_idx, empty);
            let (retained, gone) = extract(seg, 0, end_offset);
            slots.items[end_idx] = retained;
            slots.lengths[end_idx] = end_len - end_offset;
            whole.end -= 1;
            Some((end_offset, gone))
        } else { None };

        for (len, seg) in slots.remove(whole, empty) {
            removed.push(len, seg);
        }
        if let Some((len, seg)) = tail {
            removed.push(len, seg);
        }
    }

    /// The deleted range is entirely inside child `i`.
    fn delete_in_child(&mut self, idx: NodeIdx, height: usize, i: usize, offset: usize, len: usize, removed: &mut SegmentRange<T>) -> Option<Orphan> {
        let slots = &self.arena.interior(idx).slots;
        let child = slots.items[i];

        if offset == 0 && len == slots.lengths[i] {
            self.take_children(idx, height, i..i + 1, removed);
        } else {
            match self.delete_partial(child, height - 1, offset, len, removed) {
                None => {
                    self.arena.interior_mut(idx).slots.lengths[i] -= len;
                    self.ensure_balanced_child(idx, height, i);
                }
                Some(orphan) => {
                    self.arena.interior_mut(idx).slots.remove(i..i + 1, &NodeIdx::NONE);
                    if let Some(orphan) = self.settle_orphan(idx, height, i, orphan) {
                        return Some(orphan);
                    }
                }
            }
        }

        self.finish_node(idx)
    }

    /// The deleted range spans several children. The first and last children might only be
    /// partly deleted. Everything between them is removed outright. Then the seam left behind
    /// between the two edges is stitched back together.
    #[allow(clippy::too_many_arguments)]
    fn partition_node(&mut self, idx: NodeIdx, height: usize, start_idx: usize, start_offset: usize,
                      end_idx: usize, end_offset: usize, removed: &mut SegmentRange<T>) -> Option<Orphan> {
        let slots = &self.arena.interior(idx).slots;
        let start_child = slots.items[start_idx];
        let start_len = slots.lengths[start_idx];
        let end_len = slots.lengths[end_idx];

        let first_whole = if start_offset > 0 { start_idx + 1 } else { start_idx };
        let last_whole = if end_offset < end_len { end_idx } else { end_idx + 1 };

        // Slot of the first child after the start edge.
        let mut at = start_idx;

        let left = if start_offset > 0 {
            match self.delete_partial(start_child, height - 1, start_offset, start_len - start_offset, removed) {
                None => {
                    self.arena.interior_mut(idx).slots.lengths[start_idx] = start_offset;
                    at += 1;
                    Edge::Child
                }
                Some(orphan) => {
                    self.arena.interior_mut(idx).slots.remove(start_idx..start_idx + 1, &NodeIdx::NONE);
                    Edge::Orphan(orphan)
                }
            }
        } else { Edge::Gone };

        self.take_children(idx, height, at..at + (last_whole - first_whole), removed);

        let right = if end_offset < end_len {
            let end_child = self.arena.interior(idx).slots.items[at];
            match self.delete_partial(end_child, height - 1, 0, end_offset, removed) {
                None => {
                    self.arena.interior_mut(idx).slots.lengths[at] = end_len - end_offset;
                    Edge::Child
                }
                Some(orphan) => {
                    self.arena.interior_mut(idx).slots.remove(at..at + 1, &NodeIdx::NONE);
                    Edge::Orphan(orphan)
                }
            }
        } else { Edge::Gone };

        // Trimmed children sit at slots at-1 (left edge) and at (right edge).
        match (left, right) {
            (Edge::Gone, Edge::Gone) => {},
            (Edge::Child, Edge::Gone) => self.ensure_balanced_child(idx, height, at - 1),
            (Edge::Gone, Edge::Child) => self.ensure_balanced_child(idx, height, at),
            (Edge::Child, Edge::Child) => {
                let slots = &self.arena.interior(idx).slots;
                let (l, r) = (slots.items[at - 1], slots.items[at]);
                match self.rebalance_nodes(l, r, height - 1) {
                    Rebalance::Untouched => {},
                    Rebalance::Redistributed => self.refresh_lengths(idx, at - 1..at + 1),
                    Rebalance::Merged => {
                        let slots = &mut self.arena.interior_mut(idx).slots;
                        let right_len = slots.lengths[at];
                        slots.lengths[at - 1] += right_len;
                        slots.remove(at..at + 1, &NodeIdx::NONE);
                        // Both halves could have been underfull.
                        self.ensure_balanced_child(idx, height, at - 1);
                    }
                }
            }
            (Edge::Orphan(orphan), Edge::Child) => {
                self.graft_into_child(idx, height, at, orphan, true);
                self.ensure_balanced_child(idx, height, at);
            }
            (Edge::Child, Edge::Orphan(orphan)) => {
                self.graft_into_child(idx, height, at - 1, orphan, false);
                self.ensure_balanced_child(idx, height, at - 1);
            }
            (Edge::Orphan(orphan), Edge::Gone) | (Edge::Gone, Edge::Orphan(orphan)) => {
                if let Some(orphan) = self.settle_orphan(idx, height, at, orphan) {
                    return Some(orphan);
                }
            }
            (Edge::Orphan(a), Edge::Orphan(b)) => {
                let (node, len, joined_height) = self.join_orphans(a, b, height - 1);

                if joined_height == height - 1 {
                    self.arena.interior_mut(idx).slots.insert(at, len, node);
                    self.ensure_balanced_child(idx, height, at);
                } else {
                    let orphan = Orphan { node, len, height_delta: height - 1 - joined_height };
                    if let Some(orphan) = self.settle_orphan(idx, height, at, orphan) {
                        return Some(orphan);
                    }
                }
            }
        }

        self.finish_node(idx)
    }

    /// Remove whole children from an interior node, moving all their content into `removed`.
    fn take_children(&mut self, idx: NodeIdx, height: usize, range: Range<usize>, removed: &mut SegmentRange<T>) {
        if range.is_empty() { return; }
        let children = self.arena.interior_mut(idx).slots.remove(range, &NodeIdx::NONE);
        for (_, child) in children {
            self.take_subtree(child, height - 1, removed);
        }
    }

    /// Release every node in a subtree. Its leaves are unlinked from the leaf chain and moved,
    /// in order, into `removed`.
    pub(crate) fn take_subtree(&mut self, idx: NodeIdx, height: usize, removed: &mut SegmentRange<T>) {
        if height == 0 {
            self.arena.unlink_leaf(idx);
            match self.arena.release(idx) {
                Node::Leaf(leaf) => removed.push_leaf(leaf),
                Node::Interior(_) => panic!("Expected leaf at height 0"),
            }
        } else {
            let children: SmallVec<[NodeIdx; INLINE_SLOTS]> = self.arena.interior(idx).slots.items()
                .iter().copied().collect();
            for child in children {
                self.take_subtree(child, height - 1, removed);
            }
            self.arena.release(idx);
        }
    }

    /// An orphan was left where slot `at` used to be. Graft it into a neighbouring child.
    ///
    /// If this node has no children left, it is released and the orphan is passed up instead.
    fn settle_orphan(&mut self, idx: NodeIdx, height: usize, at: usize, orphan: Orphan) -> Option<Orphan> {
        if self.arena.interior(idx).slots.size == 0 {
            self.arena.release(idx);
            return Some(Orphan { height_delta: orphan.height_delta + 1, ..orphan });
        }

        if at > 0 {
            self.graft_into_child(idx, height, at - 1, orphan, false);
        } else {
            self.graft_into_child(idx, height, 0, orphan, true);
        }
        None
    }

    /// Reparent an orphan into child `i`, at its start (`before`) or its end. If the child splits,
    /// the new sibling is added directly after it.
    fn graft_into_child(&mut self, idx: NodeIdx, height: usize, i: usize, orphan: Orphan, before: bool) {
        let child = self.arena.interior(idx).slots.items[i];
        let orphan_height = height - 1 - orphan.height_delta;
        let split = self.reparent(child, height - 1, orphan.node, orphan_height, orphan.len, before);

        let slots = &mut self.arena.interior_mut(idx).slots;
        slots.lengths[i] += orphan.len;
        if let Some(split) = split {
            slots.lengths[i] -= split.len;
            slots.insert(i + 1, split.len, split.node);
        }
    }

    /// Inject the subtree `orphan` (of height `orphan_height`) into `target` at the given edge.
    /// This walks down the edge until it finds the level where the orphan belongs, then
    /// rebalances the orphan against the edge node there.
    ///
    /// Every node inside `target` stays valid. Returns the right half if `target` had to split.
    fn reparent(&mut self, target: NodeIdx, target_height: usize, orphan: NodeIdx, orphan_height: usize,
                orphan_len: usize, before: bool) -> Option<Split> {
        debug_assert!(target_height > orphan_height);
        assert_eq!(self.subtree_height(target), target_height, "Cannot reparent into a node of a different height");

        let slots = &self.arena.interior(target).slots;
        let e = if before { 0 } else { slots.size - 1 };
        let edge = slots.items[e];

        if target_height == orphan_height + 1 {
            let (left, right) = if before { (orphan, edge) } else { (edge, orphan) };

            match self.rebalance_nodes(left, right, orphan_height) {
                Rebalance::Merged => {
                    let slots = &mut self.arena.interior_mut(target).slots;
                    // The merged content always ends up in the left node.
                    slots.items[e] = left;
                    slots.lengths[e] += orphan_len;
                }
                Rebalance::Untouched | Rebalance::Redistributed => {
                    let edge_len = self.arena.get(edge).total_len();
                    let orphan_len = self.arena.get(orphan).total_len();
                    let slots = &mut self.arena.interior_mut(target).slots;
                    slots.lengths[e] = edge_len;
                    if before {
                        slots.insert(0, orphan_len, orphan);
                    } else {
                        slots.push(orphan_len, orphan);
                    }
                }
            }
        } else {
            let split = self.reparent(edge, target_height - 1, orphan, orphan_height, orphan_len, before);
            let slots = &mut self.arena.interior_mut(target).slots;
            slots.lengths[e] += orphan_len;
            if let Some(split) = split {
                slots.lengths[e] -= split.len;
                slots.insert(e + 1, split.len, split.node);
            }
        }

        if self.arena.interior(target).slots.size > self.config.max_size() {
            Some(self.split_interior(target))
        } else { None }
    }

    /// Combine the orphans from both edges of a deleted range into a single subtree. The left
    /// orphan's content comes first. Returns (node, length, height).
    fn join_orphans(&mut self, a: Orphan, b: Orphan, slot_height: usize) -> (NodeIdx, usize, usize) {
        let a_height = slot_height - a.height_delta;
        let b_height = slot_height - b.height_delta;
        let len = a.len + b.len;

        if a_height == b_height {
            match self.rebalance_nodes(a.node, b.node, a_height) {
                Rebalance::Merged => (a.node, len, a_height),
                Rebalance::Untouched | Rebalance::Redistributed => {
                    let a_len = self.arena.get(a.node).total_len();
                    (self.wrap_pair(a.node, a_len, b.node, len - a_len), len, a_height + 1)
                }
            }
        } else if a_height > b_height {
            match self.reparent(a.node, a_height, b.node, b_height, b.len, false) {
                None => (a.node, len, a_height),
                Some(split) => (self.wrap_pair(a.node, len - split.len, split.node, split.len), len, a_height + 1),
            }
        } else {
            match self.reparent(b.node, b_height, a.node, a_height, a.len, true) {
                None => (b.node, len, b_height),
                Some(split) => (self.wrap_pair(b.node, len - split.len, split.node, split.len), len, b_height + 1),
            }
        }
    }

    /// Rebalance two adjacent nodes at the same height. If they hold too few slots between them
    /// to both be valid, everything is merged into `left` and `right` is released.
    pub(crate) fn rebalance_nodes(&mut self, left: NodeIdx, right: NodeIdx, height: usize) -> Rebalance {
        assert_eq!(self.subtree_height(left), height, "Cannot rebalance nodes at different heights");
        assert_eq!(self.subtree_height(right), height, "Cannot rebalance nodes at different heights");

        let min = self.config.min_size();
        let a = self.arena.get(left).size();
        let b = self.arena.get(right).size();
        if a >= min && b >= min { return Rebalance::Untouched; }

        let empty = &self.config.empty_segment;
        if a + b >= min * 2 {
            match self.arena.pair_mut(left, right) {
                (Node::Leaf(l), Node::Leaf(r)) => redistribute(&mut l.slots, &mut r.slots, min, empty),
                (Node::Interior(l), Node::Interior(r)) => redistribute(&mut l.slots, &mut r.slots, min, &NodeIdx::NONE),
                _ => panic!("Cannot rebalance nodes at different heights"),
            }
            return Rebalance::Redistributed;
        }

        let is_leaf = match self.arena.pair_mut(left, right) {
            (Node::Leaf(l), Node::Leaf(r)) => {
                l.slots.take_front_of(&mut r.slots, b, empty);
                true
            }
            (Node::Interior(l), Node::Interior(r)) => {
                l.slots.take_front_of(&mut r.slots, b, &NodeIdx::NONE);
                false
            }
            _ => panic!("Cannot merge nodes at different heights"),
        };

        if is_leaf {
            self.arena.unlink_leaf(right);
        }
        self.arena.release(right);
        Rebalance::Merged
    }

    /// Make sure child `i` is at least half full, by rebalancing it with a sibling. Its left
    /// sibling is used if it has one.
    fn ensure_balanced_child(&mut self, idx: NodeIdx, height: usize, i: usize) {
        let slots = &self.arena.interior(idx).slots;
        if slots.size < 2 { return; }
        if self.arena.get(slots.items[i]).size() >= self.config.min_size() { return; }

        let (l, r) = if i == 0 { (0, 1) } else { (i - 1, i) };
        let (left, right) = (slots.items[l], slots.items[r]);

        match self.rebalance_nodes(left, right, height - 1) {
            Rebalance::Untouched => {},
            Rebalance::Redistributed => self.refresh_lengths(idx, l..r + 1),
            Rebalance::Merged => {
                let slots = &mut self.arena.interior_mut(idx).slots;
                let right_len = slots.lengths[r];
                slots.lengths[l] += right_len;
                slots.remove(r..r + 1, &NodeIdx::NONE);
            }
        }
    }

    /// Recompute the stored lengths of some children from the children themselves.
    fn refresh_lengths(&mut self, idx: NodeIdx, range: Range<usize>) {
        for i in range {
            let child = self.arena.interior(idx).slots.items[i];
            let len = self.arena.get(child).total_len();
            self.arena.interior_mut(idx).slots.lengths[i] = len;
        }
    }

    /// A node with a single child is dissolved, and the child becomes an orphan. (With an order
    /// of 1 a single child is a valid node, so it stays.)
    fn finish_node(&mut self, idx: NodeIdx) -> Option<Orphan> {
        let slots = &self.arena.interior(idx).slots;
        if slots.size == 1 && slots.size < self.config.min_size() {
            let orphan = Orphan { node: slots.items[0], len: slots.lengths[0], height_delta: 1 };
            self.arena.release(idx);
            Some(orphan)
        } else { None }
    }

    /// Number of levels below `idx`, found by walking down its first children.
    pub(crate) fn subtree_height(&self, mut idx: NodeIdx) -> usize {
        let mut height = 0;
        while let Node::Interior(n) = self.arena.get(idx) {
            idx = n.slots.items[0];
            height += 1;
        }
        height
    }
}

#[cfg(test)]
mod test {
    use rand::prelude::*;

    use crate::{RangeTree, SegmentRange};
    use crate::testsegment::TestSegment;

    fn values(tree: &RangeTree<TestSegment>) -> Vec<u32> {
        tree.iter().flat_map(|(_, seg)| seg.values.iter().copied()).collect()
    }

    fn removed_values(removed: &SegmentRange<TestSegment>) -> Vec<u32> {
        removed.iter().flat_map(|(_, seg)| seg.values.iter().copied()).collect()
    }

    /// A tree of `count` segments, each 3 items long, numbered 0.. in order.
    fn tree_of(order: usize, count: usize) -> RangeTree<TestSegment> {
        let mut tree = RangeTree::for_segment(order).unwrap();
        for i in 0..count {
            tree.insert_range(i * 3, 3, TestSegment::run(i as u32 * 3, 3));
        }
        tree
    }

    #[test]
    fn delete_nothing() {
        let mut tree = tree_of(2, 10);
        let removed = tree.delete_range(7, 0);
        assert!(removed.is_empty());
        assert_eq!(tree.len(), 30);
        tree.dbg_check();
    }

    #[test]
    #[should_panic]
    fn delete_past_end_panics() {
        let mut tree = tree_of(2, 10);
        tree.delete_range(25, 6);
    }

    #[test]
    fn delete_inside_one_segment() {
        let mut tree = tree_of(2, 1);
        let removed = tree.delete_range(1, 1);
        assert_eq!(removed_values(&removed), vec![1]);
        assert_eq!(values(&tree), vec![0, 2]);
        assert_eq!(tree.count_entries(), 1);
        tree.dbg_check();
    }

    #[test]
    fn delete_straddling_segments() {
        let mut tree = tree_of(2, 4);
        let removed = tree.delete_range(2, 6);
        assert_eq!(removed_values(&removed), vec![2, 3, 4, 5, 6, 7]);
        assert_eq!(removed.iter().map(|(len, _)| len).collect::<Vec<_>>(), vec![1, 3, 2]);
        assert_eq!(values(&tree), vec![0, 1, 8, 9, 10, 11]);
        tree.dbg_check();
    }

    #[test]
    fn delete_everything() {
        let mut tree = tree_of(3, 100);
        let removed = tree.delete_range(0, 300);
        assert_eq!(removed.len(), 300);
        assert_eq!(removed_values(&removed), (0..300).collect::<Vec<_>>());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.count_nodes(), (0, 1));
        tree.dbg_check();
    }

    #[test]
    fn delete_every_range() {
        // Exhaustively delete every possible range from a few small trees.
        for order in 1..=4 {
            let tree = tree_of(order, 20);
            let expected = values(&tree);
            for pos in 0..=tree.len() {
                for len in 0..=tree.len() - pos {
                    let mut t = tree.clone();
                    let removed = t.delete_range(pos, len);
                    t.dbg_check();

                    assert_eq!(t.len(), tree.len() - len);
                    assert_eq!(removed.len(), len);
                    assert_eq!(removed_values(&removed), &expected[pos..pos + len]);

                    let mut remaining = expected.clone();
                    remaining.drain(pos..pos + len);
                    assert_eq!(values(&t), remaining);
                }
            }
        }
    }

    #[test]
    fn shrinking_trees_keep_invariants() {
        for order in 1..=5 {
            let mut rng = SmallRng::seed_from_u64(order as u64);
            let mut tree = tree_of(order, 300);
            let mut expected = values(&tree);
            while !tree.is_empty() {
                let pos = rng.gen_range(0..tree.len());
                let len = rng.gen_range(1..=(tree.len() - pos).min(40));
                let removed = tree.delete_range(pos, len);
                tree.dbg_check();

                let gone: Vec<_> = expected.drain(pos..pos + len).collect();
                assert_eq!(removed_values(&removed), gone);
                assert_eq!(values(&tree), expected);
            }
            assert_eq!(tree.height(), 0);
        }
    }

    #[test]
    fn removed_leaves_are_linked() {
        let mut tree = tree_of(1, 60);
        let removed = tree.delete_range(10, 150);
        assert!(removed.num_leaves() > 1);

        let leaves: Vec<_> = removed.leaves().collect();
        assert!(!leaves[0].prev().exists());
        assert!(!leaves[leaves.len() - 1].next().exists());
        assert_eq!(leaves.iter().map(|l| l.total_len()).sum::<usize>(), 150);
        tree.dbg_check();
    }

    #[test]
    #[should_panic(expected = "different heights")]
    fn rebalance_rejects_interior_nodes_of_different_heights() {
        let mut tree = tree_of(2, 200);
        assert!(tree.height() >= 3);

        let root = tree.arena.interior(tree.root);
        let (left, right) = (root.slots.items[0], root.slots.items[1]);
        let right_child = tree.arena.interior(right).slots.items[0];
        tree.rebalance_nodes(left, right_child, tree.height() - 1);
    }
}
