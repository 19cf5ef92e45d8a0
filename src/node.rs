use std::mem::replace;
use std::ops::Range;

use smallvec::SmallVec;

use crate::{EMPTY_LEN, INLINE_SLOTS, NodeIdx};

/// A fixed capacity array of (length, item) pairs. Occupied slots are always the contiguous
/// prefix `[0, size)`. Every other slot holds a sentinel (`EMPTY_LEN` for the length, and a
/// caller-supplied empty value for the item).
///
/// Both interior nodes (items are child node indexes) and leaves (items are segments) use this
/// shape.
#[derive(Debug, Clone)]
pub struct Slots<V> {
    pub(crate) size: usize,
    pub(crate) lengths: SmallVec<[usize; INLINE_SLOTS]>,
    pub(crate) items: SmallVec<[V; INLINE_SLOTS]>,
}

/// Slots removed from a node, in order.
pub(crate) type Removed<V> = SmallVec<[(usize, V); 8]>;

impl<V: Clone> Slots<V> {
    pub(crate) fn new(capacity: usize, empty: &V) -> Self {
        Self {
            size: 0,
            lengths: SmallVec::from_elem(EMPTY_LEN, capacity),
            items: SmallVec::from_elem(empty.clone(), capacity),
        }
    }

    pub(crate) fn capacity(&self) -> usize { self.lengths.len() }

    /// Replace the item in slot `idx` with the sentinel, returning what was there.
    pub(crate) fn take(&mut self, idx: usize, empty: &V) -> V {
        debug_assert!(idx < self.size);
        replace(&mut self.items[idx], empty.clone())
    }

    /// Insert into slot `at`, sliding later slots right. There must be a free slot.
    pub(crate) fn insert(&mut self, at: usize, len: usize, item: V) {
        assert!(self.size < self.capacity(), "Node overflow");
        debug_assert!(at <= self.size);

        // The sentinel at [size] rotates down into [at] and gets overwritten.
        self.lengths[at..=self.size].rotate_right(1);
        self.items[at..=self.size].rotate_right(1);
        self.lengths[at] = len;
        self.items[at] = item;
        self.size += 1;
    }

    #[inline]
    pub(crate) fn push(&mut self, len: usize, item: V) {
        self.insert(self.size, len, item);
    }

    /// Remove the slots in `range`, sliding later slots back and filling the end with
    /// sentinels.
    pub(crate) fn remove(&mut self, range: Range<usize>, empty: &V) -> Removed<V> {
        debug_assert!(range.end <= self.size);
        let removed = range.clone()
            .map(|i| (replace(&mut self.lengths[i], EMPTY_LEN), replace(&mut self.items[i], empty.clone())))
            .collect();

        self.lengths[range.start..self.size].rotate_left(range.len());
        self.items[range.start..self.size].rotate_left(range.len());
        self.size -= range.len();
        removed
    }

    /// Move the slots `[at, size)` out into a new array with the given capacity.
    pub(crate) fn split_off(&mut self, at: usize, capacity: usize, empty: &V) -> Self {
        let mut other = Self::new(capacity, empty);
        for (len, item) in self.remove(at..self.size, empty) {
            other.push(len, item);
        }
        other
    }

    /// Move the first `count` slots of `other` onto the end of self.
    pub(crate) fn take_front_of(&mut self, other: &mut Self, count: usize, empty: &V) {
        for (len, item) in other.remove(0..count, empty) {
            self.push(len, item);
        }
    }

    /// Move the last `count` slots of `other` onto the start of self.
    pub(crate) fn take_back_of(&mut self, other: &mut Self, count: usize, empty: &V) {
        let start = other.size - count;
        for (i, (len, item)) in other.remove(start..other.size, empty).into_iter().enumerate() {
            self.insert(i, len, item);
        }
    }

    /// Sum of the lengths of all occupied slots.
    pub(crate) fn total_len(&self) -> usize {
        self.lengths[..self.size].iter().sum()
    }

    /// Find the slot containing `pos`. Returns (index, offset within that slot).
    ///
    /// A position on a boundary resolves to the start of the later slot. If `pos` equals the
    /// total length, this returns `(size, 0)`.
    pub(crate) fn locate(&self, mut pos: usize) -> (usize, usize) {
        for (i, len) in self.lengths[..self.size].iter().enumerate() {
            if pos < *len { return (i, pos); }
            pos -= *len;
        }
        assert_eq!(pos, 0, "Position past the end of the node");
        (self.size, 0)
    }

    /// Like locate, but a position on a boundary resolves to the end of the earlier slot. Used
    /// for insertion (appending to a child doesn't need a new child) and for the end of a
    /// deleted range.
    pub(crate) fn locate_end(&self, mut pos: usize) -> (usize, usize) {
        for (i, len) in self.lengths[..self.size].iter().enumerate() {
            if pos <= *len { return (i, pos); }
            pos -= *len;
        }
        panic!("Position past the end of the node");
    }

    pub(crate) fn lengths(&self) -> &[usize] { &self.lengths[..self.size] }
    pub(crate) fn items(&self) -> &[V] { &self.items[..self.size] }
}

#[derive(Debug, Clone)]
pub(crate) struct InteriorNode {
    pub(crate) slots: Slots<NodeIdx>,
}

/// A leaf in the tree. Leaves are linked together in a doubly linked list (via `prev` and
/// `next`) in document order.
///
/// Leaves are also used as the links of a [`SegmentRange`](crate::SegmentRange). There, `prev`
/// and `next` point to other leaves in the same range.
#[derive(Debug, Clone)]
pub struct LeafNode<T> {
    pub(crate) slots: Slots<T>,
    pub(crate) prev: NodeIdx,
    pub(crate) next: NodeIdx,
}

impl InteriorNode {
    pub(crate) fn new(capacity: usize) -> Self {
        Self { slots: Slots::new(capacity, &NodeIdx::NONE) }
    }
}

impl<T: Clone> LeafNode<T> {
    pub(crate) fn new(capacity: usize, empty: &T) -> Self {
        Self {
            slots: Slots::new(capacity, empty),
            prev: NodeIdx::NONE,
            next: NodeIdx::NONE,
        }
    }
}

impl<T> LeafNode<T> {
    /// Number of occupied slots.
    pub fn size(&self) -> usize { self.slots.size }

    pub fn lengths(&self) -> &[usize] { &self.slots.lengths[..self.slots.size] }

    pub fn segments(&self) -> &[T] { &self.slots.items[..self.slots.size] }

    pub fn prev(&self) -> NodeIdx { self.prev }
    pub fn next(&self) -> NodeIdx { self.next }

    pub fn total_len(&self) -> usize { self.lengths().iter().sum() }
}

#[derive(Debug, Clone)]
pub(crate) enum Node<T> {
    Interior(InteriorNode),
    Leaf(LeafNode<T>),
}

impl<T> Node<T> {
    pub(crate) fn size(&self) -> usize {
        match self {
            Node::Interior(n) => n.slots.size,
            Node::Leaf(l) => l.slots.size,
        }
    }

    pub(crate) fn total_len(&self) -> usize {
        match self {
            Node::Interior(n) => n.slots.lengths[..n.slots.size].iter().sum(),
            Node::Leaf(l) => l.total_len(),
        }
    }
}

/// Owns every node in the tree. Released nodes leave a hole which is reused by the next
/// allocation.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    nodes: Vec<Option<Node<T>>>,
    free_slots: Vec<usize>,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Self { nodes: vec![], free_slots: vec![] }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free_slots.clear();
    }

    pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeIdx {
        if let Some(idx) = self.free_slots.pop() {
            debug_assert!(self.nodes[idx].is_none());
            self.nodes[idx] = Some(node);
            NodeIdx(idx)
        } else {
            self.nodes.push(Some(node));
            NodeIdx(self.nodes.len() - 1)
        }
    }

    /// Remove a node from the arena, handing ownership back to the caller.
    pub(crate) fn release(&mut self, idx: NodeIdx) -> Node<T> {
        let node = self.nodes[idx.0].take().expect("Released node does not exist");
        self.free_slots.push(idx.0);
        node
    }

    /// Number of nodes currently allocated.
    pub(crate) fn live_count(&self) -> usize {
        self.nodes.len() - self.free_slots.len()
    }

    pub(crate) fn slot_count(&self) -> usize { self.nodes.len() }

    #[inline]
    pub(crate) fn get(&self, idx: NodeIdx) -> &Node<T> {
        self.nodes[idx.0].as_ref().expect("Dangling node index")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: NodeIdx) -> &mut Node<T> {
        self.nodes[idx.0].as_mut().expect("Dangling node index")
    }

    pub(crate) fn leaf(&self, idx: NodeIdx) -> &LeafNode<T> {
        match self.get(idx) {
            Node::Leaf(l) => l,
            Node::Interior(_) => panic!("Expected leaf - found interior node"),
        }
    }

    pub(crate) fn leaf_mut(&mut self, idx: NodeIdx) -> &mut LeafNode<T> {
        match self.get_mut(idx) {
            Node::Leaf(l) => l,
            Node::Interior(_) => panic!("Expected leaf - found interior node"),
        }
    }

    pub(crate) fn interior(&self, idx: NodeIdx) -> &InteriorNode {
        match self.get(idx) {
            Node::Interior(n) => n,
            Node::Leaf(_) => panic!("Expected interior node - found leaf"),
        }
    }

    pub(crate) fn interior_mut(&mut self, idx: NodeIdx) -> &mut InteriorNode {
        match self.get_mut(idx) {
            Node::Interior(n) => n,
            Node::Leaf(_) => panic!("Expected interior node - found leaf"),
        }
    }

    /// Borrow two distinct nodes mutably at the same time.
    pub(crate) fn pair_mut(&mut self, a: NodeIdx, b: NodeIdx) -> (&mut Node<T>, &mut Node<T>) {
        assert_ne!(a, b);
        let (x, y) = if a.0 < b.0 {
            let (lo, hi) = self.nodes.split_at_mut(b.0);
            (&mut lo[a.0], &mut hi[0])
        } else {
            let (lo, hi) = self.nodes.split_at_mut(a.0);
            (&mut hi[0], &mut lo[b.0])
        };
        (x.as_mut().expect("Dangling node index"), y.as_mut().expect("Dangling node index"))
    }

    /// Unlink a leaf from the leaf chain.
    pub(crate) fn unlink_leaf(&mut self, idx: NodeIdx) {
        let leaf = self.leaf(idx);
        let (prev, next) = (leaf.prev, leaf.next);
        if prev.exists() { self.leaf_mut(prev).next = next; }
        if next.exists() { self.leaf_mut(next).prev = prev; }
        let leaf = self.leaf_mut(idx);
        leaf.prev = NodeIdx::NONE;
        leaf.next = NodeIdx::NONE;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn slots_with(lengths: &[usize]) -> Slots<char> {
        let mut slots = Slots::new(6, &'_');
        for (i, len) in lengths.iter().enumerate() {
            slots.push(*len, (b'a' + i as u8) as char);
        }
        slots
    }

    #[test]
    fn locate_boundaries() {
        let slots = slots_with(&[3, 5, 2]);
        assert_eq!(slots.locate(0), (0, 0));
        assert_eq!(slots.locate(2), (0, 2));
        assert_eq!(slots.locate(3), (1, 0));
        assert_eq!(slots.locate(9), (2, 1));
        assert_eq!(slots.locate(10), (3, 0));

        assert_eq!(slots.locate_end(0), (0, 0));
        assert_eq!(slots.locate_end(3), (0, 3));
        assert_eq!(slots.locate_end(4), (1, 1));
        assert_eq!(slots.locate_end(10), (2, 2));
    }

    #[test]
    #[should_panic]
    fn locate_past_end_panics() {
        slots_with(&[3]).locate(4);
    }

    #[test]
    fn insert_and_remove_keep_prefix_packed() {
        let mut slots = slots_with(&[3, 5, 2]);
        slots.insert(1, 7, 'x');
        assert_eq!(slots.lengths(), &[3, 7, 5, 2]);
        assert_eq!(slots.items(), &['a', 'x', 'b', 'c']);

        let removed = slots.remove(1..3, &'_');
        assert_eq!(removed.as_slice(), &[(7, 'x'), (5, 'b')]);
        assert_eq!(slots.lengths(), &[3, 2]);
        assert_eq!(slots.items(), &['a', 'c']);
        assert!(slots.lengths[2..].iter().all(|l| *l == EMPTY_LEN));
        assert!(slots.items[2..].iter().all(|c| *c == '_'));
    }

    #[test]
    fn move_between_slots() {
        let mut left = slots_with(&[1, 2]);
        let mut right = slots_with(&[3, 4, 5]);
        left.take_front_of(&mut right, 2, &'_');
        assert_eq!(left.lengths(), &[1, 2, 3, 4]);
        assert_eq!(right.lengths(), &[5]);

        right.take_back_of(&mut left, 3, &'_');
        assert_eq!(left.lengths(), &[1]);
        assert_eq!(right.lengths(), &[2, 3, 4, 5]);
        assert_eq!(right.items(), &['b', 'a', 'b', 'c']);

        let tail = right.split_off(1, 6, &'_');
        assert_eq!(right.lengths(), &[2]);
        assert_eq!(tail.lengths(), &[3, 4, 5]);
        assert_eq!(tail.total_len(), 12);
    }

    #[test]
    fn arena_reuses_released_slots() {
        let mut arena: Arena<char> = Arena::new();
        let a = arena.alloc(Node::Leaf(LeafNode::new(4, &'_')));
        let b = arena.alloc(Node::Interior(InteriorNode::new(3)));
        assert_eq!(arena.live_count(), 2);
        assert!(matches!(arena.release(a), Node::Leaf(_)));
        assert_eq!(arena.live_count(), 1);
        let c = arena.alloc(Node::Leaf(LeafNode::new(4, &'_')));
        assert_eq!(a, c);
        let (x, y) = arena.pair_mut(b, c);
        assert!(matches!(x, Node::Interior(_)));
        assert!(matches!(y, Node::Leaf(_)));
    }
}
