use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::{EMPTY_LEN, NodeIdx, RangeTree};
use crate::node::{Node, Slots};

/// A structural problem found by [`RangeTree::validate`]. Each variant names the node where the
/// problem was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantError {
    /// A node was found at the wrong depth. Either a leaf above the bottom level, or an
    /// interior node at the bottom level. `actual` is the height of the subtree found there.
    WrongHeight { node: NodeIdx, expected: usize, actual: usize },
    /// The node holds too few or too many slots.
    WrongSize { node: NodeIdx, size: usize, min: usize, max: usize },
    /// An occupied slot has a length of 0.
    ZeroLength { node: NodeIdx, slot: usize },
    /// An unoccupied slot doesn't hold the sentinel.
    MissingSentinel { node: NodeIdx, slot: usize },
    /// The length stored for a child doesn't match the child's content.
    WrongChildLength { node: NodeIdx, slot: usize, expected: usize, actual: usize },
    /// A leaf's `prev` or `next` link doesn't point at its neighbour in tree order.
    BrokenLeafChain { node: NodeIdx, expected: NodeIdx, actual: NodeIdx },
    /// The tree's total length doesn't match its content.
    WrongTotalLength { expected: usize, actual: usize },
    /// Some allocated nodes aren't reachable from the root.
    LeakedNodes { allocated: usize, reachable: usize },
}

impl Display for InvariantError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use InvariantError::*;
        match self {
            WrongHeight { node, expected, actual } =>
                write!(f, "Node {:?} has height {} (expected {})", node, actual, expected),
            WrongSize { node, size, min, max } =>
                write!(f, "Node {:?} has {} slots (expected {}..={})", node, size, min, max),
            ZeroLength { node, slot } =>
                write!(f, "Node {:?} slot {} has zero length", node, slot),
            MissingSentinel { node, slot } =>
                write!(f, "Node {:?} slot {} is unoccupied but not empty", node, slot),
            WrongChildLength { node, slot, expected, actual } =>
                write!(f, "Node {:?} slot {} stores length {} but the child has length {}", node, slot, expected, actual),
            BrokenLeafChain { node, expected, actual } =>
                write!(f, "Leaf {:?} links to {:?} (expected {:?})", node, actual, expected),
            WrongTotalLength { expected, actual } =>
                write!(f, "Tree length is {} but its content has length {}", expected, actual),
            LeakedNodes { allocated, reachable } =>
                write!(f, "{} nodes allocated but only {} reachable", allocated, reachable),
        }
    }
}

impl Error for InvariantError {}

/// Walk state for validate().
struct Walk {
    leaves: Vec<NodeIdx>,
    reachable: usize,
}

fn check_slots<V>(node: NodeIdx, slots: &Slots<V>, is_empty: impl Fn(&V) -> bool) -> Result<(), InvariantError> {
    for slot in 0..slots.lengths.len() {
        if slot < slots.size {
            if slots.lengths[slot] == 0 {
                return Err(InvariantError::ZeroLength { node, slot });
            }
        } else if slots.lengths[slot] != EMPTY_LEN || !is_empty(&slots.items[slot]) {
            return Err(InvariantError::MissingSentinel { node, slot });
        }
    }
    Ok(())
}

impl<T: Clone> RangeTree<T> {
    /// Check every structural invariant of the tree. This walks the whole tree, so it is slow.
    /// It's intended for testing.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let mut walk = Walk { leaves: vec![], reachable: 0 };
        let actual = self.check_node(self.root, self.height, true, &mut walk)?;
        if actual != self.total_len {
            return Err(InvariantError::WrongTotalLength { expected: self.total_len, actual });
        }

        // The leaf chain must visit the leaves in tree order.
        for (i, &leaf) in walk.leaves.iter().enumerate() {
            let node = self.arena.leaf(leaf);
            let prev = if i > 0 { walk.leaves[i - 1] } else { NodeIdx::NONE };
            let next = walk.leaves.get(i + 1).copied().unwrap_or(NodeIdx::NONE);

            if node.prev != prev {
                return Err(InvariantError::BrokenLeafChain { node: leaf, expected: prev, actual: node.prev });
            }
            if node.next != next {
                return Err(InvariantError::BrokenLeafChain { node: leaf, expected: next, actual: node.next });
            }
        }

        let allocated = self.arena.live_count();
        if allocated != walk.reachable {
            return Err(InvariantError::LeakedNodes { allocated, reachable: walk.reachable });
        }
        Ok(())
    }

    /// Panic if the tree is invalid.
    pub fn dbg_check(&self) {
        if let Err(err) = self.validate() {
            self.print_node_tree();
            panic!("Invalid range tree: {}", err);
        }
    }

    // Returns the length of the subtree.
    fn check_node(&self, idx: NodeIdx, height: usize, is_root: bool, walk: &mut Walk) -> Result<usize, InvariantError> {
        walk.reachable += 1;
        let node = self.arena.get(idx);

        let size = node.size();
        let max = self.config.max_size();
        let min = match (is_root, node) {
            (false, _) => self.config.min_size(),
            (true, Node::Leaf(_)) => 0,
            // An interior root with 1 child should have been collapsed.
            (true, Node::Interior(_)) => 2,
        };
        if size < min || size > max {
            return Err(InvariantError::WrongSize { node: idx, size, min, max });
        }

        match node {
            Node::Leaf(leaf) if height == 0 => {
                check_slots(idx, &leaf.slots, |_| true)?;
                walk.leaves.push(idx);
                Ok(leaf.total_len())
            }
            Node::Interior(n) if height > 0 => {
                check_slots(idx, &n.slots, |child| !child.exists())?;

                let mut total = 0;
                for (slot, (&expected, &child)) in n.slots.lengths().iter().zip(n.slots.items()).enumerate() {
                    let actual = self.check_node(child, height - 1, false, walk)?;
                    if actual != expected {
                        return Err(InvariantError::WrongChildLength { node: idx, slot, expected, actual });
                    }
                    total += actual;
                }
                Ok(total)
            }
            _ => Err(InvariantError::WrongHeight { node: idx, expected: height, actual: self.subtree_height(idx) }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testsegment::TestSegment;

    fn small_tree() -> RangeTree<TestSegment> {
        let mut tree = RangeTree::for_segment(2).unwrap();
        for i in 0..20 {
            tree.insert_range(0, 4, TestSegment::run(i * 4, 4));
        }
        assert!(tree.height() >= 1);
        tree
    }

    #[test]
    fn valid_tree_passes() {
        assert_eq!(small_tree().validate(), Ok(()));
    }

    #[test]
    fn detects_wrong_total() {
        let mut tree = small_tree();
        tree.total_len += 1;
        assert_eq!(tree.validate(), Err(InvariantError::WrongTotalLength { expected: 81, actual: 80 }));
    }

    #[test]
    fn detects_wrong_child_length() {
        let mut tree = small_tree();
        let root = tree.root;
        tree.arena.interior_mut(root).slots.lengths[0] += 1;
        assert!(matches!(tree.validate(), Err(InvariantError::WrongChildLength { slot: 0, .. })));
    }

    #[test]
    fn detects_wrong_size() {
        let mut tree = small_tree();
        let first = tree.first_leaf();
        tree.arena.leaf_mut(first).slots.size = 5;
        assert_eq!(tree.validate(), Err(InvariantError::WrongSize { node: first, size: 5, min: 2, max: 4 }));
    }

    #[test]
    fn detects_missing_sentinel() {
        let mut tree = small_tree();
        let first = tree.first_leaf();
        let last_slot = tree.config.leaf_capacity() - 1;
        tree.arena.leaf_mut(first).slots.lengths[last_slot] = 7;
        assert_eq!(tree.validate(), Err(InvariantError::MissingSentinel { node: first, slot: last_slot }));
    }

    #[test]
    fn detects_leaf_above_the_bottom() {
        let mut tree = small_tree();
        while tree.height() < 2 {
            let len = tree.len();
            tree.insert_range(len, 4, TestSegment::run(len as u32, 4));
        }
        let root = tree.root;
        let first = tree.first_leaf();
        tree.arena.interior_mut(root).slots.items[0] = first;
        assert_eq!(tree.validate(), Err(InvariantError::WrongHeight {
            node: first,
            expected: tree.height() - 1,
            actual: 0,
        }));
    }

    #[test]
    fn detects_broken_chain() {
        let mut tree = small_tree();
        let first = tree.first_leaf();
        tree.arena.leaf_mut(first).next = NodeIdx::NONE;
        assert!(matches!(tree.validate(), Err(InvariantError::BrokenLeafChain { .. })));
    }

    #[test]
    fn detects_leaks() {
        let mut tree = small_tree();
        tree.new_leaf();
        assert!(matches!(tree.validate(), Err(InvariantError::LeakedNodes { .. })));
    }

    #[test]
    #[should_panic]
    fn dbg_check_panics() {
        let mut tree = small_tree();
        tree.total_len = 0;
        tree.dbg_check();
    }

    #[test]
    fn error_messages_name_the_node() {
        let err = InvariantError::ZeroLength { node: NodeIdx(3), slot: 1 };
        assert_eq!(err.to_string(), "Node NodeIdx(3) slot 1 has zero length");
    }
}
