use crate::{ConfigError, NodeIdx, Segment, SegmentRange, TreeConfig};
use crate::node::{Arena, InteriorNode, LeafNode, Node};

/// A balanced tree of variable-length segments, addressed by position.
///
/// Every node except the root holds between `order` and `2 * order` children. Interior nodes
/// store the total length of each child subtree, so any position can be found by walking down
/// from the root.
#[derive(Clone)]
pub struct RangeTree<T> {
    pub(crate) config: TreeConfig<T>,
    pub(crate) arena: Arena<T>,

    pub(crate) root: NodeIdx,

    /// The number of interior levels above the leaves. A tree with just a root leaf has a
    /// height of 0.
    pub(crate) height: usize,

    /// The sum of all segment lengths.
    pub(crate) total_len: usize,
}

impl<T: Clone> RangeTree<T> {
    pub fn new(config: TreeConfig<T>) -> Self {
        let mut arena = Arena::new();
        let root = arena.alloc(Node::Leaf(LeafNode::new(config.leaf_capacity(), &config.empty_segment)));

        Self {
            config,
            arena,
            root,
            height: 0,
            total_len: 0,
        }
    }

    /// Remove everything from the tree.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = self.new_leaf();
        self.height = 0;
        self.total_len = 0;
    }

    pub fn config(&self) -> &TreeConfig<T> { &self.config }

    /// The total length of all segments in the tree.
    pub fn len(&self) -> usize { self.total_len }

    pub fn is_empty(&self) -> bool { self.total_len == 0 }

    /// The number of interior levels between the root and the leaves.
    pub fn height(&self) -> usize { self.height }

    /// Find the segment containing `pos`. Returns the offset of `pos` within that segment, and
    /// the segment itself.
    ///
    /// Panics if `pos >= self.len()`.
    pub fn get_item(&self, pos: usize) -> (usize, &T) {
        assert!(pos < self.total_len, "get_item position {} out of bounds (len {})", pos, self.total_len);

        let mut idx = self.root;
        let mut offset = pos;
        loop {
            match self.arena.get(idx) {
                Node::Interior(n) => {
                    let (i, child_offset) = n.slots.locate(offset);
                    idx = n.slots.items[i];
                    offset = child_offset;
                }
                Node::Leaf(l) => {
                    let (i, seg_offset) = l.slots.locate(offset);
                    return (seg_offset, &l.slots.items[i]);
                }
            }
        }
    }

    pub(crate) fn new_leaf(&mut self) -> NodeIdx {
        let leaf = LeafNode::new(self.config.leaf_capacity(), &self.config.empty_segment);
        self.arena.alloc(Node::Leaf(leaf))
    }

    pub(crate) fn new_interior(&mut self) -> NodeIdx {
        self.arena.alloc(Node::Interior(InteriorNode::new(self.config.interior_capacity())))
    }

    /// Create a new interior node with two children, returning its index.
    pub(crate) fn wrap_pair(&mut self, left: NodeIdx, left_len: usize, right: NodeIdx, right_len: usize) -> NodeIdx {
        let idx = self.new_interior();
        let slots = &mut self.arena.interior_mut(idx).slots;
        slots.push(left_len, left);
        slots.push(right_len, right);
        idx
    }

    /// The root split. The tree grows by one level.
    pub(crate) fn grow_root(&mut self, right: NodeIdx, right_len: usize) {
        let left_len = self.total_len - right_len;
        self.root = self.wrap_pair(self.root, left_len, right, right_len);
        self.height += 1;
    }

    /// An interior root with a single child is replaced by that child, as many times as needed.
    pub(crate) fn collapse_root(&mut self) {
        while self.height > 0 && self.arena.get(self.root).size() == 1 {
            let old_root = self.root;
            self.root = self.arena.interior(old_root).slots.items[0];
            self.arena.release(old_root);
            self.height -= 1;
        }
    }

    pub(crate) fn first_leaf(&self) -> NodeIdx {
        let mut idx = self.root;
        for _ in 0..self.height {
            idx = self.arena.interior(idx).slots.items[0];
        }
        idx
    }

    pub(crate) fn new_segment_range(&self) -> SegmentRange<T> {
        SegmentRange::new(self.config.leaf_capacity(), self.config.empty_segment.clone())
    }
}

impl<T: Segment> RangeTree<T> {
    /// Create a tree using the split callback and empty value from the [`Segment`] impl.
    pub fn for_segment(order: usize) -> Result<Self, ConfigError> {
        Ok(Self::new(TreeConfig::for_segment(order)?))
    }
}

impl<T: Segment> Default for RangeTree<T> {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

#[cfg(test)]
mod test {
    use crate::RangeTree;
    use crate::testsegment::TestSegment;

    fn run(id: u32, len: usize) -> TestSegment {
        TestSegment::run(id * 1000, len)
    }

    #[test]
    fn empty_tree() {
        let tree = RangeTree::<TestSegment>::for_segment(2).unwrap();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert!(tree.validate().is_ok());
    }

    #[test]
    #[should_panic]
    fn get_item_past_end_panics() {
        let mut tree = RangeTree::<TestSegment>::for_segment(2).unwrap();
        tree.insert_range(0, 5, run(1, 5));
        tree.get_item(5);
    }

    #[test]
    fn single_insert_and_lookup() {
        let mut tree = RangeTree::for_segment(2).unwrap();
        let a = run(1, 1000);
        tree.insert_range(0, 1000, a.clone());
        assert_eq!(tree.get_item(0), (0, &a));
        assert_eq!(tree.get_item(999), (999, &a));
        tree.dbg_check();
    }

    #[test]
    fn prepend_then_lookup() {
        let mut tree = RangeTree::for_segment(2).unwrap();
        let a = run(1, 1000);
        let b = run(2, 10);
        tree.insert_range(0, 1000, a.clone());
        tree.insert_range(0, 10, b.clone());
        assert_eq!(tree.get_item(0), (0, &b));
        assert_eq!(tree.get_item(9), (9, &b));
        assert_eq!(tree.get_item(10), (0, &a));
        assert_eq!(tree.len(), 1010);
        tree.dbg_check();

        tree.insert_range(1010, 10, run(3, 10));
        assert_eq!(tree.len(), 1020);
        assert_eq!(tree.get_item(1019), (9, &run(3, 10)));
        let removed = tree.delete_range(0, 1020);
        assert_eq!(removed.len(), 1020);
        assert_eq!(removed.count_segments(), 3);
        assert_eq!(tree.len(), 0);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn delete_from_prepended_segments() {
        let mut tree = RangeTree::for_segment(2).unwrap();
        for i in 0..100 {
            tree.insert_range(0, 10, run(i, 10));
            tree.dbg_check();
        }
        assert!(tree.height() >= 2);

        let removed = tree.delete_range(500, 10);
        assert_eq!(tree.len(), 990);
        assert_eq!(removed.len(), 10);
        assert_eq!(removed.iter().map(|(len, _)| len).sum::<usize>(), 10);
        tree.dbg_check();

        // Segments were prepended, so position 500 is the start of segment 49.
        assert_eq!(removed.iter().next().map(|(_, s)| s), Some(&run(49, 10)));
        assert_eq!(tree.get_item(500), (0, &run(48, 10)));
    }

    #[test]
    fn read_is_idempotent() {
        let mut tree = RangeTree::for_segment(3).unwrap();
        for i in 0..30 {
            tree.insert_range(i * 2, 3, run(i as u32, 3));
        }
        let first: Vec<_> = (0..tree.len()).map(|p| tree.get_item(p)).collect();
        let second: Vec<_> = (0..tree.len()).map(|p| tree.get_item(p)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn clear_resets_tree() {
        let mut tree = RangeTree::for_segment(1).unwrap();
        for i in 0..20 {
            tree.insert_range(0, 2, run(i, 2));
        }
        assert!(tree.height() > 0);
        tree.clear();
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.count_nodes(), (0, 1));
        tree.dbg_check();

        tree.insert_range(0, 4, run(7, 4));
        assert_eq!(tree.get_item(3), (3, &run(7, 4)));
    }
}
