use std::fmt::{Debug, Formatter};
use std::mem::size_of;

use humansize::{DECIMAL, format_size};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{NodeIdx, RangeTree};
use crate::node::Node;

struct DebugContent<'a, T: Clone>(&'a RangeTree<T>);

impl<'a, T: Clone + Debug> Debug for DebugContent<'a, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.0.iter())
            .finish()
    }
}

impl<T: Clone + Debug> Debug for RangeTree<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeTree")
            .field("len", &self.total_len)
            .field("height", &self.height)
            .field("(content)", &DebugContent(self))
            .finish()
    }
}

/// Size and shape of a tree, as reported by [`RangeTree::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeStats {
    pub len: usize,
    pub height: usize,
    pub interior_nodes: usize,
    pub leaf_nodes: usize,
    pub entries: usize,
    /// Bytes used by the node arena, including released slots waiting to be reused.
    pub memory_usage: usize,
}

impl<T: Clone> RangeTree<T> {
    /// Returns (interior nodes, leaf nodes).
    pub fn count_nodes(&self) -> (usize, usize) {
        let mut interior = 0;
        let mut leaves = 0;
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            match self.arena.get(idx) {
                Node::Interior(n) => {
                    interior += 1;
                    stack.extend_from_slice(n.slots.items());
                }
                Node::Leaf(_) => leaves += 1,
            }
        }
        (interior, leaves)
    }

    /// Number of segments stored in the tree.
    pub fn count_entries(&self) -> usize {
        self.iter_leaves().map(|leaf| leaf.size()).sum()
    }

    pub fn count_total_memory(&self) -> usize {
        size_of::<Self>() + self.arena.slot_count() * size_of::<Option<Node<T>>>()
    }

    pub fn stats(&self) -> TreeStats {
        let (interior_nodes, leaf_nodes) = self.count_nodes();
        TreeStats {
            len: self.total_len,
            height: self.height,
            interior_nodes,
            leaf_nodes,
            entries: self.count_entries(),
            memory_usage: self.count_total_memory(),
        }
    }

    pub fn print_stats(&self, name: &str, detailed: bool) {
        let stats = self.stats();
        let node_size = size_of::<Option<Node<T>>>();

        println!("-------- Range tree {} stats --------", name);
        println!("Total length {} in {} entries of {} bytes each",
            stats.len,
            stats.entries,
            size_of::<T>()
        );
        println!("Number of {} byte nodes: {} interior, {} leaves ({})",
            node_size,
            stats.interior_nodes,
            stats.leaf_nodes,
            format_size((stats.interior_nodes + stats.leaf_nodes) * node_size, DECIMAL)
        );
        println!("Leaves have space for {} entries", stats.leaf_nodes * self.config.leaf_capacity());
        println!("Depth {}", stats.height);
        println!("Total range tree memory usage {}", format_size(stats.memory_usage, DECIMAL));

        if detailed {
            // Distribution of segment lengths.
            let mut len_counts = vec![];
            for (len, _) in self.iter() {
                if len >= len_counts.len() {
                    len_counts.resize(len + 1, 0);
                }
                len_counts[len] += 1;
            }
            println!("Entry length distribution {:?}", len_counts);

            let mut size_counts = vec![0; self.config.leaf_capacity() + 1];
            for leaf in self.iter_leaves() {
                size_counts[leaf.size()] += 1;
            }
            println!("Leaf fill distribution {:?}", size_counts);
            println!("Arena slots {} ({} free)", self.arena.slot_count(), self.arena.slot_count() - self.arena.live_count());
        }
    }

    fn print_node(&self, idx: NodeIdx, depth: usize) {
        for _ in 0..depth { eprint!("  "); }
        match self.arena.get(idx) {
            Node::Interior(n) => {
                eprintln!("Interior {:?} lengths {:?}", idx, n.slots.lengths());
                for &child in n.slots.items() {
                    self.print_node(child, depth + 1);
                }
            }
            Node::Leaf(l) => {
                eprintln!("Leaf {:?} (prev {:?} next {:?}) lengths {:?}", idx, l.prev, l.next, l.lengths());
            }
        }
    }

    /// Dump the node structure to stderr.
    pub fn print_node_tree(&self) {
        eprintln!("Tree len {} height {}", self.total_len, self.height);
        self.print_node(self.root, 1);
    }
}

#[cfg(test)]
mod test {
    use crate::RangeTree;
    use crate::testsegment::TestSegment;

    #[test]
    fn stats_match_counts() {
        let mut tree = RangeTree::for_segment(2).unwrap();
        for i in 0..40 {
            tree.insert_range(0, 3, TestSegment::run(i * 3, 3));
        }
        let stats = tree.stats();
        assert_eq!(stats.len, 120);
        assert_eq!(stats.entries, 40);
        assert_eq!(stats.height, tree.height());
        assert_eq!((stats.interior_nodes, stats.leaf_nodes), tree.count_nodes());
        assert!(stats.memory_usage > 0);
        tree.print_stats("test", true);
    }

    #[test]
    fn debug_lists_content() {
        let mut tree = RangeTree::for_segment(2).unwrap();
        tree.insert_range(0, 2, TestSegment::run(5, 2));
        let s = format!("{:?}", tree);
        assert!(s.starts_with("RangeTree { len: 2, height: 0"));
        assert!(s.contains("[5, 6]"));
    }
}
