//! Huffman tree construction.
//!
//! Nodes live in an arena and refer to their children by index. Leaves are
//! pushed first, in first-appearance order, and every merged node is pushed
//! after them, so a node's index doubles as its insertion sequence number.
//! The priority queue orders by `(weight, index)`: among equal weights the
//! node inserted earlier is extracted first and becomes the left child.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::Serialize;

use super::frequency::FrequencyTable;
use crate::error::{HuffmanError, Result};

/// Index of a node inside a [`HuffmanTree`] arena.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeNode {
    Leaf {
        symbol: char,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: NodeId,
        right: NodeId,
    },
}

impl TreeNode {
    pub fn weight(&self) -> u64 {
        match self {
            TreeNode::Leaf { weight, .. } => *weight,
            TreeNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HuffmanTree {
    nodes: Vec<TreeNode>,
    root: NodeId,
}

impl HuffmanTree {
    /// Builds the tree for a frequency table.
    ///
    /// A table with a single distinct symbol yields a tree whose root is that
    /// leaf; the code table gives it the one-bit code `0`.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(HuffmanError::InvalidInput(
                "cannot build a tree without symbols".to_string(),
            ));
        }

        let mut nodes = Vec::with_capacity(frequencies.len() * 2 - 1);
        let mut heap = BinaryHeap::with_capacity(frequencies.len());

        for (symbol, weight) in frequencies.iter() {
            heap.push(Reverse((weight, nodes.len())));
            nodes.push(TreeNode::Leaf { symbol, weight });
        }

        let root = loop {
            let Reverse((left_weight, left)) =
                heap.pop().expect("heap always holds at least one node");
            let Some(Reverse((right_weight, right))) = heap.pop() else {
                break left;
            };

            let weight = left_weight + right_weight;
            heap.push(Reverse((weight, nodes.len())));
            nodes.push(TreeNode::Internal {
                weight,
                left,
                right,
            });
        };

        Ok(Self { nodes, root })
    }

    /// Counts and builds in one step.
    pub fn from_text(text: &str) -> Result<Self> {
        let frequencies = FrequencyTable::analyze(text)?;
        Self::build(&frequencies)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the node for `id`. Ids only come from this tree, so an
    /// out-of-range id is a bug and panics.
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn root_node(&self) -> &TreeNode {
        self.node(self.root)
    }

    pub fn children(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        match self.node(id) {
            TreeNode::Internal { left, right, .. } => Some((*left, *right)),
            TreeNode::Leaf { .. } => None,
        }
    }

    /// Total number of nodes, leaves and internals.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn internal_count(&self) -> usize {
        self.nodes.len() - self.leaf_count()
    }

    /// Longest root-to-leaf path, in edges.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            if let Some((left, right)) = self.children(id) {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        height
    }

    /// Checks that every internal node weighs exactly the sum of its children.
    pub fn weights_consistent(&self) -> bool {
        self.nodes.iter().all(|node| match node {
            TreeNode::Internal {
                weight,
                left,
                right,
            } => *weight == self.nodes[*left].weight() + self.nodes[*right].weight(),
            TreeNode::Leaf { .. } => true,
        })
    }

    pub fn print_structure(&self) -> String {
        let mut out = String::new();
        self.write_node(&mut out, self.root, 0, "root");
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId, depth: usize, label: &str) {
        let indent = "  ".repeat(depth);
        match self.node(id) {
            TreeNode::Leaf { symbol, weight } => {
                out.push_str(&format!(
                    "{}{} -> leaf {:?} [weight: {}]\n",
                    indent, label, symbol, weight
                ));
            }
            TreeNode::Internal {
                weight,
                left,
                right,
            } => {
                out.push_str(&format!("{}{} -> internal [weight: {}]\n", indent, label, weight));
                self.write_node(out, *left, depth + 1, "0");
                self.write_node(out, *right, depth + 1, "1");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_symbol(tree: &HuffmanTree, id: NodeId) -> char {
        match tree.node(id) {
            TreeNode::Leaf { symbol, .. } => *symbol,
            other => panic!("expected leaf, got {:?}", other),
        }
    }

    #[test]
    fn test_abracadabra_shape() {
        let tree = HuffmanTree::from_text("abracadabra").unwrap();

        assert_eq!(tree.root_node().weight(), 11);
        assert_eq!(tree.leaf_count(), 5);
        assert_eq!(tree.internal_count(), 4);
        assert!(tree.weights_consistent());

        // root = (a, ((c, d), (b, r)))
        let (a, rest) = tree.children(tree.root()).unwrap();
        assert_eq!(leaf_symbol(&tree, a), 'a');
        let (cd, br) = tree.children(rest).unwrap();
        let (c, d) = tree.children(cd).unwrap();
        let (b, r) = tree.children(br).unwrap();
        assert_eq!(
            [c, d, b, r].map(|id| leaf_symbol(&tree, id)),
            ['c', 'd', 'b', 'r']
        );
    }

    #[test]
    fn test_equal_weights_prefer_first_appearance() {
        let tree = HuffmanTree::from_text("ba").unwrap();
        let (left, right) = tree.children(tree.root()).unwrap();
        assert_eq!(leaf_symbol(&tree, left), 'b');
        assert_eq!(leaf_symbol(&tree, right), 'a');
    }

    #[test]
    fn test_single_symbol_is_leaf_root() {
        let tree = HuffmanTree::from_text("aaaa").unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(
            tree.root_node(),
            &TreeNode::Leaf {
                symbol: 'a',
                weight: 4
            }
        );
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_empty_table_is_invalid() {
        let empty = FrequencyTable::from_counts(Vec::new());
        assert!(matches!(
            HuffmanTree::build(&empty),
            Err(HuffmanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_build_is_deterministic() {
        let text = "the quick brown fox jumps over the lazy dog";
        let first = HuffmanTree::from_text(text).unwrap();
        let second = HuffmanTree::from_text(text).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_print_structure_lists_every_node() {
        let tree = HuffmanTree::from_text("aab").unwrap();
        let printed = tree.print_structure();
        assert_eq!(printed.lines().count(), tree.len());
        assert!(printed.starts_with("root -> internal [weight: 3]"));
    }
}
