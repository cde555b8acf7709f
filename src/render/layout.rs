//! Tree layout.
//!
//! Positions are in abstract layout units: one unit is one pixel of the
//! built-in font at scale 1. Depth picks the row and the in-order position
//! picks the column, so a tree always yields the same layout.

use serde::Serialize;

use super::font;
use crate::codec::{HuffmanTree, NodeId, TreeNode};

pub const MARGIN: i32 = 16;
pub const ROW_HEIGHT: i32 = 44;
pub const MIN_COLUMN_WIDTH: i32 = 28;
/// Space between the text and the outline of a node
pub const NODE_PADDING: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    /// Internal nodes are drawn as discs
    Disc,
    /// Leaves are drawn as boxes
    Box,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutNode {
    pub id: NodeId,
    pub x: i32,
    pub y: i32,
    pub depth: usize,
    pub shape: NodeShape,
    /// Horizontal extent from the centre
    pub half_width: i32,
    /// Vertical extent from the centre
    pub half_height: i32,
    pub label: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub bit: char,
    pub start: (i32, i32),
    pub end: (i32, i32),
    /// Where the bit label is centred
    pub label_at: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeLayout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub width: i32,
    pub height: i32,
    pub column_width: i32,
}

/// Printable form of a symbol for tree labels. Only ASCII is produced, so
/// every renderer can draw it.
pub fn symbol_label(symbol: char) -> String {
    match symbol {
        ' ' => "SP".to_string(),
        '\t' => "TAB".to_string(),
        '\n' => "LF".to_string(),
        '\r' => "CR".to_string(),
        c if c.is_ascii_graphic() => c.to_string(),
        c => format!("U+{:04X}", c as u32),
    }
}

fn node_label(node: &TreeNode) -> Vec<String> {
    match node {
        TreeNode::Leaf { symbol, weight } => vec![symbol_label(*symbol), weight.to_string()],
        TreeNode::Internal { weight, .. } => vec![weight.to_string()],
    }
}

impl TreeLayout {
    pub fn compute(tree: &HuffmanTree) -> Self {
        // In-order walk, recording each node's column and depth.
        let mut order: Vec<(NodeId, usize)> = Vec::with_capacity(tree.len());
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        let mut cursor = Some((tree.root(), 0usize));
        loop {
            while let Some((id, depth)) = cursor {
                stack.push((id, depth));
                cursor = tree.children(id).map(|(left, _)| (left, depth + 1));
            }
            let Some((id, depth)) = stack.pop() else {
                break;
            };
            order.push((id, depth));
            cursor = tree.children(id).map(|(_, right)| (right, depth + 1));
        }

        let labels: Vec<Vec<String>> = order
            .iter()
            .map(|(id, _)| node_label(tree.node(*id)))
            .collect();
        let widest = labels
            .iter()
            .flat_map(|lines| lines.iter().map(|l| font::text_width(l)))
            .max()
            .unwrap_or(0);
        let column_width = (widest + 2 * NODE_PADDING + 8).max(MIN_COLUMN_WIDTH);

        let mut slots = vec![None; tree.len()];
        let mut nodes = Vec::with_capacity(order.len());
        for (column, ((id, depth), label)) in order.iter().zip(labels).enumerate() {
            let node = tree.node(*id);
            let text_w = label.iter().map(|l| font::text_width(l)).max().unwrap_or(0);
            let text_h = font::block_height(label.len());
            let (shape, half_width, half_height) = if node.is_leaf() {
                (
                    NodeShape::Box,
                    text_w / 2 + NODE_PADDING,
                    text_h / 2 + NODE_PADDING,
                )
            } else {
                let radius = (text_w.max(text_h) / 2 + NODE_PADDING + 1).max(11);
                (NodeShape::Disc, radius, radius)
            };

            slots[*id] = Some(nodes.len());
            nodes.push(LayoutNode {
                id: *id,
                x: MARGIN + column as i32 * column_width + column_width / 2,
                y: MARGIN + *depth as i32 * ROW_HEIGHT + ROW_HEIGHT / 2,
                depth: *depth,
                shape,
                half_width,
                half_height,
                label,
            });
        }

        let mut edges = Vec::with_capacity(nodes.len().saturating_sub(1));
        for parent in &nodes {
            let Some((left, right)) = tree.children(parent.id) else {
                continue;
            };
            for (child_id, bit) in [(left, '0'), (right, '1')] {
                let child = &nodes[slots[child_id].expect("every node has a layout slot")];
                let start = (parent.x, parent.y + parent.half_height);
                let end = (child.x, child.y - child.half_height);
                let mid = ((start.0 + end.0) / 2, (start.1 + end.1) / 2);
                let offset = if bit == '0' { -7 } else { 7 };
                edges.push(LayoutEdge {
                    from: parent.id,
                    to: child_id,
                    bit,
                    start,
                    end,
                    label_at: (mid.0 + offset, mid.1),
                });
            }
        }

        let depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0) as i32;
        Self {
            width: 2 * MARGIN + nodes.len() as i32 * column_width,
            height: 2 * MARGIN + (depth + 1) * ROW_HEIGHT,
            nodes,
            edges,
            column_width,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_follow_in_order() {
        let tree = HuffmanTree::from_text("abracadabra").unwrap();
        let layout = TreeLayout::compute(&tree);

        assert_eq!(layout.nodes.len(), tree.len());
        assert_eq!(layout.edges.len(), tree.len() - 1);
        assert!(layout.nodes.windows(2).all(|w| w[0].x < w[1].x));

        // leftmost node is the leaf 'a', the root sits in the second column
        assert_eq!(layout.nodes[0].label, vec!["a".to_string(), "5".to_string()]);
        let root = layout.node(tree.root()).unwrap();
        assert_eq!(root.depth, 0);
        assert_eq!(root.label, vec!["11".to_string()]);
        assert_eq!(root.x, layout.nodes[1].x);
    }

    #[test]
    fn test_depth_sets_row() {
        let tree = HuffmanTree::from_text("abracadabra").unwrap();
        let layout = TreeLayout::compute(&tree);
        for node in &layout.nodes {
            assert_eq!(node.y, MARGIN + node.depth as i32 * ROW_HEIGHT + ROW_HEIGHT / 2);
            assert!(node.x > 0 && node.x < layout.width);
            assert!(node.y > 0 && node.y < layout.height);
        }
    }

    #[test]
    fn test_edges_carry_bits() {
        let tree = HuffmanTree::from_text("ab").unwrap();
        let layout = TreeLayout::compute(&tree);
        let bits: Vec<char> = layout.edges.iter().map(|e| e.bit).collect();
        assert_eq!(bits, vec!['0', '1']);
        assert!(layout.edges.iter().all(|e| e.from == tree.root()));
    }

    #[test]
    fn test_single_leaf_layout() {
        let tree = HuffmanTree::from_text("zzz").unwrap();
        let layout = TreeLayout::compute(&tree);
        assert_eq!(layout.nodes.len(), 1);
        assert!(layout.edges.is_empty());
        assert_eq!(layout.nodes[0].shape, NodeShape::Box);
    }

    #[test]
    fn test_symbol_labels() {
        assert_eq!(symbol_label('a'), "a");
        assert_eq!(symbol_label(' '), "SP");
        assert_eq!(symbol_label('\n'), "LF");
        assert_eq!(symbol_label('ñ'), "U+00F1");
        assert_eq!(symbol_label('😀'), "U+1F600");
    }

    #[test]
    fn test_layout_is_deterministic() {
        let text = "pack my box with five dozen liquor jugs";
        let a = TreeLayout::compute(&HuffmanTree::from_text(text).unwrap());
        let b = TreeLayout::compute(&HuffmanTree::from_text(text).unwrap());
        assert_eq!(a, b);
    }
}
