//! Tree rendering: a deterministic layout, a PNG rasterizer and a PDF
//! exporter, all pure functions from a tree to bytes.

pub mod font;
pub mod layout;
pub mod pdf;
pub mod raster;

pub use layout::{symbol_label, LayoutEdge, LayoutNode, NodeShape, TreeLayout};
pub use pdf::{export_pdf, plan_pages, PageGrid, DEFAULT_MIN_SCALE};
pub use raster::render_png;

use crate::codec::HuffmanTree;
use crate::error::Result;

/// Lays out and rasterizes a tree as PNG bytes.
pub fn tree_png(tree: &HuffmanTree) -> Result<Vec<u8>> {
    render_png(&TreeLayout::compute(tree))
}

/// Lays out a tree and writes it as a PDF titled for `session_id`.
pub fn tree_pdf(tree: &HuffmanTree, session_id: &str, min_scale: f32) -> Result<Vec<u8>> {
    let header = format!("Huffman tree - session {}", session_id);
    export_pdf(&TreeLayout::compute(tree), &header, min_scale)
}
