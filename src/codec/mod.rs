//! Huffman codec: frequency analysis, tree construction, code derivation and
//! bit-level encode/decode.

pub mod bits;
pub mod frequency;
pub mod table;
pub mod tree;

pub use bits::{decode, encode, BitVec, EncodedPayload};
pub use frequency::FrequencyTable;
pub use table::CodeTable;
pub use tree::{HuffmanTree, NodeId, TreeNode};

use crate::error::Result;

/// Everything one encode produces: counts, tree, codes and packed output.
#[derive(Debug, Clone)]
pub struct Compressed {
    pub frequencies: FrequencyTable,
    pub tree: HuffmanTree,
    pub codes: CodeTable,
    pub payload: EncodedPayload,
    /// Length of the source text in symbols.
    pub text_length: usize,
}

impl Compressed {
    /// Runs the whole pipeline: count, build, derive codes, pack.
    pub fn from_text(text: &str) -> Result<Self> {
        let frequencies = FrequencyTable::analyze(text)?;
        let tree = HuffmanTree::build(&frequencies)?;
        let codes = CodeTable::derive(&tree, &frequencies);
        let payload = encode(text, &codes)?;
        Ok(Self {
            text_length: frequencies.total() as usize,
            frequencies,
            tree,
            codes,
            payload,
        })
    }

    /// Compressed size against 8 bits per symbol, as a fraction of the original.
    pub fn ratio(&self) -> f64 {
        if self.text_length == 0 {
            return 0.0;
        }
        self.payload.bit_count() as f64 / (self.text_length as f64 * 8.0)
    }
}
