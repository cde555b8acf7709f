//! Bit packing and tree-walking decode.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::table::CodeTable;
use super::tree::{HuffmanTree, TreeNode};
use crate::error::{HuffmanError, Result};

/// Growable bit sequence, packed MSB-first into bytes.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BitVec {
    bytes: Vec<u8>,
    bit_count: usize,
}

impl BitVec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            bit_count: 0,
        }
    }

    pub fn push(&mut self, bit: bool) {
        let byte_index = self.bit_count / 8;
        let bit_offset = self.bit_count % 8;

        if byte_index >= self.bytes.len() {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[byte_index] |= 1 << (7 - bit_offset);
        }
        self.bit_count += 1;
    }

    /// Appends a code written as `'0'`/`'1'` characters.
    pub fn push_code(&mut self, code: &str) {
        for c in code.bytes() {
            self.push(c == b'1');
        }
    }

    /// Reads bit `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.bit_count {
            return None;
        }
        Some(self.bytes[index / 8] & (1 << (7 - index % 8)) != 0)
    }

    pub fn len(&self) -> usize {
        self.bit_count
    }

    pub fn is_empty(&self) -> bool {
        self.bit_count == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bit_count).filter_map(move |i| self.get(i))
    }
}

/// Packed Huffman output plus the number of meaningful bits.
///
/// Bits past `bit_count` in the last byte are padding and always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    bits: BitVec,
}

impl EncodedPayload {
    pub fn bit_count(&self) -> usize {
        self.bits.len()
    }

    pub fn packed(&self) -> &[u8] {
        self.bits.as_bytes()
    }

    /// Renders the payload as a string of `'0'` and `'1'`.
    pub fn to_bit_string(&self) -> String {
        self.bits.iter().map(|b| if b { '1' } else { '0' }).collect()
    }

    /// Parses a `'0'`/`'1'` string; every character is a meaningful bit.
    pub fn from_bit_string(text: &str) -> Result<Self> {
        let mut bits = BitVec::with_capacity(text.len());
        for (i, c) in text.chars().enumerate() {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                other => {
                    return Err(HuffmanError::CorruptPayload(format!(
                        "unexpected character {:?} at position {}",
                        other, i
                    )))
                }
            }
        }
        Ok(Self { bits })
    }

    /// Base64 of the packed bytes. Pair it with [`Self::bit_count`].
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bits.as_bytes())
    }

    /// Rebuilds a payload from base64 bytes and the meaningful-bit count.
    pub fn from_base64(encoded: &str, bit_count: usize) -> Result<Self> {
        let mut bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| HuffmanError::CorruptPayload(format!("invalid base64: {}", e)))?;

        if bit_count > bytes.len() * 8 {
            return Err(HuffmanError::CorruptPayload(format!(
                "bit count {} exceeds the {} packed bytes",
                bit_count,
                bytes.len()
            )));
        }
        if bytes.len() != bit_count.div_ceil(8) {
            return Err(HuffmanError::CorruptPayload(format!(
                "{} packed bytes do not match a bit count of {}",
                bytes.len(),
                bit_count
            )));
        }
        // Clear any padding so equal payloads compare equal.
        if bit_count % 8 != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= 0xFFu8 << (8 - bit_count % 8);
            }
        }

        Ok(Self {
            bits: BitVec { bytes, bit_count },
        })
    }
}

/// Encodes `text` by concatenating the code of every symbol.
///
/// Fails with [`HuffmanError::InvalidInput`] when the text contains a symbol
/// the table has no code for.
pub fn encode(text: &str, table: &CodeTable) -> Result<EncodedPayload> {
    let mut bits = BitVec::with_capacity(text.len() * 2);
    for symbol in text.chars() {
        let code = table.code(symbol).ok_or_else(|| {
            HuffmanError::InvalidInput(format!("symbol {:?} is not in the code table", symbol))
        })?;
        bits.push_code(code);
    }
    Ok(EncodedPayload { bits })
}

/// Decodes a payload by walking `tree` from the root: `0` goes left, `1`
/// goes right, and every leaf reached emits its symbol.
///
/// Reading stops at the meaningful-bit count. Ending between two leaves is
/// reported as [`HuffmanError::CorruptPayload`]. When the root is itself a
/// leaf each `0` bit is one symbol and a `1` bit is corrupt.
pub fn decode(payload: &EncodedPayload, tree: &HuffmanTree) -> Result<String> {
    let mut out = String::new();

    if let TreeNode::Leaf { symbol, .. } = tree.root_node() {
        for (index, bit) in payload.bits.iter().enumerate() {
            if bit {
                return Err(HuffmanError::CorruptPayload(format!(
                    "bit {} is 1 but the tree only has the code 0",
                    index
                )));
            }
            out.push(*symbol);
        }
        return Ok(out);
    }

    let mut current = tree.root();
    let mut symbol_start = 0;
    for (index, bit) in payload.bits.iter().enumerate() {
        let (left, right) = tree
            .children(current)
            .expect("walk restarts at the root after every leaf");
        current = if bit { right } else { left };

        if let TreeNode::Leaf { symbol, .. } = tree.node(current) {
            out.push(*symbol);
            current = tree.root();
            symbol_start = index + 1;
        }
    }

    if current != tree.root() {
        return Err(HuffmanError::CorruptPayload(format!(
            "payload ends inside a code: bits {}..{} do not reach a leaf",
            symbol_start,
            payload.bit_count()
        )));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::frequency::FrequencyTable;

    fn setup(text: &str) -> (HuffmanTree, CodeTable) {
        let frequencies = FrequencyTable::analyze(text).unwrap();
        let tree = HuffmanTree::build(&frequencies).unwrap();
        let table = CodeTable::derive(&tree, &frequencies);
        (tree, table)
    }

    #[test]
    fn test_bitvec_packs_msb_first() {
        let mut bits = BitVec::new();
        bits.push_code("101");
        assert_eq!(bits.as_bytes(), &[0b1010_0000]);
        assert_eq!(bits.len(), 3);
        assert_eq!(bits.get(0), Some(true));
        assert_eq!(bits.get(1), Some(false));
        assert_eq!(bits.get(3), None);
    }

    #[test]
    fn test_encode_abracadabra() {
        let (tree, table) = setup("abracadabra");
        let payload = encode("abracadabra", &table).unwrap();
        assert_eq!(payload.to_bit_string(), "01101110100010101101110");
        assert_eq!(payload.bit_count(), 23);
        assert_eq!(payload.packed().len(), 3);
        assert_eq!(decode(&payload, &tree).unwrap(), "abracadabra");
    }

    #[test]
    fn test_single_symbol_one_bit_each() {
        let (tree, table) = setup("aaaa");
        let payload = encode("aaaa", &table).unwrap();
        assert_eq!(payload.to_bit_string(), "0000");
        assert_eq!(decode(&payload, &tree).unwrap(), "aaaa");

        let bad = EncodedPayload::from_bit_string("0010").unwrap();
        assert!(matches!(
            decode(&bad, &tree),
            Err(HuffmanError::CorruptPayload(_))
        ));
    }

    #[test]
    fn test_truncated_payload_is_corrupt() {
        let (tree, table) = setup("abracadabra");
        let full = encode("abracadabra", &table).unwrap().to_bit_string();
        // cut the final "0" for 'a' and the last bit of the "111" for 'r'
        let truncated = EncodedPayload::from_bit_string(&full[..full.len() - 2]).unwrap();
        assert!(matches!(
            decode(&truncated, &tree),
            Err(HuffmanError::CorruptPayload(_))
        ));
    }

    #[test]
    fn test_rejects_non_binary_characters() {
        assert!(matches!(
            EncodedPayload::from_bit_string("01x1"),
            Err(HuffmanError::CorruptPayload(_))
        ));
    }

    #[test]
    fn test_base64_transport() {
        let (tree, table) = setup("mississippi");
        let payload = encode("mississippi", &table).unwrap();
        let restored =
            EncodedPayload::from_base64(&payload.to_base64(), payload.bit_count()).unwrap();
        assert_eq!(restored, payload);
        assert_eq!(decode(&restored, &tree).unwrap(), "mississippi");
    }

    #[test]
    fn test_base64_bit_count_must_fit() {
        let encoded = STANDARD.encode([0xFFu8]);
        assert!(matches!(
            EncodedPayload::from_base64(&encoded, 9),
            Err(HuffmanError::CorruptPayload(_))
        ));
        assert!(matches!(
            EncodedPayload::from_base64(&encoded, 0),
            Err(HuffmanError::CorruptPayload(_))
        ));
    }

    #[test]
    fn test_decode_never_reads_padding() {
        let (tree, _) = setup("ab");
        // "a" = 0, "b" = 1; padding bits are set to 1 in the raw byte
        let payload = EncodedPayload::from_base64(&STANDARD.encode([0b0111_1111u8]), 2).unwrap();
        assert_eq!(decode(&payload, &tree).unwrap(), "ab");
    }

    #[test]
    fn test_unknown_symbol_rejected_on_encode() {
        let (_, table) = setup("abc");
        assert!(matches!(
            encode("abd", &table),
            Err(HuffmanError::InvalidInput(_))
        ));
    }
}
