//! Prefix-code table derived from a tree.

use std::collections::HashMap;

use super::frequency::FrequencyTable;
use super::tree::{HuffmanTree, TreeNode};

/// Symbol -> code, reported in first-appearance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    entries: Vec<(char, String)>,
    positions: HashMap<char, usize>,
}

impl CodeTable {
    /// Walks `tree` from the root, appending `0` for every left branch and `1`
    /// for every right branch. The codes are listed in the order of
    /// `frequencies`, which must be the table the tree was built from.
    pub fn derive(tree: &HuffmanTree, frequencies: &FrequencyTable) -> Self {
        let mut codes: HashMap<char, String> = HashMap::with_capacity(frequencies.len());

        if let TreeNode::Leaf { symbol, .. } = tree.root_node() {
            codes.insert(*symbol, "0".to_string());
        } else {
            let mut stack = vec![(tree.root(), String::new())];
            while let Some((id, prefix)) = stack.pop() {
                match tree.node(id) {
                    TreeNode::Leaf { symbol, .. } => {
                        codes.insert(*symbol, prefix);
                    }
                    TreeNode::Internal { left, right, .. } => {
                        stack.push((*right, format!("{}1", prefix)));
                        stack.push((*left, format!("{}0", prefix)));
                    }
                }
            }
        }

        let mut entries = Vec::with_capacity(codes.len());
        let mut positions = HashMap::with_capacity(codes.len());
        for (symbol, _) in frequencies.iter() {
            let code = codes
                .remove(&symbol)
                .expect("every counted symbol has a leaf in its tree");
            positions.insert(symbol, entries.len());
            entries.push((symbol, code));
        }

        Self { entries, positions }
    }

    pub fn code(&self, symbol: char) -> Option<&str> {
        self.positions
            .get(&symbol)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    /// `(symbol, code)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        self.entries.iter().map(|(s, c)| (*s, c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when no code is a prefix of another one.
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<&str> = self.entries.iter().map(|(_, c)| c.as_str()).collect();
        codes.sort_unstable();
        // After sorting, a prefix sits directly before some code it prefixes.
        codes.windows(2).all(|w| !w[1].starts_with(w[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_for(text: &str) -> (CodeTable, FrequencyTable) {
        let frequencies = FrequencyTable::analyze(text).unwrap();
        let tree = HuffmanTree::build(&frequencies).unwrap();
        (CodeTable::derive(&tree, &frequencies), frequencies)
    }

    #[test]
    fn test_abracadabra_codes() {
        let (table, _) = table_for("abracadabra");
        let codes: Vec<_> = table.iter().collect();
        assert_eq!(
            codes,
            vec![
                ('a', "0"),
                ('b', "110"),
                ('r', "111"),
                ('c', "100"),
                ('d', "101"),
            ]
        );
    }

    #[test]
    fn test_single_symbol_gets_one_bit() {
        let (table, _) = table_for("aaaa");
        assert_eq!(table.code('a'), Some("0"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_codes_are_prefix_free() {
        let (table, _) = table_for("Sphinx of black quartz, judge my vow! 0123456789");
        assert!(table.is_prefix_free());
        assert!(table.iter().all(|(_, code)| !code.is_empty()));
    }

    #[test]
    fn test_prefix_check_detects_violation() {
        let mut positions = HashMap::new();
        positions.insert('x', 0);
        positions.insert('y', 1);
        let broken = CodeTable {
            entries: vec![('x', "01".to_string()), ('y', "011".to_string())],
            positions,
        };
        assert!(!broken.is_prefix_free());
    }

    #[test]
    fn test_unknown_symbol_has_no_code() {
        let (table, _) = table_for("abc");
        assert_eq!(table.code('z'), None);
    }
}
