//! Symbol frequency analysis.

use std::collections::HashMap;

use crate::error::{HuffmanError, Result};

/// Symbol counts for one input text, remembering first-appearance order.
///
/// The order matters twice: it seeds the tree builder's tie-break and it is
/// the order the code table is reported in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(char, u64)>,
    positions: HashMap<char, usize>,
}

impl FrequencyTable {
    /// Counts every symbol of `text` in a single pass.
    ///
    /// Fails with [`HuffmanError::InvalidInput`] when the text is empty or only
    /// whitespace. Whitespace inside a non-blank text is counted like any
    /// other symbol.
    pub fn analyze(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(HuffmanError::InvalidInput(
                "text must not be empty".to_string(),
            ));
        }

        let mut table = Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        };
        for symbol in text.chars() {
            match table.positions.get(&symbol) {
                Some(&pos) => table.entries[pos].1 += 1,
                None => {
                    table.positions.insert(symbol, table.entries.len());
                    table.entries.push((symbol, 1));
                }
            }
        }
        Ok(table)
    }

    /// Builds a table from explicit counts, kept in the given order.
    /// Zero counts are dropped and repeated symbols are merged.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (char, u64)>,
    {
        let mut table = Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        };
        for (symbol, count) in counts.into_iter().filter(|(_, c)| *c > 0) {
            match table.positions.get(&symbol) {
                Some(&pos) => table.entries[pos].1 += count,
                None => {
                    table.positions.insert(symbol, table.entries.len());
                    table.entries.push((symbol, count));
                }
            }
        }
        table
    }

    pub fn get(&self, symbol: char) -> Option<u64> {
        self.positions.get(&symbol).map(|&pos| self.entries[pos].1)
    }

    /// Position of `symbol` in first-appearance order.
    pub fn rank(&self, symbol: char) -> Option<usize> {
        self.positions.get(&symbol).copied()
    }

    /// Iterates `(symbol, count)` in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, i.e. the length of the text in symbols.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }
}
