//! Session model.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec::{CodeTable, Compressed, EncodedPayload, HuffmanTree};

/// The immutable result of one encode request, kept for later decode,
/// visualize and export calls.
#[derive(Debug)]
pub struct Session {
    /// Session ID
    pub id: String,
    /// Creation timestamp (seconds since the epoch)
    pub created_at: u64,
    compressed: Compressed,
}

impl Session {
    pub(crate) fn new(id: String, compressed: Compressed) -> Self {
        Self {
            id,
            created_at: epoch_secs(),
            compressed,
        }
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.compressed.tree
    }

    pub fn codes(&self) -> &CodeTable {
        &self.compressed.codes
    }

    /// The payload produced at encode time.
    pub fn payload(&self) -> &EncodedPayload {
        &self.compressed.payload
    }

    /// Length of the encoded text in symbols.
    pub fn text_length(&self) -> usize {
        self.compressed.text_length
    }

    /// Seconds since the session was created.
    pub fn age_secs(&self) -> u64 {
        epoch_secs().saturating_sub(self.created_at)
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
