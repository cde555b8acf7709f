//! The four service operations shared by the HTTP API, the MCP server and the
//! CLI: encrypt, decrypt, visualize and export.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::codec::{decode, Compressed, EncodedPayload};
use crate::config::ServiceConfig;
use crate::error::{HuffmanError, Result};
use crate::render::{self, DEFAULT_MIN_SCALE};
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptResponse {
    /// Payload as a string of `0`/`1`
    pub encoded_text: String,
    /// `(symbol, code)` pairs in first-appearance order
    pub code_table: Vec<(String, String)>,
    pub session_id: String,
    /// Meaningful bits in the payload
    pub bit_count: usize,
    /// Base64 of the packed payload bytes
    pub packed_payload: String,
    /// Length of the source text in symbols
    pub original_length: usize,
}

/// Either `encoded_text`, or `packed_payload` with `bit_count`, must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub encoded_text: Option<String>,
    #[serde(default)]
    pub packed_payload: Option<String>,
    #[serde(default)]
    pub bit_count: Option<usize>,
}

impl DecryptRequest {
    pub fn bits(session_id: impl Into<String>, encoded_text: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            encoded_text: Some(encoded_text.into()),
            ..Default::default()
        }
    }

    pub fn packed(session_id: impl Into<String>, packed_payload: impl Into<String>, bit_count: usize) -> Self {
        Self {
            session_id: session_id.into(),
            packed_payload: Some(packed_payload.into()),
            bit_count: Some(bit_count),
            ..Default::default()
        }
    }

    fn payload(&self) -> Result<EncodedPayload> {
        match (&self.encoded_text, &self.packed_payload, self.bit_count) {
            (Some(text), _, _) if !text.trim().is_empty() => EncodedPayload::from_bit_string(text.trim()),
            (_, Some(packed), Some(bit_count)) => EncodedPayload::from_base64(packed, bit_count),
            (_, Some(_), None) => Err(HuffmanError::InvalidInput(
                "bitCount is required with packedPayload".to_string(),
            )),
            _ => Err(HuffmanError::InvalidInput(
                "encodedText must not be empty".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptResponse {
    pub decoded_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizeResponse {
    /// Base64-encoded PNG
    pub tree_image: String,
}

/// A rendered PDF ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct HuffmanService {
    store: SessionStore,
    pdf_min_scale: f32,
}

impl Default for HuffmanService {
    fn default() -> Self {
        Self::new(SessionStore::new())
    }
}

impl HuffmanService {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            pdf_min_scale: DEFAULT_MIN_SCALE,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            store: config.session_store(),
            pdf_min_scale: config.render.pdf_min_scale,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Compresses `text` and opens a session holding its tree.
    pub fn encrypt(&self, text: &str) -> Result<EncryptResponse> {
        let compressed = Compressed::from_text(text)?;

        let encoded_text = compressed.payload.to_bit_string();
        let packed_payload = compressed.payload.to_base64();
        let bit_count = compressed.payload.bit_count();
        let original_length = compressed.text_length;
        let code_table = compressed
            .codes
            .iter()
            .map(|(symbol, code)| (symbol.to_string(), code.to_string()))
            .collect();
        let ratio = compressed.ratio();

        let session_id = self.store.put(compressed);
        tracing::info!(
            "Encoded {} symbols into {} bits ({:.1}% of 8-bit), session {}",
            original_length,
            bit_count,
            ratio * 100.0,
            session_id
        );

        Ok(EncryptResponse {
            encoded_text,
            code_table,
            session_id,
            bit_count,
            packed_payload,
            original_length,
        })
    }

    /// Decodes with the tree stored for the request's session.
    pub fn decrypt(&self, request: &DecryptRequest) -> Result<DecryptResponse> {
        let session_id = required_session_id(&request.session_id)?;
        // Validate the request shape before looking the session up.
        let has_payload = request.encoded_text.as_deref().is_some_and(|t| !t.trim().is_empty())
            || request.packed_payload.is_some();
        if !has_payload {
            return Err(HuffmanError::InvalidInput(
                "encodedText must not be empty".to_string(),
            ));
        }

        let session = self.store.get(session_id)?;
        let payload = request.payload()?;
        if payload.bit_count() != session.payload().bit_count() {
            tracing::debug!(
                "Session {} was encoded with {} bits, decoding {}",
                session_id,
                session.payload().bit_count(),
                payload.bit_count()
            );
        }
        let decoded_text = decode(&payload, session.tree()).inspect_err(|e| {
            tracing::debug!("Decode failed for session {}: {}", session_id, e);
        })?;

        tracing::info!(
            "Decoded {} bits into {} symbols, session {}",
            payload.bit_count(),
            decoded_text.chars().count(),
            session_id
        );
        Ok(DecryptResponse { decoded_text })
    }

    /// Renders the session's tree as a base64 PNG.
    pub fn visualize_tree(&self, session_id: &str) -> Result<VisualizeResponse> {
        let session_id = required_session_id(session_id)?;
        let session = self.store.get(session_id)?;
        let png = render::tree_png(session.tree())?;
        tracing::debug!("Rendered {} byte PNG for session {}", png.len(), session_id);

        Ok(VisualizeResponse {
            tree_image: STANDARD.encode(png),
        })
    }

    /// Renders the session's tree as a PDF document.
    pub fn export_tree(&self, session_id: &str) -> Result<ExportedDocument> {
        let session_id = required_session_id(session_id)?;
        let session = self.store.get(session_id)?;
        let bytes = render::tree_pdf(session.tree(), session_id, self.pdf_min_scale)?;
        tracing::debug!("Exported {} byte PDF for session {}", bytes.len(), session_id);

        Ok(ExportedDocument {
            filename: format!("huffman_tree_{}.pdf", session_id),
            content_type: "application/pdf",
            bytes,
        })
    }

    pub fn session_count(&self) -> usize {
        self.store.len()
    }
}

fn required_session_id(session_id: &str) -> Result<&str> {
    let trimmed = session_id.trim();
    if trimmed.is_empty() {
        return Err(HuffmanError::InvalidInput(
            "sessionId is required".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_reports_code_table_in_text_order() {
        let service = HuffmanService::default();
        let response = service.encrypt("abracadabra").unwrap();

        let symbols: Vec<&str> = response.code_table.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(symbols, vec!["a", "b", "r", "c", "d"]);
        assert_eq!(response.encoded_text, "01101110100010101101110");
        assert_eq!(response.bit_count, 23);
        assert_eq!(response.original_length, 11);
    }

    #[test]
    fn test_empty_text_creates_no_session() {
        let service = HuffmanService::default();
        assert!(matches!(
            service.encrypt(""),
            Err(HuffmanError::InvalidInput(_))
        ));
        assert_eq!(service.session_count(), 0);
    }

    #[test]
    fn test_decrypt_requires_payload_and_session() {
        let service = HuffmanService::default();
        let id = service.encrypt("abc").unwrap().session_id;

        assert!(matches!(
            service.decrypt(&DecryptRequest::bits(&id, "")),
            Err(HuffmanError::InvalidInput(_))
        ));
        assert!(matches!(
            service.decrypt(&DecryptRequest::bits("", "01")),
            Err(HuffmanError::InvalidInput(_))
        ));
        assert!(matches!(
            service.decrypt(&DecryptRequest {
                session_id: id,
                packed_payload: Some("AA==".to_string()),
                ..Default::default()
            }),
            Err(HuffmanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_blank_encoded_text_is_rejected() {
        let service = HuffmanService::default();
        let id = service.encrypt("abc").unwrap().session_id;

        for blank in ["   ", "\n\t "] {
            assert!(matches!(
                service.decrypt(&DecryptRequest::bits(&id, blank)),
                Err(HuffmanError::InvalidInput(_))
            ));
        }
        let request = DecryptRequest {
            encoded_text: Some("  ".to_string()),
            ..DecryptRequest::packed(&id, "AA==", 1)
        };
        assert!(request.payload().is_ok(), "packed form is used when the bit string is blank");
    }

    #[test]
    fn test_decrypt_packed_payload() {
        let service = HuffmanService::default();
        let encrypted = service.encrypt("to be or not to be").unwrap();
        let request = DecryptRequest::packed(
            &encrypted.session_id,
            &encrypted.packed_payload,
            encrypted.bit_count,
        );
        assert_eq!(
            service.decrypt(&request).unwrap().decoded_text,
            "to be or not to be"
        );
    }

    #[test]
    fn test_export_filename() {
        let service = HuffmanService::default();
        let id = service.encrypt("export me").unwrap().session_id;
        let document = service.export_tree(&id).unwrap();
        assert_eq!(document.filename, format!("huffman_tree_{}.pdf", id));
        assert_eq!(document.content_type, "application/pdf");
        assert!(document.bytes.starts_with(b"%PDF-"));
    }
}
