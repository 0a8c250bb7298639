//! Data URI encoding for download mode.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode `bytes` as `data:<content_type>;base64,<payload>`.
pub fn encode_data_uri(content_type: &str, bytes: &[u8]) -> String {
    let payload = STANDARD.encode(bytes);
    let mut uri = String::with_capacity(content_type.len() + payload.len() + 13);
    uri.push_str("data:");
    uri.push_str(content_type);
    uri.push_str(";base64,");
    uri.push_str(&payload);
    uri
}
