//! Base64 data URL encoding and decoding.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::types::CaptureError;

static DATA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(?P<mime>[\w.+-]+/[\w.+-]+)?(?P<params>(?:;[\w.+-]+=[^;,]*)*);base64,(?P<data>.*)$")
        .expect("data URL regex is valid")
});

/// Decoded contents of a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUrl {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Encode raw bytes as `data:<mime>;base64,<payload>`.
pub fn encode_data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(data))
}

/// Decode a base64 data URL.
///
/// A missing media type defaults to `text/plain`, as for browser data URLs.
/// Only base64 payloads are accepted.
pub fn decode_data_url(url: &str) -> Result<DecodedDataUrl, CaptureError> {
    let caps = DATA_URL_RE
        .captures(url.trim())
        .ok_or_else(|| CaptureError::InvalidDataUrl("expected data:<mime>;base64,<payload>".into()))?;

    let mime_type = caps
        .name("mime")
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_else(|| "text/plain".to_string());
    let payload = caps.name("data").map(|m| m.as_str()).unwrap_or("");

    let data = STANDARD
        .decode(payload)
        .map_err(|e| CaptureError::InvalidDataUrl(e.to_string()))?;

    Ok(DecodedDataUrl { mime_type, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(
            encode_data_url("image/png", b"hello"),
            "data:image/png;base64,aGVsbG8="
        );
        assert_eq!(encode_data_url("audio/wav", b""), "data:audio/wav;base64,");
    }

    #[test]
    fn test_decode() {
        let decoded = decode_data_url("data:audio/webm;base64,aGVsbG8=").unwrap();
        assert_eq!(decoded.mime_type, "audio/webm");
        assert_eq!(decoded.data, b"hello");
    }

    #[test]
    fn test_decode_with_params() {
        let decoded = decode_data_url("data:audio/webm;codecs=opus;base64,aGk=").unwrap();
        assert_eq!(decoded.mime_type, "audio/webm");
        assert_eq!(decoded.data, b"hi");
    }

    #[test]
    fn test_decode_default_mime() {
        let decoded = decode_data_url("data:;base64,aGk=").unwrap();
        assert_eq!(decoded.mime_type, "text/plain");
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        assert!(matches!(
            decode_data_url("data:text/plain,hello"),
            Err(CaptureError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(CaptureError::InvalidDataUrl(_))
        ));
        assert!(decode_data_url("https://example.com/a.png").is_err());
    }
}
