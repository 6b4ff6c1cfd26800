//! Media types and the capture trait.

use async_trait::async_trait;
use thiserror::Error;

/// Media categories accepted by the analysis endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    /// MIME prefix a payload of this kind must carry (e.g. "image/").
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            MediaKind::Image => "image/",
            MediaKind::Audio => "audio/",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
        }
    }
}

/// Errors raised while acquiring or encoding media.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Please select an {expected} file (got {found})")]
    UnsupportedType {
        expected: &'static str,
        found: String,
    },
    #[error("File is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
    #[error("File is empty: {0}")]
    EmptyFile(String),
    #[error("Microphone access error: {0}")]
    DeviceUnavailable(String),
    #[error("No audio was recorded")]
    EmptyRecording,
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),
}

/// Media payload ready to be embedded in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMedia {
    pub kind: MediaKind,
    /// MIME type of the raw payload.
    pub mime_type: String,
    /// Size of the raw payload in bytes.
    pub byte_len: usize,
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
    /// Where the payload came from (file name or "microphone").
    pub origin: String,
}

impl EncodedMedia {
    /// One-line preview, e.g. `image/png, 1.5 KiB (photo.png)`.
    pub fn preview(&self) -> String {
        format!(
            "{}, {} ({})",
            self.mime_type,
            human_size(self.byte_len),
            self.origin
        )
    }
}

fn human_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

/// Anything that can produce an encoded media payload.
///
/// Capture is a single awaitable step: it either yields the encoded payload
/// or a [`CaptureError`].
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Kind of media this source produces.
    fn kind(&self) -> MediaKind;
    /// Acquire and encode the media.
    async fn capture(&self) -> Result<EncodedMedia, CaptureError>;
}
