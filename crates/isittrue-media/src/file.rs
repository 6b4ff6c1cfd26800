//! Image and audio loading from local files.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::data_url::encode_data_url;
use crate::mime::detect_mime;
use crate::types::{CaptureError, EncodedMedia, MediaKind, MediaSource};

/// Loads a media file from disk and encodes it as a data URL.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    kind: MediaKind,
    max_bytes: u64,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, kind: MediaKind, max_bytes: u64) -> Self {
        Self {
            path: path.into(),
            kind,
            max_bytes,
        }
    }

    pub fn image(path: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self::new(path, MediaKind::Image, max_bytes)
    }

    pub fn audio(path: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self::new(path, MediaKind::Audio, max_bytes)
    }

    fn read_error(&self, source: std::io::Error) -> CaptureError {
        CaptureError::Read {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl MediaSource for FileSource {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    async fn capture(&self) -> Result<EncodedMedia, CaptureError> {
        let meta = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| self.read_error(e))?;
        if meta.len() > self.max_bytes {
            return Err(CaptureError::TooLarge {
                size: meta.len(),
                limit: self.max_bytes,
            });
        }

        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.read_error(e))?;
        if data.is_empty() {
            return Err(CaptureError::EmptyFile(self.path.display().to_string()));
        }

        let mime_type = detect_mime(&self.path, &data);
        if !mime_type.starts_with(self.kind.mime_prefix()) {
            return Err(CaptureError::UnsupportedType {
                expected: self.kind.name(),
                found: mime_type,
            });
        }

        tracing::debug!(
            "Loaded {} file {} ({mime_type}, {} bytes)",
            self.kind.name(),
            self.path.display(),
            data.len()
        );

        let origin = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());

        Ok(EncodedMedia {
            kind: self.kind,
            data_url: encode_data_url(&mime_type, &data),
            byte_len: data.len(),
            mime_type,
            origin,
        })
    }
}
