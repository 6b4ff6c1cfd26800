//! isittrue-media: image and audio capture, encoded as base64 data URLs.

pub mod data_url;
pub mod file;
pub mod mime;
pub mod recorder;
pub mod types;

pub use data_url::{DecodedDataUrl, decode_data_url, encode_data_url};
pub use file::FileSource;
pub use recorder::{Recorder, RecorderCommand, Recording, TimedRecording, format_elapsed};
pub use types::{CaptureError, EncodedMedia, MediaKind, MediaSource};
