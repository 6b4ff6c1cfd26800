use thiserror::Error;

use isittrue_media::CaptureError;

/// Fallback shown when a 2xx body flags failure without a message.
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Input rejected before any request is sent.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Please enter some text to analyze")]
    EmptyText,
    #[error("Please enter a URL")]
    EmptyUrl,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Please select an image")]
    MissingImage,
    #[error("Please record or load an audio clip")]
    MissingAudio,
    #[error("Temperature must be between 0 and 1 (got {0})")]
    InvalidTemperature(f32),
    #[error("Nothing to analyze: provide text, an image or audio")]
    NoContent,
    #[error("An analysis is already in progress")]
    Busy,
}

/// Every way a submission can fail. `Display` is the user-visible message.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local validation failure; the request was never sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Media could not be captured or encoded; the request was never sent.
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// The server answered with an error.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// No usable response was obtained.
    #[error("Network error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Whether the error was raised locally, before any network call.
    pub fn is_local(&self) -> bool {
        matches!(self, ClientError::Validation(_) | ClientError::Capture(_))
    }

    pub(crate) fn generic_server(status: u16) -> Self {
        ClientError::Server {
            status,
            message: format!("Server error: {status}"),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}
