//! Input modes, validation and request construction.

use std::fmt;

use url::Url;

use isittrue_config::ClientConfig;
use isittrue_media::EncodedMedia;
use isittrue_types::{AnalysisRequest, RequestType};

use crate::error::ValidationError;

/// Which input the user is currently filling in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Text,
    Url,
    Image,
    Audio,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Text => "text",
            InputMode::Url => "url",
            InputMode::Image => "image",
            InputMode::Audio => "audio",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submission's worth of user input.
#[derive(Debug, Clone)]
pub enum AnalysisInput {
    Text(String),
    Url(String),
    Image {
        media: EncodedMedia,
        caption: String,
    },
    Audio(EncodedMedia),
}

impl AnalysisInput {
    pub fn mode(&self) -> InputMode {
        match self {
            AnalysisInput::Text(_) => InputMode::Text,
            AnalysisInput::Url(_) => InputMode::Url,
            AnalysisInput::Image { .. } => InputMode::Image,
            AnalysisInput::Audio(_) => InputMode::Audio,
        }
    }
}

/// Settings sent alongside every request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RequestOptions {
    pub request_type: Option<RequestType>,
    pub temperature: Option<f32>,
}

impl RequestOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            request_type: config.request_type,
            temperature: config.temperature,
        }
    }
}

/// Check that `input` is a well-formed absolute URL.
pub fn validate_url(input: &str) -> Result<Url, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    Url::parse(trimmed).map_err(|e| ValidationError::InvalidUrl(e.to_string()))
}

fn validate_temperature(temperature: Option<f32>) -> Result<(), ValidationError> {
    match temperature {
        Some(t) if !(0.0..=1.0).contains(&t) => Err(ValidationError::InvalidTemperature(t)),
        _ => Ok(()),
    }
}

/// Validate `input` and build the JSON body for `POST /api/analyze`.
pub fn build_request(
    input: &AnalysisInput,
    options: RequestOptions,
) -> Result<AnalysisRequest, ValidationError> {
    validate_temperature(options.temperature)?;

    let mut request = match input {
        AnalysisInput::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(ValidationError::EmptyText);
            }
            AnalysisRequest::text(text)
        }
        AnalysisInput::Url(raw) => {
            validate_url(raw)?;
            // Sent as typed (trimmed), not in `Url`'s normalized form.
            AnalysisRequest::text(raw.trim())
        }
        AnalysisInput::Image { media, caption } => {
            if media.data_url.is_empty() {
                return Err(ValidationError::MissingImage);
            }
            AnalysisRequest {
                text: Some(caption.trim().to_string()),
                image: Some(media.data_url.clone()),
                ..Default::default()
            }
        }
        AnalysisInput::Audio(media) => {
            if media.data_url.is_empty() {
                return Err(ValidationError::MissingAudio);
            }
            AnalysisRequest {
                text: Some(String::new()),
                audio: Some(media.data_url.clone()),
                ..Default::default()
            }
        }
    };

    request.request_type = options.request_type;
    request.temperature = options.temperature;
    tracing::debug!("Built {} request", input.mode());
    Ok(request)
}
