//! Form model: the fields for each input mode plus the submission state.

use isittrue_media::{CaptureError, EncodedMedia, MediaKind};
use isittrue_types::RequestType;

use crate::client::Analyzer;
use crate::error::{ClientError, ValidationError};
use crate::input::{AnalysisInput, InputMode, RequestOptions, build_request};
use crate::state::{ClientState, View, render};

/// Holds everything the user has entered, one mode active at a time.
#[derive(Debug, Clone, Default)]
pub struct AnalysisForm {
    mode: InputMode,
    text: String,
    url: String,
    caption: String,
    image: Option<EncodedMedia>,
    audio: Option<EncodedMedia>,
    options: RequestOptions,
    state: ClientState,
}

impl AnalysisForm {
    pub fn new(options: RequestOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn view(&self) -> View {
        render(&self.state)
    }

    pub fn options(&self) -> RequestOptions {
        self.options
    }

    /// Switch to another input mode. Clears every field and the last result.
    pub fn switch_mode(&mut self, mode: InputMode) {
        self.clear();
        self.mode = mode;
    }

    /// Clear every field, preview and result. Mode and options are kept.
    pub fn reset(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.text.clear();
        self.url.clear();
        self.caption.clear();
        self.image = None;
        self.audio = None;
        self.state = ClientState::Idle;
    }

    pub fn set_request_type(&mut self, request_type: Option<RequestType>) {
        self.options.request_type = request_type;
    }

    pub fn set_temperature(&mut self, temperature: Option<f32>) {
        self.options.temperature = temperature;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }

    /// Fill the active mode's text field (text, URL, or image caption).
    pub fn set_active_text(&mut self, value: impl Into<String>) {
        match self.mode {
            InputMode::Text => self.set_text(value),
            InputMode::Url => self.set_url(value),
            InputMode::Image => self.set_caption(value),
            InputMode::Audio => {}
        }
    }

    /// Attach captured media to its slot, replacing any previous one.
    pub fn attach(&mut self, media: EncodedMedia) -> Result<(), CaptureError> {
        let slot = match media.kind {
            MediaKind::Image => &mut self.image,
            MediaKind::Audio => &mut self.audio,
        };
        if !media.mime_type.starts_with(media.kind.mime_prefix()) {
            return Err(CaptureError::UnsupportedType {
                expected: media.kind.name(),
                found: media.mime_type,
            });
        }
        *slot = Some(media);
        Ok(())
    }

    /// Preview of the media attached for the active mode.
    pub fn preview(&self) -> Option<String> {
        match self.mode {
            InputMode::Image => self.image.as_ref().map(EncodedMedia::preview),
            InputMode::Audio => self.audio.as_ref().map(EncodedMedia::preview),
            InputMode::Text | InputMode::Url => None,
        }
    }

    /// Collect the active mode's input.
    pub fn input(&self) -> Result<AnalysisInput, ValidationError> {
        match self.mode {
            InputMode::Text => Ok(AnalysisInput::Text(self.text.clone())),
            InputMode::Url => Ok(AnalysisInput::Url(self.url.clone())),
            InputMode::Image => self
                .image
                .clone()
                .map(|media| AnalysisInput::Image {
                    media,
                    caption: self.caption.clone(),
                })
                .ok_or(ValidationError::MissingImage),
            InputMode::Audio => self
                .audio
                .clone()
                .map(AnalysisInput::Audio)
                .ok_or(ValidationError::MissingAudio),
        }
    }

    /// Validate, submit once, and record the outcome.
    ///
    /// Validation failures never reach `analyzer`.
    pub async fn submit(&mut self, analyzer: &dyn Analyzer) -> View {
        let request = match self
            .input()
            .and_then(|input| build_request(&input, self.options))
        {
            Ok(request) => request,
            Err(e) => {
                self.state = ClientState::Failure(ClientError::from(e).to_string());
                return self.view();
            }
        };

        self.state = ClientState::Submitting;
        let outcome = analyzer.analyze(&request).await;
        self.state = ClientState::finished(outcome);
        self.view()
    }
}
