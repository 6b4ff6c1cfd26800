//! Client state and its rendering.

use isittrue_types::AnalysisResult;

use crate::error::ClientError;

/// Lifecycle of a single submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClientState {
    #[default]
    Idle,
    Submitting,
    Success(AnalysisResult),
    Failure(String),
}

impl ClientState {
    /// State after a submission finishes.
    pub fn finished(outcome: Result<AnalysisResult, ClientError>) -> Self {
        match outcome {
            Ok(result) => ClientState::Success(result),
            Err(e) => ClientState::Failure(e.to_string()),
        }
    }
}

/// A rendered result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    /// Result text, verbatim.
    pub text: String,
    /// `Type: <label>` line, when the backend reported a type.
    pub type_line: Option<String>,
}

/// Which regions of the UI are visible, and with what content.
///
/// At most one of `loading`, `result` and `error` is shown at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub loading: bool,
    pub result: Option<ResultView>,
    pub error: Option<String>,
}

impl View {
    pub fn is_empty(&self) -> bool {
        !self.loading && self.result.is_none() && self.error.is_none()
    }
}

/// Map a state to the visible UI regions.
pub fn render(state: &ClientState) -> View {
    match state {
        ClientState::Idle => View::default(),
        ClientState::Submitting => View {
            loading: true,
            ..Default::default()
        },
        ClientState::Success(result) => View {
            result: Some(ResultView {
                text: result.result.clone(),
                type_line: result.type_label().map(|label| format!("Type: {label}")),
            }),
            ..Default::default()
        },
        ClientState::Failure(message) => View {
            error: Some(message.clone()),
            ..Default::default()
        },
    }
}
