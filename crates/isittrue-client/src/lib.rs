//! isittrue-client: analysis client for the IsItTrue backend.
//!
//! Provides:
//! - Input validation (text, URL, image, audio) and request construction
//! - `POST /api/analyze` submission with response interpretation
//! - `GET /api/health` check
//! - An explicit client state (`Idle`, `Submitting`, `Success`, `Failure`)
//!   and a pure render function
//! - A form model with mode switching and reset

pub mod client;
pub mod error;
pub mod form;
pub mod input;
pub mod state;

pub use client::{ANALYZE_PATH, AnalysisClient, Analyzer, HEALTH_PATH, interpret_response};
pub use error::{ClientError, ValidationError};
pub use form::AnalysisForm;
pub use input::{AnalysisInput, InputMode, RequestOptions, build_request, validate_url};
pub use state::{ClientState, ResultView, View, render};
