use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use isittrue_client::{AnalysisClient, AnalysisForm, ClientState, InputMode, render};
use isittrue_config::ClientConfig;
use isittrue_media::{FileSource, MediaSource, TimedRecording};

use crate::RequestArgs;
use crate::output;
use crate::recording;

/// Input for a one-shot analysis.
pub enum Input {
    Text(String),
    Url(String),
    Image { path: PathBuf, caption: String },
    AudioFile(PathBuf),
    Record { duration: Option<Duration> },
}

/// Run a single analysis and print the outcome.
///
/// Returns `false` when the analysis failed (the error has been printed).
pub async fn run_analyze(config: &ClientConfig, input: Input, args: &RequestArgs) -> Result<bool> {
    let client = AnalysisClient::from_config(config).context("Failed to create client")?;
    let mut form = AnalysisForm::new(args.options(config));

    match input {
        Input::Text(text) => form.set_text(text),
        Input::Url(url) => {
            form.switch_mode(InputMode::Url);
            form.set_url(url);
        }
        Input::Image { path, caption } => {
            form.switch_mode(InputMode::Image);
            let source = FileSource::image(path, config.max_upload_bytes);
            if !attach(&mut form, &source, args.json).await? {
                return Ok(false);
            }
            form.set_caption(caption);
        }
        Input::AudioFile(path) => {
            form.switch_mode(InputMode::Audio);
            let source = FileSource::audio(path, config.max_upload_bytes);
            if !attach(&mut form, &source, args.json).await? {
                return Ok(false);
            }
        }
        Input::Record { duration } => {
            form.switch_mode(InputMode::Audio);
            let recorder = recording::recorder_from_config(config);
            let captured = match duration {
                Some(duration) => {
                    eprintln!("Recording for {}s...", duration.as_secs());
                    TimedRecording::new(recorder, duration).capture().await
                }
                None => recording::record_interactive(&recorder).await,
            };
            if let Err(e) = captured.and_then(|media| form.attach(media)) {
                output::print_failure(&e.to_string(), args.json)?;
                return Ok(false);
            }
        }
    }

    if let Some(preview) = form.preview() {
        eprintln!("Attached {preview}");
    }
    output::print_view(&render(&ClientState::Submitting));
    let view = form.submit(&client).await;
    if args.json {
        output::print_json(form.state())?;
    } else {
        output::print_view(&view);
    }
    Ok(view.error.is_none())
}

async fn attach(form: &mut AnalysisForm, source: &dyn MediaSource, as_json: bool) -> Result<bool> {
    match source.capture().await.and_then(|media| form.attach(media)) {
        Ok(()) => Ok(true),
        Err(e) => {
            output::print_failure(&e.to_string(), as_json)?;
            Ok(false)
        }
    }
}

/// Check the server's health endpoint.
pub async fn run_health(config: &ClientConfig) -> Result<bool> {
    let client = AnalysisClient::from_config(config).context("Failed to create client")?;
    match client.health().await {
        Ok(status) if status.is_ok() => {
            println!("isittrue server is healthy");
            println!("  server: {}", config.server_url);
            println!("  endpoint: {}", client.analyze_url());
            Ok(true)
        }
        Ok(status) => {
            output::print_error(&format!("Server reported status '{}'", status.status));
            Ok(false)
        }
        Err(e) => {
            output::print_error(&e.to_string());
            Ok(false)
        }
    }
}
