//! Microphone capture through an external recorder process.
//!
//! The recorder (e.g. `arecord`, `ffmpeg`, `sox`) writes audio to stdout. The
//! microphone is held for exactly as long as the child process lives: it is
//! released when recording stops, and the child is killed if a [`Recording`]
//! is dropped mid-way.

use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::data_url::encode_data_url;
use crate::types::{CaptureError, EncodedMedia, MediaKind, MediaSource};

/// Interval at which the elapsed-time callback fires while recording.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Command line of the external recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderCommand {
    pub program: String,
    pub args: Vec<String>,
    /// MIME type of the audio written to stdout.
    pub mime_type: String,
}

impl RecorderCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>, mime_type: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            mime_type: mime_type.into(),
        }
    }
}

/// Starts microphone recordings.
#[derive(Debug, Clone)]
pub struct Recorder {
    command: RecorderCommand,
}

impl Recorder {
    pub fn new(command: RecorderCommand) -> Self {
        Self { command }
    }

    /// Acquire the microphone and start recording.
    pub fn start(&self) -> Result<Recording, CaptureError> {
        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CaptureError::DeviceUnavailable(format!(
                    "failed to start '{}': {e}",
                    self.command.program
                ))
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let audio = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout {
                out.read_to_end(&mut buf).await?;
            }
            Ok(buf)
        });
        let diagnostics = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut err) = stderr {
                let _ = err.read_to_end(&mut buf).await;
            }
            String::from_utf8_lossy(&buf).trim().to_string()
        });

        tracing::info!("Recording started ({})", self.command.program);

        Ok(Recording {
            child,
            audio,
            diagnostics,
            started_at: Instant::now(),
            mime_type: self.command.mime_type.clone(),
        })
    }

    /// Record until `stop` is cancelled or the recorder exits on its own.
    ///
    /// `on_tick` receives the elapsed time roughly every 100ms.
    pub async fn record_until(
        &self,
        stop: CancellationToken,
        mut on_tick: impl FnMut(Duration) + Send,
    ) -> Result<EncodedMedia, CaptureError> {
        self.start()?.run_until(stop, on_tick).await
    }
}

/// An in-progress recording holding the microphone.
pub struct Recording {
    child: Child,
    audio: JoinHandle<std::io::Result<Vec<u8>>>,
    diagnostics: JoinHandle<String>,
    started_at: Instant,
    mime_type: String,
}

impl Recording {
    /// Time since recording started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Whether the recorder process has already exited.
    pub fn has_exited(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(Some(_)))
    }

    /// Keep recording until `stop` is cancelled or the recorder exits, then
    /// stop.
    pub async fn run_until(
        mut self,
        stop: CancellationToken,
        mut on_tick: impl FnMut(Duration) + Send,
    ) -> Result<EncodedMedia, CaptureError> {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = ticker.tick() => {
                    on_tick(self.elapsed());
                    if self.has_exited() {
                        break;
                    }
                }
            }
        }
        self.stop().await
    }

    /// Stop recording, release the microphone, and encode the captured audio.
    pub async fn stop(mut self) -> Result<EncodedMedia, CaptureError> {
        let elapsed = self.elapsed();
        let stopped_by_us = match self.child.try_wait() {
            Ok(Some(_)) => false,
            _ => {
                if let Err(e) = self.child.start_kill() {
                    tracing::debug!("Recorder kill failed: {e}");
                }
                true
            }
        };
        let status = self.child.wait().await.map_err(|e| {
            CaptureError::DeviceUnavailable(format!("failed to stop recorder: {e}"))
        })?;

        let data = match (&mut self.audio).await {
            Ok(Ok(data)) => data,
            Ok(Err(e)) => {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "failed to read recorder output: {e}"
                )));
            }
            Err(e) => {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "recorder output task failed: {e}"
                )));
            }
        };
        let diagnostics = (&mut self.diagnostics).await.unwrap_or_default();

        tracing::info!(
            "Recording stopped after {} ({} bytes)",
            format_elapsed(elapsed),
            data.len()
        );

        check_outcome(status, stopped_by_us, &data, diagnostics)?;

        Ok(EncodedMedia {
            kind: MediaKind::Audio,
            data_url: encode_data_url(&self.mime_type, &data),
            byte_len: data.len(),
            mime_type: self.mime_type.clone(),
            origin: "microphone".to_string(),
        })
    }
}

fn check_outcome(
    status: ExitStatus,
    stopped_by_us: bool,
    data: &[u8],
    diagnostics: String,
) -> Result<(), CaptureError> {
    if !data.is_empty() {
        return Ok(());
    }
    if !stopped_by_us && !status.success() {
        let reason = if diagnostics.is_empty() {
            format!("recorder exited with {status}")
        } else {
            diagnostics
        };
        return Err(CaptureError::DeviceUnavailable(reason));
    }
    Err(CaptureError::EmptyRecording)
}

/// Format a duration as `MM:SS`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// A recording bounded by a fixed duration, usable wherever a
/// [`MediaSource`] is expected.
pub struct TimedRecording {
    recorder: Recorder,
    duration: Duration,
}

impl TimedRecording {
    pub fn new(recorder: Recorder, duration: Duration) -> Self {
        Self { recorder, duration }
    }
}

#[async_trait]
impl MediaSource for TimedRecording {
    fn kind(&self) -> MediaKind {
        MediaKind::Audio
    }

    async fn capture(&self) -> Result<EncodedMedia, CaptureError> {
        let stop = CancellationToken::new();
        let timer = stop.clone();
        let duration = self.duration;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            timer.cancel();
        });
        let result = self.recorder.record_until(stop, |_| {}).await;
        handle.abort();
        result
    }
}
