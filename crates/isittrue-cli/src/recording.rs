use std::io::Write;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use isittrue_config::ClientConfig;
use isittrue_media::{CaptureError, EncodedMedia, Recorder, RecorderCommand, format_elapsed};

pub fn recorder_from_config(config: &ClientConfig) -> Recorder {
    let rc = &config.recorder;
    Recorder::new(RecorderCommand::new(
        rc.program.clone(),
        rc.args.clone(),
        rc.mime_type.clone(),
    ))
}

/// Record until the user presses Enter, showing the elapsed time.
pub async fn record_interactive(recorder: &Recorder) -> Result<EncodedMedia, CaptureError> {
    record_with_trigger(recorder, |stop| {
        tokio::task::spawn_blocking(move || {
            let mut line = String::new();
            let _ = std::io::stdin().read_line(&mut line);
            stop.cancel();
        })
    })
    .await
}

/// Start the recorder, then hand `trigger` the token that stops it.
///
/// The trigger is only armed once the microphone is held, so a recorder that
/// fails to start is reported straight away.
async fn record_with_trigger<F>(recorder: &Recorder, trigger: F) -> Result<EncodedMedia, CaptureError>
where
    F: FnOnce(CancellationToken) -> JoinHandle<()>,
{
    let recording = recorder.start()?;
    let stop = CancellationToken::new();
    let waiter = trigger(stop.clone());

    eprintln!("Recording... press Enter to stop.");
    let result = recording
        .run_until(stop.clone(), |elapsed| {
            eprint!("\r● {}", format_elapsed(elapsed));
            let _ = std::io::stderr().flush();
        })
        .await;
    eprintln!();

    // The recorder can exit on its own; the pending stdin read must still
    // finish so it doesn't swallow the next line of input.
    if !stop.is_cancelled() {
        eprintln!("Recorder stopped. Press Enter to continue.");
    }
    let _ = waiter.await;

    result
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn sh(script: &str) -> Recorder {
        Recorder::new(RecorderCommand::new(
            "sh",
            vec!["-c".to_string(), script.to_string()],
            "audio/wav",
        ))
    }

    #[tokio::test]
    async fn test_failed_start_does_not_wait_for_enter() {
        let recorder = Recorder::new(RecorderCommand::new(
            "definitely-not-a-recorder-binary",
            vec![],
            "audio/wav",
        ));
        let mut armed = false;
        let result = record_with_trigger(&recorder, |_| {
            armed = true;
            tokio::spawn(async {})
        })
        .await;
        assert!(matches!(result, Err(CaptureError::DeviceUnavailable(_))));
        assert!(!armed);
    }

    #[tokio::test]
    async fn test_trigger_stops_recording() {
        let media = record_with_trigger(&sh("printf abc; exec sleep 30"), |stop| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                stop.cancel();
            })
        })
        .await
        .unwrap();
        assert_eq!(media.byte_len, 3);
    }
}
