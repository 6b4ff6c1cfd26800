use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use isittrue_client::{AnalysisClient, AnalysisForm, ClientState, InputMode, RequestOptions, render};
use isittrue_config::ClientConfig;
use isittrue_media::{FileSource, MediaKind, MediaSource};
use isittrue_types::RequestType;

use crate::output;
use crate::recording;

const HELP: &str = "\
Commands:
  :text                 switch to text mode
  :url                  switch to URL mode
  :image [path]         switch to image mode, optionally loading a file
  :audio [path]         switch to audio mode, optionally loading a file
  :record               switch to audio mode and record from the microphone
  :type <mode|none>     fact_check, ai_detection or general_chat
  :temp <0..1|none>     sampling temperature
  :send                 submit the current input
  :reset                clear all fields and results
  :help                 show this help
  :quit                 exit
Any other line fills the current field (text, URL or image caption) and submits.";

/// One line of interactive input.
#[derive(Debug, PartialEq)]
enum Command {
    Mode(InputMode),
    Load(MediaKind, PathBuf),
    Record,
    SetType(Option<RequestType>),
    SetTemperature(Option<f32>),
    Send,
    Reset,
    Help,
    Quit,
    Input(String),
    Invalid(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let Some(rest) = line.strip_prefix(':') else {
        return if line.is_empty() {
            Command::Send
        } else {
            Command::Input(line.to_string())
        };
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match (name, arg) {
        ("text", _) => Command::Mode(InputMode::Text),
        ("url", _) => Command::Mode(InputMode::Url),
        ("image", "") => Command::Mode(InputMode::Image),
        ("image", path) => Command::Load(MediaKind::Image, PathBuf::from(path)),
        ("audio", "") => Command::Mode(InputMode::Audio),
        ("audio", path) => Command::Load(MediaKind::Audio, PathBuf::from(path)),
        ("record", _) => Command::Record,
        ("type", "none") => Command::SetType(None),
        ("type", value) => match value.parse() {
            Ok(rt) => Command::SetType(Some(rt)),
            Err(e) => Command::Invalid(e),
        },
        ("temp", "none") => Command::SetTemperature(None),
        ("temp", value) => match value.parse::<f32>() {
            Ok(t) if (0.0..=1.0).contains(&t) => Command::SetTemperature(Some(t)),
            _ => Command::Invalid(format!("temperature must be a number between 0 and 1, got '{value}'")),
        },
        ("send", _) => Command::Send,
        ("reset", _) => Command::Reset,
        ("help", _) => Command::Help,
        ("quit" | "exit" | "q", _) => Command::Quit,
        (other, _) => Command::Invalid(format!("unknown command ':{other}' (try :help)")),
    }
}

fn describe_options(options: RequestOptions) -> String {
    let rt = options
        .request_type
        .map(|t| t.label().to_string())
        .unwrap_or_else(|| "server default".to_string());
    let temp = options
        .temperature
        .map(|t| format!("{:.0}%", t * 100.0))
        .unwrap_or_else(|| "server default".to_string());
    format!("type: {rt}, temperature: {temp}")
}

async fn load(form: &mut AnalysisForm, config: &ClientConfig, kind: MediaKind, path: PathBuf) {
    let mode = match kind {
        MediaKind::Image => InputMode::Image,
        MediaKind::Audio => InputMode::Audio,
    };
    form.switch_mode(mode);
    let source = FileSource::new(path, kind, config.max_upload_bytes);
    match source.capture().await.and_then(|media| form.attach(media)) {
        Ok(()) => {
            if let Some(preview) = form.preview() {
                eprintln!("Attached {preview}");
            }
        }
        Err(e) => output::print_error(&e.to_string()),
    }
}

async fn submit(form: &mut AnalysisForm, client: &AnalysisClient) {
    output::print_view(&render(&ClientState::Submitting));
    let view = form.submit(client).await;
    output::print_view(&view);
    println!();
}

/// Run the interactive analysis form.
pub async fn run_interactive(config: &ClientConfig, options: RequestOptions) -> Result<()> {
    let client = AnalysisClient::from_config(config).context("Failed to create client")?;
    let recorder = recording::recorder_from_config(config);
    let mut form = AnalysisForm::new(options);

    println!("isittrue (server: {})", config.server_url);
    println!("{}", describe_options(form.options()));
    println!("Type :help for commands, :quit or Ctrl+D to exit.\n");

    let stdin = io::stdin();
    loop {
        print!("[{}]> ", form.mode());
        io::stdout().flush()?;

        let mut line = String::new();
        let bytes = stdin.lock().read_line(&mut line)?;
        if bytes == 0 {
            // EOF (Ctrl+D)
            println!();
            break;
        }

        match parse_command(&line) {
            Command::Mode(mode) => form.switch_mode(mode),
            Command::Load(kind, path) => load(&mut form, config, kind, path).await,
            Command::Record => {
                form.switch_mode(InputMode::Audio);
                match recording::record_interactive(&recorder)
                    .await
                    .and_then(|media| form.attach(media))
                {
                    Ok(()) => {
                        if let Some(preview) = form.preview() {
                            eprintln!("Recorded {preview}. Press Enter to analyze.");
                        }
                    }
                    Err(e) => output::print_error(&e.to_string()),
                }
            }
            Command::SetType(rt) => {
                form.set_request_type(rt);
                eprintln!("{}", describe_options(form.options()));
            }
            Command::SetTemperature(t) => {
                form.set_temperature(t);
                eprintln!("{}", describe_options(form.options()));
            }
            Command::Send => submit(&mut form, &client).await,
            Command::Input(text) => {
                if form.mode() == InputMode::Audio {
                    output::print_error("Audio mode takes no text; use :record, :audio <path> or :send");
                    continue;
                }
                form.set_active_text(text);
                submit(&mut form, &client).await;
            }
            Command::Reset => {
                form.reset();
                eprintln!("Cleared.");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Invalid(message) => output::print_error(&message),
        }
    }

    println!("Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_and_send() {
        assert_eq!(
            parse_command("The sky is green\n"),
            Command::Input("The sky is green".into())
        );
        assert_eq!(parse_command("   \n"), Command::Send);
        assert_eq!(parse_command(":send"), Command::Send);
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!(parse_command(":url"), Command::Mode(InputMode::Url));
        assert_eq!(parse_command(":image"), Command::Mode(InputMode::Image));
        assert_eq!(
            parse_command(":image  /tmp/my photo.png "),
            Command::Load(MediaKind::Image, PathBuf::from("/tmp/my photo.png"))
        );
        assert_eq!(
            parse_command(":audio memo.ogg"),
            Command::Load(MediaKind::Audio, PathBuf::from("memo.ogg"))
        );
        assert_eq!(parse_command(":record"), Command::Record);
    }

    #[test]
    fn test_parse_options() {
        assert_eq!(
            parse_command(":type ai_detection"),
            Command::SetType(Some(RequestType::AiDetection))
        );
        assert_eq!(parse_command(":type none"), Command::SetType(None));
        assert!(matches!(parse_command(":type poem"), Command::Invalid(_)));
        assert_eq!(parse_command(":temp 0.3"), Command::SetTemperature(Some(0.3)));
        assert!(matches!(parse_command(":temp 2"), Command::Invalid(_)));
        assert!(matches!(parse_command(":temp hot"), Command::Invalid(_)));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_command(":reset"), Command::Reset);
        assert_eq!(parse_command(":q"), Command::Quit);
        assert_eq!(parse_command(":exit"), Command::Quit);
        assert!(matches!(parse_command(":bogus"), Command::Invalid(_)));
    }

    #[test]
    fn test_describe_options() {
        assert_eq!(
            describe_options(RequestOptions::default()),
            "type: server default, temperature: server default"
        );
        let options = RequestOptions {
            request_type: Some(RequestType::FactCheck),
            temperature: Some(0.4),
        };
        assert_eq!(describe_options(options), "type: ✓ Fact-Check, temperature: 40%");
    }
}
