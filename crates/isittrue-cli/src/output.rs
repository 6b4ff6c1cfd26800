//! Terminal rendering of client views.

use anyhow::Result;
use serde_json::json;

use isittrue_client::{ClientState, View};

/// Print a view: the result on stdout, everything else on stderr.
pub fn print_view(view: &View) {
    if view.loading {
        eprintln!("Analyzing...");
    }
    if let Some(result) = &view.result {
        println!("{}", result.text);
        if let Some(type_line) = &result.type_line {
            eprintln!("({type_line})");
        }
    }
    if let Some(error) = &view.error {
        print_error(error);
    }
}

pub fn print_error(message: &str) {
    eprintln!("Error: {message}");
}

/// JSON form of a finished state, in the endpoint's response shape.
pub fn state_json(state: &ClientState) -> serde_json::Value {
    match state {
        ClientState::Success(result) => json!(result),
        ClientState::Failure(message) => json!({ "error": message }),
        ClientState::Idle | ClientState::Submitting => json!({}),
    }
}

pub fn print_json(state: &ClientState) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&state_json(state))?);
    Ok(())
}

/// Text of a failure reported before anything was submitted.
fn failure_text(message: &str, as_json: bool) -> Result<String> {
    if as_json {
        let state = ClientState::Failure(message.to_string());
        Ok(serde_json::to_string_pretty(&state_json(&state))?)
    } else {
        Ok(format!("Error: {message}"))
    }
}

/// Report a failure: JSON on stdout with `--json`, plain text on stderr otherwise.
pub fn print_failure(message: &str, as_json: bool) -> Result<()> {
    let text = failure_text(message, as_json)?;
    if as_json {
        println!("{text}");
    } else {
        eprintln!("{text}");
    }
    Ok(())
}
