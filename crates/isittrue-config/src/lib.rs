use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use isittrue_types::RequestType;

/// Environment variable that overrides `server_url`.
pub const SERVER_URL_ENV: &str = "ISITTRUE_SERVER_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON5 parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("Config directory not found")]
    NoDirFound,
}

/// External command used to capture microphone audio.
///
/// The command must write the recording to stdout and stop cleanly when
/// interrupted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecorderConfig {
    /// Program to run (e.g. "arecord", "ffmpeg").
    #[serde(default = "default_recorder_program")]
    pub program: String,
    /// Arguments passed to the program.
    #[serde(default = "default_recorder_args")]
    pub args: Vec<String>,
    /// MIME type of the data written to stdout.
    #[serde(default = "default_recorder_mime")]
    pub mime_type: String,
}

fn default_recorder_program() -> String {
    "arecord".to_string()
}

fn default_recorder_args() -> Vec<String> {
    ["-q", "-f", "cd", "-t", "wav", "-"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_recorder_mime() -> String {
    "audio/wav".to_string()
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            program: default_recorder_program(),
            args: default_recorder_args(),
            mime_type: default_recorder_mime(),
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the analysis server.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Analysis mode sent with every request when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_type: Option<RequestType>,
    /// Sampling temperature sent with every request when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Largest image or audio file accepted for upload.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Microphone recorder command.
    #[serde(default)]
    pub recorder: RecorderConfig,
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    45
}

fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            timeout_secs: default_timeout_secs(),
            request_type: None,
            temperature: None,
            max_upload_bytes: default_max_upload_bytes(),
            recorder: RecorderConfig::default(),
        }
    }
}

/// Resolve the config directory (~/.isittrue/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".isittrue"))
        .ok_or(ConfigError::NoDirFound)
}

/// Resolve the config file path (~/.isittrue/config.json5).
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.json5"))
}

/// Load configuration from the default path, falling back to defaults.
///
/// `ISITTRUE_SERVER_URL` (from the environment or `.env`) overrides the
/// file's `server_url`.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let path = config_file_path()?;
    let mut config = load_config_from(&path)?;
    if let Ok(url) = std::env::var(SERVER_URL_ENV) {
        apply_server_override(&mut config, &url);
    }
    Ok(config)
}

/// Load configuration from a specific path, falling back to defaults if not found.
pub fn load_config_from(path: &Path) -> Result<ClientConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("Config file not found at {}, using defaults", path.display());
        return Ok(ClientConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: ClientConfig = json5::from_str(&content)?;
    Ok(config)
}

fn apply_server_override(config: &mut ClientConfig, url: &str) {
    let url = url.trim();
    if !url.is_empty() {
        tracing::debug!("Using server URL from {SERVER_URL_ENV}: {url}");
        config.server_url = url.to_string();
    }
}

/// Ensure the config directory exists.
pub fn ensure_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = config_dir()?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Save configuration to the default path.
pub fn save_config(config: &ClientConfig) -> Result<PathBuf, ConfigError> {
    let dir = ensure_config_dir()?;
    let path = dir.join("config.json5");
    save_config_to(config, &path)?;
    Ok(path)
}

/// Save configuration to a specific path as pretty JSON (valid JSON5).
pub fn save_config_to(config: &ClientConfig, path: &Path) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| ConfigError::Io(std::io::Error::other(e)))?;
    std::fs::write(path, content)?;
    Ok(())
}
