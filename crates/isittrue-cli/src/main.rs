mod analyze;
mod interactive;
mod output;
mod recording;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use isittrue_client::RequestOptions;
use isittrue_config::ClientConfig;
use isittrue_types::RequestType;

#[derive(Parser)]
#[command(name = "isittrue", about = "Fact-check text, URLs, images and audio")]
struct Cli {
    /// Analysis server base URL (overrides config)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Config file to use instead of ~/.isittrue/config.json5
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options sent with every analysis request.
#[derive(Args, Clone, Default)]
struct RequestArgs {
    /// Analysis mode: fact_check, ai_detection or general_chat
    #[arg(short = 't', long = "type")]
    request_type: Option<RequestType>,

    /// Sampling temperature between 0 and 1
    #[arg(long)]
    temperature: Option<f32>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl RequestArgs {
    fn options(&self, config: &ClientConfig) -> RequestOptions {
        let defaults = RequestOptions::from_config(config);
        RequestOptions {
            request_type: self.request_type.or(defaults.request_type),
            temperature: self.temperature.or(defaults.temperature),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a piece of text
    Text {
        /// Text to analyze (words are joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// Analyze a web page by URL
    Url {
        /// URL to analyze
        url: String,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// Analyze an image file
    Image {
        /// Path to the image
        path: PathBuf,

        /// Question or context sent along with the image
        #[arg(short, long, default_value = "")]
        caption: String,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// Analyze an audio file or a microphone recording
    Audio {
        /// Path to an audio file (omit with --record)
        #[arg(required_unless_present = "record", conflicts_with = "record")]
        path: Option<PathBuf>,

        /// Record from the microphone instead of reading a file
        #[arg(short, long)]
        record: bool,

        /// Stop recording automatically after this many seconds
        #[arg(short, long, conflicts_with = "path")]
        duration: Option<u64>,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// Interactive form: switch modes, attach media, submit repeatedly
    Interactive {
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Check that the analysis server is reachable
    Health,
    /// Show or initialize the configuration
    Config {
        /// Write the effective configuration to ~/.isittrue/config.json5
        #[arg(long)]
        init: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => isittrue_config::load_config_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => isittrue_config::load_config().context("Failed to load config")?,
    };
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    tracing::debug!(
        "Server: {}, timeout: {}s",
        config.server_url,
        config.timeout_secs
    );
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries results only.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let succeeded = match cli.command {
        Commands::Text { text, request } => {
            let rt = tokio::runtime::Runtime::new()?;
            let input = analyze::Input::Text(text.join(" "));
            rt.block_on(analyze::run_analyze(&config, input, &request))?
        }
        Commands::Url { url, request } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(analyze::run_analyze(&config, analyze::Input::Url(url), &request))?
        }
        Commands::Image {
            path,
            caption,
            request,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            let input = analyze::Input::Image { path, caption };
            rt.block_on(analyze::run_analyze(&config, input, &request))?
        }
        Commands::Audio {
            path,
            record,
            duration,
            request,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            let input = match (record, path) {
                (true, _) => analyze::Input::Record {
                    duration: duration.map(std::time::Duration::from_secs),
                },
                (false, Some(path)) => analyze::Input::AudioFile(path),
                (false, None) => anyhow::bail!("Provide an audio file or use --record"),
            };
            rt.block_on(analyze::run_analyze(&config, input, &request))?
        }
        Commands::Interactive { request } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(interactive::run_interactive(
                &config,
                request.options(&config),
            ))?;
            true
        }
        Commands::Health => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(analyze::run_health(&config))?
        }
        Commands::Config { init } => {
            if init {
                let path = isittrue_config::save_config(&config)
                    .context("Failed to write config file")?;
                println!("Wrote {}", path.display());
            } else {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            true
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
