//! gdforge entry point
//!
//! Resolves configuration (flags, `.env`, environment), initializes
//! logging, builds the Gemini client, and hands a fresh editor session to
//! the TUI. Nothing here holds state; once the TUI takes the terminal,
//! this crate's job is done.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gdforge_providers::{GeminiClient, GenerationSettings};
use gdforge_session::EditorSession;

/// gdforge - an AI-assisted GDScript scratchpad for the terminal
#[derive(Parser, Debug)]
#[command(name = "gdforge")]
#[command(about = "AI-assisted GDScript scratchpad editor for the terminal")]
#[command(
    long_about = "gdforge: an in-memory GDScript scratchpad with AI assistance.\n\nManage a small set of script files, ask Gemini to write or rewrite them,\nchat about the project, generate concept images, and paste runtime errors\nfor analysis. Nothing is persisted; a session dies with the process.\n\nThe API key is read from the environment (see --api-key-env); a .env file\nin the working directory is loaded first."
)]
#[command(version)]
#[command(author = "GDForge Contributors")]
struct Args {
    /// Model for code generation, chat, and error analysis
    #[arg(long)]
    model: Option<String>,

    /// Model for image generation
    #[arg(long)]
    image_model: Option<String>,

    /// Environment variable holding the Gemini API key
    #[arg(long, default_value = "GEMINI_API_KEY")]
    api_key_env: String,

    /// Override the API base URL (debugging and proxies)
    #[arg(long)]
    base_url: Option<String>,

    /// Log filter, e.g. "info" or "gdforge_session=debug"
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write logs to this file; without it logs are discarded, because
    /// the TUI owns the terminal
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // load .env before reading the environment
    dotenv::dotenv().ok();
    init_tracing(&args)?;

    let api_key = match std::env::var(&args.api_key_env) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => bail!(
            "No API key found. Set the {} environment variable (or put it in a .env file), \
             or point --api-key-env at the variable that holds your key.",
            args.api_key_env
        ),
    };

    let mut client = match &args.base_url {
        Some(url) => GeminiClient::with_base_url(api_key, url.clone())?,
        None => GeminiClient::new(api_key)?,
    };
    if let Some(model) = &args.model {
        client = client.with_text_model(model);
    }
    if let Some(model) = &args.image_model {
        client = client.with_image_model(model);
    }

    let session = EditorSession::new(GenerationSettings::default());

    tracing::info!("Starting gdforge");
    match gdforge_tui::run(session, Arc::new(client)).await {
        Ok(()) => {
            tracing::info!("gdforge exited cleanly");
            Ok(())
        }
        Err(e) => {
            tracing::error!("gdforge failed: {}", e);
            Err(e)
        }
    }
}

/// Initializes the global subscriber.
///
/// Logs go to `--log-file` when given and nowhere otherwise; stderr is
/// never used because the TUI is drawing there.
fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_new(&args.log_level)
        .with_context(|| format!("Invalid --log-level value: {}", args.log_level))?;

    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .init();
        }
    }
    Ok(())
}
