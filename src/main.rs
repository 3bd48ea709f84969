//! Entity chat client
//!
//! Entry point for the terminal chat client.

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use entity_chat::api::HttpBackend;
use entity_chat::config::{AppConfig, LogConfig};
use entity_chat::console::{Console, Exit};
use entity_chat::controller::ChatController;
use entity_chat::transcript::Transcript;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.log)?;

    let backend = HttpBackend::from_config(&config.server).context("Invalid server settings")?;

    info!(
        name: "client.config.loaded",
        chat_url = %backend.chat_url(),
        timeout_secs = ?config.server.request_timeout_secs,
        "Client configuration loaded"
    );

    let transcript = Transcript::with_welcome(&config.ui.welcome_message);
    let controller = ChatController::new(Arc::new(backend), transcript.clone())
        .with_process_listing(config.ui.list_processes_builtin);

    let exit = Console::new(controller)
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("Terminal I/O failed")?;

    info!(name: "client.exit", reason = ?exit, "Session ended");

    if let Some(path) = &config.ui.export_html {
        tokio::fs::write(path, transcript.to_html())
            .await
            .with_context(|| format!("Failed to write transcript to {path}"))?;
        info!(name: "client.transcript.exported", path = %path, "Transcript exported");
    }

    if exit == Exit::Interrupted {
        eprintln!("\nExiting Entity chat.");
    }

    Ok(())
}

/// Initialize tracing (M-LOG-STRUCTURED). Logs go to stderr so the
/// transcript on stdout stays readable.
fn init_tracing(log: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    let registry = tracing_subscriber::registry().with(filter);

    if log.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}
