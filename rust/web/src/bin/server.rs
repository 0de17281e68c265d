//! Card Party server binary
//!
//! Usage: cargo run -p cardparty_web --bin cardparty-server -- --port 8080

use cardparty_web::config::{self, ServerArgs};
use cardparty_web::{init_logging, WebServer};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ServerArgs::parse();
    let resolved = config::load_with_sources(&args)?;
    let format = init_logging()?;

    let settings = resolved.settings;
    let sources = resolved.sources;
    tracing::info!(log_format = ?format, "starting card party server");
    tracing::info!(value = %settings.host, source = ?sources.host, "host");
    tracing::info!(value = settings.port, source = ?sources.port, "port");
    tracing::info!(value = ?settings.seed, source = ?sources.seed, "seed");
    tracing::info!(value = settings.max_players, source = ?sources.max_players, "max_players");
    tracing::info!(value = %settings.ai_strategy, source = ?sources.ai_strategy, "ai_strategy");
    tracing::info!(value = settings.ai_think_ms, source = ?sources.ai_think_ms, "ai_think_ms");
    tracing::info!(value = settings.ai_timeout_ms, source = ?sources.ai_timeout_ms, "ai_timeout_ms");
    tracing::info!(value = settings.autoplay, source = ?sources.autoplay, "autoplay");
    tracing::info!(value = ?settings.journal_path, source = ?sources.journal_path, "journal_path");

    let server = WebServer::new(settings)?;
    let handle = server.start().await?;
    println!("Server running at http://{}", handle.address());
    println!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down");
    handle.shutdown().await?;
    Ok(())
}
