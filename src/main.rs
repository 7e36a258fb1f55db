use std::sync::Arc;
use tracing::info;

use murmur::bus::EventBus;
use murmur::config::AppConfig;
use murmur::controller::SessionController;
use murmur::directory::{ChatDirectory, StaticDirectory};
use murmur::interface::terminal::TerminalInterface;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the subscriber so RUST_LOG from it is honoured
    let dotenv = dotenvy::dotenv();

    // Initialize logging with default filter if RUST_LOG is not set.
    // Logs go to stderr so they don't interleave with the conversation.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenv {
        // It's not fatal if .env doesn't exist
        info!("No .env file found or failed to load: {}", e);
    }

    info!("murmur starting...");

    let config = AppConfig::load()?;

    let directory: Arc<dyn ChatDirectory> = match &config.directory_path {
        Some(path) => {
            info!("Loading chat directory from {}", path.display());
            Arc::new(StaticDirectory::from_file(path)?)
        }
        None => {
            info!("No chat directory configured, starting with an empty list.");
            Arc::new(StaticDirectory::default())
        }
    };

    let bus = Arc::new(EventBus::new());
    let controller = SessionController::new(config.session(), directory.clone(), bus.clone());

    TerminalInterface::new(bus, directory).run(controller).await
}
