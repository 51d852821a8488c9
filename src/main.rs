use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_cu_quickparse::cli::{self, Cli};
use rust_cu_quickparse::config::Config;

/// Main entry point for the quick-parse tool.
///
/// Initializes tracing, loads configuration from the environment (and `.env`),
/// then runs a single analysis. Any error ends the process with a non-zero status.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_cu_quickparse=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let mut stdout = std::io::stdout();
    cli::run(&args, &config, &mut stdout).await?;

    Ok(())
}
