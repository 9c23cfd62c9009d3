use std::path::PathBuf;

use clap::Parser;

use response_simulator::config::{load_config, validate_config, ConfigError, SimulatorConfig};
use response_simulator::lifecycle::startup;
use response_simulator::observability::logging;

#[derive(Parser)]
#[command(name = "response-simulator")]
#[command(version, about = "HTTP server that fabricates responses of a requested delay, header size and body size", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 127.0.0.1:8080)
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SimulatorConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "response-simulator starting");

    startup::run(config).await?;
    Ok(())
}
