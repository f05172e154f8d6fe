//! Weatherbot binary - composition root.
//!
//! 1. Parse the command line and load configuration from TOML
//! 2. Initialise tracing
//! 3. Build the classifier, language model and weather clients
//! 4. Run the terminal shell or the HTTP server

mod cli;
mod repl;
mod wiring;

use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use weatherbot_api::{start_server, AppState};
use weatherbot_chat::SessionRegistry;
use weatherbot_core::WeatherbotConfig;

use crate::cli::{CliArgs, Command};
use crate::wiring::{build_controller, Secrets};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let config_path = args.resolve_config_path();

    // Loaded before the real subscriber so the configured level can apply;
    // a warn-level bootstrap subscriber reports a bad file.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_writer(std::io::stderr)
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || {
        if config_path.exists() {
            WeatherbotConfig::load_or_default(&config_path)
        } else {
            WeatherbotConfig::default()
        }
    });

    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Weatherbot v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(path = %config_path.display(), "Configuration resolved");

    match args.command() {
        Command::InitConfig { force } => init_config(&config_path, force)?,
        Command::Serve { .. } => {
            config.server.port = args.resolve_port(config.server.port);
            let controller = build_controller(&config, &Secrets::from_env())?;
            let registry = SessionRegistry::new(controller, config.chat.clone());
            let server_config = config.server.clone();
            start_server(&server_config, AppState::new(config, registry)).await?;
        }
        Command::Chat => {
            let controller = build_controller(&config, &Secrets::from_env())?;
            let registry = SessionRegistry::new(controller, config.chat.clone());
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            repl::run(&registry, stdin, tokio::io::stdout()).await?;
        }
    }

    Ok(())
}

/// Write the default configuration, refusing to clobber an existing file.
fn init_config(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        return Err(format!("{} already exists; pass --force to overwrite", path.display()).into());
    }
    WeatherbotConfig::default().save(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
