mod config;
mod jellyfin;
mod logging;
mod model;
mod ports;
mod services;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    config::Config,
    jellyfin::JellyfinClient,
    logging::setup_logging,
    services::{orchestrator::RebuildOrchestrator, process_runner::TokioProcessRunner},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "MIX_FOLLOWER_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level (default: info)
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "MIX_FOLLOWER_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one rebuild batch over all configured generator commands
    Rebuild {
        /// Base URL of the media server
        #[arg(short, long, env = "MIX_FOLLOWER_SERVER_URL")]
        server_url: Url,

        /// API key for the media server
        #[arg(short, long, env = "MIX_FOLLOWER_API_KEY")]
        api_key: String,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    match args.command {
        Commands::Rebuild {
            server_url,
            api_key,
        } => {
            let config = {
                if let Some(config) = args.config {
                    Config::from_file(&config)
                } else {
                    Config::load()
                }
            }
            .with_context(|| "Failed to load mix-follower config")?;

            let client = Arc::new(JellyfinClient::new(server_url, api_key));
            let orchestrator = RebuildOrchestrator::new(
                &config,
                client.clone(),
                client.clone(),
                client,
                Arc::new(TokioProcessRunner),
            )
            .await?;

            let cancel = CancellationToken::new();
            let interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupt received, cancelling rebuild");
                    interrupt.cancel();
                }
            });

            orchestrator.run(&cancel).await?;
            log::info!("Rebuild batch completed");
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                log::info!("Config file at {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}
