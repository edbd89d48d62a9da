//! cfp-sessions - conference session cache tool
//!
//! Warms the session snapshot used by the site build and inspects cached
//! sessions from the command line.

use anyhow::{Context, Result};
use cfp_common::config::{
    default_config_path, load_toml_config, resolve_data_dir, write_toml_config, LoggingConfig,
    TomlConfig,
};
use cfp_sessions::{build_cache, CacheState, SubmissionCategory};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cfp-sessions", version, about = "Conference session cache")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the session snapshot
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load or generate the session snapshot and report the cache state
    Warm,
    /// Print one session as JSON
    Get {
        /// Session code
        code: String,
    },
    /// Print cached sessions as JSON
    List {
        /// Only sessions of this category (talk, special, poster, community-poster)
        #[arg(long)]
        category: Option<SubmissionCategory>,
    },
    /// Write a config file with default values
    InitConfig {
        /// Destination (defaults to the platform config directory)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let toml_config = load_toml_config(cli.config.as_deref())?;
    init_tracing(&toml_config.logging)?;

    info!("Starting cfp-sessions v{}", env!("CARGO_PKG_VERSION"));

    if let Command::InitConfig { path, force } = &cli.command {
        let path = path
            .clone()
            .or_else(default_config_path)
            .context("Could not determine config directory, pass --path")?;
        if path.exists() && !force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }
        write_toml_config(&TomlConfig::default(), &path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let data_dir = resolve_data_dir(cli.data_dir.as_deref(), &toml_config);
    info!("Data directory: {}", data_dir.display());

    let cache = build_cache(&toml_config, &data_dir)?;

    match cli.command {
        Command::Warm => match cache.warm().await {
            CacheState::Ready { sessions } => {
                println!("ready: {} sessions", sessions);
            }
            CacheState::Degraded { reason } => {
                warn!("Cache degraded: {}", reason);
                println!("degraded: {}", reason);
            }
            CacheState::Uninitialized => println!("uninitialized"),
        },
        Command::Get { code } => match cache.get_session(&code).await {
            Some(talk) => println!("{}", serde_json::to_string_pretty(&talk)?),
            None => anyhow::bail!("Session {} not found", code),
        },
        Command::List { category } => {
            let talks = match category {
                Some(category) => cache.get_sessions_by_category(category).await,
                None => cache.get_all_sessions().await,
            };
            println!("{}", serde_json::to_string_pretty(&talks)?);
        }
        Command::InitConfig { .. } => {}
    }

    Ok(())
}
