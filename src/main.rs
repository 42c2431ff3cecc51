//! Main application entry point (web server binary).
//!
//! This is a thin wrapper around the `subscout` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use subscout::config::{DB_PATH, DEFAULT_PORT, WORDLIST_DIR};
use subscout::initialization::init_logger_with;
use subscout::{run_server, Config, LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "subscout", version, about = "Subdomain discovery service")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Path to the SQLite database
    #[arg(long, default_value = DB_PATH)]
    db_path: PathBuf,

    /// Path to the wordlist files directory
    #[arg(long, default_value = WORDLIST_DIR)]
    wordlist_dir: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present (AI API key lives there)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    let config = Config {
        port: cli.port,
        db_path: cli.db_path,
        wordlist_dir: cli.wordlist_dir,
        log_level: cli.log_level,
        log_format: cli.log_format,
    };

    run_server(config).await
}
