//! subscout library: subdomain discovery engine and web interface
//!
//! This library discovers subdomains of an apex domain by combining passive
//! enumeration (certificate transparency, passive DNS) with optional
//! wordlist-driven brute force, resolves every candidate against a fallback
//! chain of public recursive resolvers, and enriches results with a
//! best-effort WHOIS registration date.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use subscout::scanner::{ScanOptions, Scanner};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner = Scanner::new(
//!     "example.com",
//!     ScanOptions {
//!         threads: 10,
//!         timeout: Duration::from_secs(5),
//!         wordlist_path: None,
//!     },
//! )?;
//! let results = scanner.scan().await?;
//! println!("discovered {} subdomains", results.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

pub mod config;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod jobs;
pub mod scanner;
pub mod server;
pub mod storage;
pub mod wordlists;

// Re-export the pieces embedders touch most often
pub use config::{Config, LogFormat, LogLevel};
pub use jobs::{run_job, run_job_with, JobRegistry, JobStatus, ScanJob};
pub use run::run_server;
pub use scanner::{ScanOptions, Scanner, SubdomainResult};
pub use server::{start_server, AppState};

// Internal run module (service assembly)
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::info;

    use crate::config::Config;
    use crate::jobs::JobRegistry;
    use crate::server::{start_server, AppState};
    use crate::storage::{init_db_pool, run_migrations};
    use crate::wordlists::{AiGenerator, WordlistRepository};

    /// Initializes storage, seeds the starter wordlist, and serves the web
    /// interface until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized, the wordlist
    /// directory cannot be created, or the listener fails to bind.
    pub async fn run_server(config: Config) -> Result<()> {
        tokio::fs::create_dir_all(&config.wordlist_dir)
            .await
            .with_context(|| format!("Failed to create {}", config.wordlist_dir.display()))?;

        let pool = init_db_pool(&config.db_path)
            .await
            .context("Failed to initialize database pool")?;
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        let wordlists = Arc::new(WordlistRepository::new(pool, &config.wordlist_dir));
        wordlists
            .seed_default()
            .await
            .context("Failed to seed starter wordlist")?;

        let ai = AiGenerator::from_env();
        if !ai.is_configured() {
            info!("AI wordlist generation disabled (no API key configured)");
        }

        let state = AppState {
            registry: Arc::new(JobRegistry::new()),
            wordlists,
            ai: Arc::new(ai),
        };

        info!("Starting subscout on http://localhost:{}", config.port);
        start_server(config.port, state).await
    }
}
