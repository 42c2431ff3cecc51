//! Error type definitions.
//!
//! This module defines the error taxonomies used throughout the application.
//! Transient failures (single-resolver errors, harvester HTTP failures,
//! WHOIS hiccups) are recovered locally and never surface here; these types
//! cover initialization failures, database failures, and the few conditions
//! that are fatal to a scan job.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Filesystem error while managing wordlist files.
    #[error("Wordlist file error: {0}")]
    FileError(#[from] std::io::Error),

    /// A stored row could not be interpreted.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

/// Errors that are fatal to a scan job.
///
/// Anything not listed here is absorbed inside the scan engine: harvester
/// failures are logged and skipped, per-query DNS failures fall back to the
/// next resolver, and WHOIS failures map to a sentinel value.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The configured wordlist could not be opened or read.
    #[error("wordlist {} is unreadable: {source}", path.display())]
    WordlistUnreadable {
        /// Path to the wordlist that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The resolver pool shut down before all work units could be scheduled.
    #[error("resolver pool closed before scheduling completed")]
    PoolClosed,

    /// The result aggregator task died before draining all workers.
    #[error("result aggregation failed: {0}")]
    AggregationFailed(String),
}

/// Classification of a harvester failure.
///
/// All harvester failures are non-fatal to the job; this classification
/// exists so they can be logged meaningfully.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// The outbound request failed at the transport level.
    #[error("request failed: {0}")]
    Network(#[from] ReqwestError),

    /// The source answered with a non-2xx status.
    #[error("received non-success response: {0}")]
    Status(reqwest::StatusCode),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_wordlist_message_names_path() {
        let err = ScanError::WordlistUnreadable {
            path: PathBuf::from("/nonexistent/words.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/words.txt"));
        assert!(msg.contains("unreadable"));
    }

    #[test]
    fn test_harvest_error_status_message() {
        let err = HarvestError::Status(reqwest::StatusCode::TOO_MANY_REQUESTS);
        assert!(err.to_string().contains("429"));
    }
}
