//! Error handling and categorization.
//!
//! Defines the error taxonomies for initialization, database access, and
//! scan-fatal conditions. Per-stage transient errors (harvester HTTP
//! failures, single-resolver DNS failures, WHOIS hiccups) are handled where
//! they occur and never propagate past the scan engine.

mod types;

pub use types::{DatabaseError, HarvestError, InitializationError, ScanError};
