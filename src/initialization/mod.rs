//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger with custom formatting
//! - HTTP client for harvester requests
//! - The upstream DNS resolver chain

mod client;
mod logger;
mod resolver;

// Re-export public API
pub use client::init_harvester_client;
pub use logger::init_logger_with;
pub use resolver::init_resolver_chain;
