//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the
//! application, including the resolver fallback table, submission bounds,
//! and other operational parameters.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Recursive resolvers tried in order for every DNS query.
///
/// The order matters: the pool walks this table front to back and the first
/// resolver that answers `NOERROR` wins. Tests exercise the fallback by
/// swapping this table for scripted lookups.
pub const RESOLVER_CHAIN: [SocketAddr; 3] = [
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(8, 8, 8, 8), 53)),
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(1, 1, 1, 1), 53)),
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(9, 9, 9, 9), 53)),
];

/// Lower bound for concurrent resolver workers per job.
pub const MIN_THREADS: usize = 1;
/// Upper bound for concurrent resolver workers per job.
pub const MAX_THREADS: usize = 50;
/// Default resolver worker count when the submission omits it.
pub const DEFAULT_THREADS: usize = 10;

/// Lower bound for the per-query timeout in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;
/// Upper bound for the per-query timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 30;
/// Default per-query timeout in seconds when the submission omits it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// WHOIS lookups are skipped for names nested deeper than this many
/// dot-segments to protect the upstream provider from rate limiting.
pub const WHOIS_MAX_DEPTH: usize = 3;
/// Number of WHOIS attempts per name before giving up.
pub const WHOIS_ATTEMPTS: usize = 3;
/// Delay between WHOIS attempts in milliseconds.
pub const WHOIS_RETRY_DELAY_MS: u64 = 1000;
/// Sentinel reported when no registration date could be obtained.
pub const CREATION_DATE_UNAVAILABLE: &str = "Not available";

/// Certificate transparency search endpoint.
pub const CT_SEARCH_BASE_URL: &str = "https://crt.sh";
/// Passive DNS endpoint.
pub const PASSIVE_DNS_BASE_URL: &str = "https://www.virustotal.com";
/// Result page size requested from the passive DNS source.
pub const PASSIVE_DNS_PAGE_LIMIT: usize = 40;

/// Browser-shaped User-Agent for harvester requests.
///
/// The passive DNS source blocks default library user agents, so harvesters
/// present a browser string instead.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// AI wordlist generation request timeout in seconds.
pub const AI_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Default model for AI wordlist generation (overridable via `AI_MODEL`).
pub const AI_DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
/// Default messages endpoint (overridable via `AI_API_ENDPOINT`).
pub const AI_DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// Number of jobs returned by the recent-jobs listing.
pub const RECENT_JOBS_LIMIT: usize = 10;

/// Default SQLite database path.
pub const DB_PATH: &str = "./subscout.db";
/// Default directory holding wordlist files.
pub const WORDLIST_DIR: &str = "./wordlists";
/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 8080;
