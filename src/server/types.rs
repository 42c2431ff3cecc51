//! Web layer data structures.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::jobs::JobRegistry;
use crate::wordlists::{AiGenerator, WordlistRepository};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// In-memory job index.
    pub registry: Arc<JobRegistry>,
    /// Wordlist store.
    pub wordlists: Arc<WordlistRepository>,
    /// AI wordlist generator.
    pub ai: Arc<AiGenerator>,
}

/// Body of `POST /scan`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    /// Apex domain to scan. Scheme, `www.` prefix, and paths are stripped.
    pub domain: String,
    /// Wordlist to drive the brute-force stage, if any.
    #[serde(default)]
    pub wordlist_id: Option<Uuid>,
    /// Resolver pool concurrency (1–50).
    #[serde(default)]
    pub threads: Option<usize>,
    /// Per-query timeout in seconds (1–30).
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Response of `POST /scan`.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// Id of the accepted job.
    pub id: Uuid,
}

/// Body of `POST /wordlists`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWordlistRequest {
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
    /// Wordlist content, one label per line.
    pub content: String,
}
