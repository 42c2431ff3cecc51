//! HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use uuid::Uuid;

use crate::config::{
    DEFAULT_THREADS, DEFAULT_TIMEOUT_SECS, MAX_THREADS, MAX_TIMEOUT_SECS, MIN_THREADS,
    MIN_TIMEOUT_SECS, RECENT_JOBS_LIMIT,
};
use crate::export::results_to_csv_string;
use crate::jobs::{run_job, JobStatus, ScanJob};
use crate::wordlists::{AiError, GenerationRequest, WordlistSource};

use super::types::{AppState, CreateWordlistRequest, ScanRequest, SubmitResponse};

/// Accepts a scan submission and launches the job asynchronously.
pub async fn submit_scan(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Response {
    let domain = clean_domain(&request.domain);
    if let Err(reason) = validate_domain(&domain) {
        return (StatusCode::BAD_REQUEST, reason).into_response();
    }

    let threads = request.threads.unwrap_or(DEFAULT_THREADS);
    let timeout_seconds = request.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if let Err(reason) = validate_limits(threads, timeout_seconds) {
        return (StatusCode::BAD_REQUEST, reason).into_response();
    }

    let wordlist_path = match request.wordlist_id {
        Some(id) => match state.wordlists.get(&id).await {
            Ok(Some(wordlist)) => Some(state.wordlists.file_path(&wordlist)),
            Ok(None) => {
                return (StatusCode::BAD_REQUEST, format!("unknown wordlist: {id}"))
                    .into_response()
            }
            Err(e) => {
                error!("wordlist lookup failed: {e}");
                return (StatusCode::INTERNAL_SERVER_ERROR, "wordlist lookup failed")
                    .into_response();
            }
        },
        None => None,
    };

    let job = Arc::new(ScanJob::new(
        domain,
        wordlist_path,
        threads,
        Duration::from_secs(timeout_seconds),
    ));
    state.registry.insert(Arc::clone(&job));

    let id = job.id;
    tokio::spawn(run_job(job));

    (StatusCode::ACCEPTED, Json(SubmitResponse { id })).into_response()
}

/// Lists recent jobs, newest first.
pub async fn list_jobs(State(state): State<AppState>) -> Response {
    let jobs: Vec<_> = state
        .registry
        .recent(RECENT_JOBS_LIMIT)
        .iter()
        .map(|job| job.snapshot(false))
        .collect();
    Json(jobs).into_response()
}

/// Returns a job's status and, once completed, its results.
pub async fn get_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.registry.get(&id) {
        Some(job) => Json(job.snapshot(true)).into_response(),
        None => (StatusCode::NOT_FOUND, "Job not found").into_response(),
    }
}

/// Serves a completed job's results as a CSV download.
pub async fn export_job_csv(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let Some(job) = state.registry.get(&id) else {
        return (StatusCode::NOT_FOUND, "Job not found").into_response();
    };
    if job.status() != JobStatus::Completed {
        return (StatusCode::BAD_REQUEST, "Job not completed").into_response();
    }

    let csv = match results_to_csv_string(&job.results()) {
        Ok(csv) => csv,
        Err(e) => {
            error!("CSV export failed for job {id}: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "CSV export failed").into_response();
        }
    };

    let disposition = format!("attachment; filename={}-subdomains.csv", job.domain);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response()
}

/// Lists stored wordlists, newest first.
pub async fn list_wordlists(State(state): State<AppState>) -> Response {
    match state.wordlists.list().await {
        Ok(wordlists) => Json(wordlists).into_response(),
        Err(e) => {
            error!("wordlist listing failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "wordlist listing failed").into_response()
        }
    }
}

/// Stores an uploaded wordlist.
pub async fn create_wordlist(
    State(state): State<AppState>,
    Json(request): Json<CreateWordlistRequest>,
) -> Response {
    if request.name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "name is required").into_response();
    }
    if crate::wordlists::count_entries(&request.content) == 0 {
        return (StatusCode::BAD_REQUEST, "wordlist has no usable entries").into_response();
    }

    match state
        .wordlists
        .create_from_content(
            request.name.trim(),
            &request.description,
            &request.content,
            WordlistSource::Upload,
            None,
        )
        .await
    {
        Ok(wordlist) => (StatusCode::CREATED, Json(wordlist)).into_response(),
        Err(e) => {
            error!("wordlist creation failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "wordlist creation failed").into_response()
        }
    }
}

/// Deletes a wordlist and its file.
pub async fn delete_wordlist(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.wordlists.delete(&id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Wordlist not found").into_response(),
        Err(e) => {
            error!("wordlist deletion failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "wordlist deletion failed").into_response()
        }
    }
}

/// Generates a wordlist with the AI backend and stores it.
pub async fn generate_wordlist(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Response {
    if request.wordlist_name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "wordlistName is required").into_response();
    }

    let (labels, prompt) = match state.ai.generate(&request).await {
        Ok(generated) => generated,
        Err(AiError::NotConfigured) => {
            return (StatusCode::BAD_REQUEST, AiError::NotConfigured.to_string())
                .into_response()
        }
        Err(e @ AiError::Api { .. }) | Err(e @ AiError::EmptyResponse) => {
            error!("AI generation failed: {e}");
            return (StatusCode::BAD_GATEWAY, "AI generation failed").into_response();
        }
        Err(e) => {
            error!("AI generation failed: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "AI generation failed").into_response();
        }
    };

    let metadata = json!({
        "companyName": request.company_name,
        "targetDomain": request.target_domain,
        "model": state.ai.model(),
        "promptUsed": prompt,
    });

    match state
        .wordlists
        .create_from_content(
            request.wordlist_name.trim(),
            &format!("AI-generated wordlist for {}", request.company_name),
            &labels.join("\n"),
            WordlistSource::Ai,
            Some(metadata),
        )
        .await
    {
        Ok(wordlist) => (StatusCode::CREATED, Json(wordlist)).into_response(),
        Err(e) => {
            error!("storing generated wordlist failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storing generated wordlist failed",
            )
                .into_response()
        }
    }
}

/// Strips scheme, `www.` prefix, and path/query parts from a raw domain.
pub(crate) fn clean_domain(raw: &str) -> String {
    let mut domain = raw.trim();
    domain = domain.strip_prefix("http://").unwrap_or(domain);
    domain = domain.strip_prefix("https://").unwrap_or(domain);
    domain = domain.strip_prefix("www.").unwrap_or(domain);
    let domain = match domain.find(['/', '?', '#']) {
        Some(i) => &domain[..i],
        None => domain,
    };
    domain.trim_end_matches('/').to_lowercase()
}

/// Rejects apexes the engine must never see.
fn validate_domain(domain: &str) -> Result<(), String> {
    if domain.is_empty() {
        return Err("domain is required".to_string());
    }
    if domain.contains('*') || domain.contains(char::is_whitespace) || !domain.contains('.') {
        return Err(format!("invalid domain: {domain}"));
    }
    Ok(())
}

/// Enforces submission bounds; out-of-range values are rejected, not clamped.
fn validate_limits(threads: usize, timeout_seconds: u64) -> Result<(), String> {
    if !(MIN_THREADS..=MAX_THREADS).contains(&threads) {
        return Err(format!(
            "threads must be between {MIN_THREADS} and {MAX_THREADS}, got {threads}"
        ));
    }
    if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&timeout_seconds) {
        return Err(format!(
            "timeout must be between {MIN_TIMEOUT_SECS} and {MAX_TIMEOUT_SECS} seconds, got {timeout_seconds}"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_domain_strips_scheme_and_path() {
        assert_eq!(clean_domain("https://example.com/path?q=1"), "example.com");
        assert_eq!(clean_domain("http://www.example.com/"), "example.com");
        assert_eq!(clean_domain("Example.COM"), "example.com");
    }

    #[test]
    fn test_validate_domain_rejects_bad_input() {
        assert!(validate_domain("").is_err());
        assert!(validate_domain("*.example.com").is_err());
        assert!(validate_domain("nodots").is_err());
        assert!(validate_domain("example.com").is_ok());
    }

    #[test]
    fn test_validate_limits_bounds() {
        assert!(validate_limits(1, 1).is_ok());
        assert!(validate_limits(50, 30).is_ok());
        assert!(validate_limits(0, 5).is_err());
        assert!(validate_limits(51, 5).is_err());
        assert!(validate_limits(10, 0).is_err());
        assert!(validate_limits(10, 31).is_err());
    }
}
