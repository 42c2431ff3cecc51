//! HTTP interface for submitting scans and managing wordlists.
//!
//! Endpoints:
//! - `POST /scan` - submit a scan job
//! - `GET /jobs` - recent jobs
//! - `GET /jobs/:id` - job status and results
//! - `GET /jobs/:id/csv` - CSV download of a completed job
//! - `GET|POST /wordlists`, `DELETE /wordlists/:id` - wordlist management
//! - `POST /wordlists/generate` - AI wordlist generation

mod handlers;
mod types;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;

use handlers::{
    create_wordlist, delete_wordlist, export_job_csv, generate_wordlist, get_job, list_jobs,
    list_wordlists, submit_scan,
};
pub use types::{AppState, CreateWordlistRequest, ScanRequest, SubmitResponse};

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scan", post(submit_scan))
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(get_job))
        .route("/jobs/:id/csv", get(export_job_csv))
        .route("/wordlists", get(list_wordlists).post(create_wordlist))
        .route("/wordlists/:id", delete(delete_wordlist))
        .route("/wordlists/generate", post(generate_wordlist))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Binds the listener and serves until shutdown.
pub async fn start_server(port: u16, state: AppState) -> Result<(), anyhow::Error> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind server to port {}: {}", port, e))?;

    log::info!("Server listening on http://0.0.0.0:{}/", port);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

/// Logs every request with its status and elapsed time.
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} {} {:?}",
        method,
        uri,
        response.status(),
        start.elapsed()
    );
    response
}
