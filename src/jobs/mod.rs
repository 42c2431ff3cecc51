//! Scan job lifecycle and registry.
//!
//! Jobs are held in process memory, keyed by id. A job is created `Pending`
//! at submission, flips to `Running` when its coordinator task starts, and
//! transitions exactly once to one of the terminal states. Status pollers
//! read consistent snapshots; only the coordinator task mutates a job.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::scanner::{Scanner, ScanOptions, SubdomainResult};

/// Lifecycle state of a scan job.
///
/// `Completed` and `Failed` are terminal: once entered, a job never changes
/// state again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created but not yet picked up by the coordinator.
    Pending,
    /// The coordinator is driving the scan stages.
    Running,
    /// The scan finished and results are available.
    Completed,
    /// A fatal error stopped the scan; a reason string is recorded.
    Failed,
}

impl JobStatus {
    /// Whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

struct JobState {
    status: JobStatus,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    error: Option<String>,
    results: Vec<SubdomainResult>,
}

/// A submitted scan job.
///
/// Submission parameters are immutable for the life of the job; the mutable
/// state (status, timing, results) sits behind a mutex so pollers and the
/// coordinator don't race.
pub struct ScanJob {
    /// Unique id assigned at submission.
    pub id: Uuid,
    /// Apex domain under scan.
    pub domain: String,
    /// Wordlist file for the brute-force stage, if any.
    pub wordlist_path: Option<PathBuf>,
    /// Resolver pool concurrency.
    pub threads: usize,
    /// Per-query timeout.
    pub timeout: Duration,
    state: Mutex<JobState>,
}

/// Point-in-time view of a job for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    /// Job id.
    pub id: Uuid,
    /// Apex domain under scan.
    pub domain: String,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Submission time.
    pub start_time: DateTime<Utc>,
    /// Terminal transition time, once reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Human-readable elapsed time.
    pub duration: String,
    /// Failure reason, only on `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of discovered subdomains.
    pub result_count: usize,
    /// Results, only on `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SubdomainResult>>,
}

impl ScanJob {
    /// Creates a pending job with a fresh id.
    pub fn new(
        domain: impl Into<String>,
        wordlist_path: Option<PathBuf>,
        threads: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            domain: domain.into(),
            wordlist_path,
            threads,
            timeout,
            state: Mutex::new(JobState {
                status: JobStatus::Pending,
                started_at: Utc::now(),
                ended_at: None,
                error: None,
                results: Vec::new(),
            }),
        }
    }

    /// Current lifecycle state.
    pub fn status(&self) -> JobStatus {
        self.lock().status
    }

    /// Failure reason, if the job failed.
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Copies the results out. Empty unless the job completed.
    pub fn results(&self) -> Vec<SubdomainResult> {
        self.lock().results.clone()
    }

    /// Builds a snapshot for API responses.
    ///
    /// Results are included only for completed jobs and only when
    /// `include_results` is set, since they can be large.
    pub fn snapshot(&self, include_results: bool) -> JobSnapshot {
        let state = self.lock();
        let elapsed = match state.ended_at {
            Some(ended) => ended - state.started_at,
            None => Utc::now() - state.started_at,
        };
        JobSnapshot {
            id: self.id,
            domain: self.domain.clone(),
            status: state.status,
            start_time: state.started_at,
            end_time: state.ended_at,
            duration: format_duration(elapsed),
            error: state.error.clone(),
            result_count: state.results.len(),
            results: if include_results && state.status == JobStatus::Completed {
                Some(state.results.clone())
            } else {
                None
            },
        }
    }

    fn mark_running(&self) {
        let mut state = self.lock();
        if state.status == JobStatus::Pending {
            state.status = JobStatus::Running;
        }
    }

    fn complete(&self, results: Vec<SubdomainResult>) {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return;
        }
        state.status = JobStatus::Completed;
        state.results = results;
        state.ended_at = Some(Utc::now());
    }

    fn fail(&self, reason: String) {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return;
        }
        state.status = JobStatus::Failed;
        state.error = Some(reason);
        state.ended_at = Some(Utc::now());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, JobState> {
        self.state.lock().expect("job state mutex poisoned")
    }
}

/// Formats an elapsed duration as `1h 2m 3s`, `2m 3s`, or `5s`.
fn format_duration(elapsed: chrono::Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Process-wide index of jobs by id.
///
/// Submissions insert, pollers look up, the dashboard lists; all three go
/// through the one internal mutex.
#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<Uuid, Arc<ScanJob>>>,
}

impl JobRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a job under its id.
    pub fn insert(&self, job: Arc<ScanJob>) {
        self.jobs
            .lock()
            .expect("job registry mutex poisoned")
            .insert(job.id, job);
    }

    /// Looks up a job by id.
    pub fn get(&self, id: &Uuid) -> Option<Arc<ScanJob>> {
        self.jobs
            .lock()
            .expect("job registry mutex poisoned")
            .get(id)
            .cloned()
    }

    /// Returns up to `limit` jobs, newest first.
    pub fn recent(&self, limit: usize) -> Vec<Arc<ScanJob>> {
        let jobs = self.jobs.lock().expect("job registry mutex poisoned");
        let mut all: Vec<Arc<ScanJob>> = jobs.values().cloned().collect();
        drop(jobs);
        all.sort_by_key(|job| std::cmp::Reverse(job.snapshot(false).start_time));
        all.truncate(limit);
        all
    }
}

/// Drives a job to its terminal state using the production scanner wiring.
pub async fn run_job(job: Arc<ScanJob>) {
    let options = ScanOptions {
        threads: job.threads,
        timeout: job.timeout,
        wordlist_path: job.wordlist_path.clone(),
    };
    match Scanner::new(&job.domain, options) {
        Ok(scanner) => run_job_with(job, scanner).await,
        Err(e) => {
            warn!("[job {}] initialization failed: {e}", job.id);
            job.fail(e.to_string());
        }
    }
}

/// Drives a job to its terminal state with a pre-built scanner.
///
/// Split out from [`run_job`] so tests can inject scanners wired to mock
/// sources.
pub async fn run_job_with(job: Arc<ScanJob>, scanner: Scanner) {
    job.mark_running();
    info!("[job {}] scanning {}", job.id, job.domain);

    match scanner.scan().await {
        Ok(results) => {
            info!(
                "[job {}] completed with {} results",
                job.id,
                results.len()
            );
            job.complete(results);
        }
        Err(e) => {
            warn!("[job {}] failed: {e}", job.id);
            job.fail(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> ScanJob {
        ScanJob::new("example.com", None, 10, Duration::from_secs(5))
    }

    #[test]
    fn test_new_job_is_pending() {
        let job = job();
        assert_eq!(job.status(), JobStatus::Pending);
        assert!(!job.status().is_terminal());
    }

    #[test]
    fn test_complete_is_terminal_and_sticky() {
        let job = job();
        job.mark_running();
        job.complete(Vec::new());
        assert_eq!(job.status(), JobStatus::Completed);

        // A later failure must not overwrite the terminal state.
        job.fail("too late".into());
        assert_eq!(job.status(), JobStatus::Completed);
        assert!(job.error().is_none());
    }

    #[test]
    fn test_fail_records_reason() {
        let job = job();
        job.mark_running();
        job.fail("wordlist /nonexistent is unreadable".into());
        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.error().expect("reason").contains("/nonexistent"));
    }

    #[test]
    fn test_terminal_end_time_is_not_before_start() {
        let job = job();
        job.mark_running();
        job.complete(Vec::new());
        let snapshot = job.snapshot(false);
        assert!(snapshot.end_time.expect("end time") >= snapshot.start_time);
    }

    #[test]
    fn test_snapshot_hides_results_unless_completed() {
        let job = job();
        assert!(job.snapshot(true).results.is_none());
        job.mark_running();
        job.complete(Vec::new());
        assert!(job.snapshot(true).results.is_some());
        assert!(job.snapshot(false).results.is_none());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(5)), "5s");
        assert_eq!(format_duration(chrono::Duration::seconds(155)), "2m 35s");
        assert_eq!(format_duration(chrono::Duration::seconds(3723)), "1h 2m 3s");
        assert_eq!(format_duration(chrono::Duration::seconds(-1)), "0s");
    }

    #[test]
    fn test_registry_round_trip() {
        let registry = JobRegistry::new();
        let job = Arc::new(job());
        let id = job.id;
        registry.insert(Arc::clone(&job));
        assert!(registry.get(&id).is_some());
        assert!(registry.get(&Uuid::new_v4()).is_none());
        assert_eq!(registry.recent(10).len(), 1);
    }
}
