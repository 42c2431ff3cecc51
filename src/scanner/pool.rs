//! Bounded-concurrency resolver pool.
//!
//! Turns the snapshot of candidate labels into subdomain results. One worker
//! task runs per label, gated by a semaphore of the job's thread count; each
//! worker probes the fixed record-type table against the resolver fallback
//! chain, then attempts a depth-gated WHOIS probe. Results flow through a
//! single mpsc channel to one aggregator task, which is the only writer of
//! the result sequence. Result ordering is non-deterministic.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, warn};
use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;

use crate::config::{
    CREATION_DATE_UNAVAILABLE, WHOIS_ATTEMPTS, WHOIS_MAX_DEPTH, WHOIS_RETRY_DELAY_MS,
};
use crate::error_handling::ScanError;
use crate::scanner::lookup::{
    format_creation_date, CreationDateLookup, RecordKind, RecordLookup, PROBE_ORDER,
};

/// Record-type tag to formatted answer values, for one name.
///
/// Tags whose queries yielded no values are absent from the map.
pub type RecordSet = BTreeMap<String, Vec<String>>;

/// A discovered subdomain and everything we learned about it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubdomainResult {
    /// Fully qualified name (`label.apex`, no trailing dot).
    pub subdomain: String,
    /// IPv4 addresses, identical to the record set's `A` entry.
    pub ip_addresses: Vec<String>,
    /// All observed DNS records by type tag.
    pub dns_records: RecordSet,
    /// Registration date, or `"Not available"`.
    pub creation_date: String,
}

/// Bounded pool resolving labels against a fallback chain of upstreams.
pub struct ResolverPool {
    upstreams: Arc<Vec<Arc<dyn RecordLookup>>>,
    whois: Arc<dyn CreationDateLookup>,
    threads: usize,
}

impl ResolverPool {
    /// Creates a pool over `upstreams` (tried in order) capped at `threads`
    /// concurrent work units.
    pub fn new(
        upstreams: Vec<Arc<dyn RecordLookup>>,
        whois: Arc<dyn CreationDateLookup>,
        threads: usize,
    ) -> Self {
        Self {
            upstreams: Arc::new(upstreams),
            whois,
            threads,
        }
    }

    /// Resolves every label against `apex` and returns the collected results.
    ///
    /// Workers deliver results to a dedicated aggregator task over a channel;
    /// this method returns once every worker has finished and the channel
    /// has drained. The order of the returned results is not meaningful.
    ///
    /// # Errors
    ///
    /// Fails only if workers can no longer be scheduled or the aggregator
    /// dies; per-label and per-query failures are absorbed.
    pub async fn resolve_all(
        &self,
        apex: &str,
        labels: Vec<String>,
    ) -> Result<Vec<SubdomainResult>, ScanError> {
        let semaphore = Arc::new(Semaphore::new(self.threads));
        let (tx, mut rx) = mpsc::channel::<SubdomainResult>(1);

        let aggregator = tokio::spawn(async move {
            let mut results = Vec::new();
            while let Some(result) = rx.recv().await {
                results.push(result);
            }
            results
        });

        let mut workers = FuturesUnordered::new();
        for label in labels {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|_| ScanError::PoolClosed)?;

            let upstreams = Arc::clone(&self.upstreams);
            let whois = Arc::clone(&self.whois);
            let tx = tx.clone();
            let apex = apex.to_string();

            workers.push(tokio::spawn(async move {
                let _permit = permit;

                let fqdn = format!("{label}.{apex}");
                // DNS wants the absolute form; the result keeps the bare one.
                let query_name = format!("{fqdn}.");
                let dns_records = resolve_records(&upstreams, &query_name).await;
                let creation_date = probe_creation_date(whois.as_ref(), &fqdn).await;

                let ip_addresses = dns_records
                    .get(RecordKind::A.as_str())
                    .cloned()
                    .unwrap_or_default();

                let result = SubdomainResult {
                    subdomain: fqdn,
                    ip_addresses,
                    dns_records,
                    creation_date,
                };
                if tx.send(result).await.is_err() {
                    warn!("result aggregator hung up before all workers finished");
                }
            }));
        }
        drop(tx);

        while let Some(joined) = workers.next().await {
            if let Err(e) = joined {
                warn!("resolver worker panicked: {e}");
            }
        }

        aggregator
            .await
            .map_err(|e| ScanError::AggregationFailed(e.to_string()))
    }
}

/// Probes every record type for `query_name`, walking the upstream chain.
///
/// For each type the upstreams are tried in order until one returns an
/// answer (even an empty one). Types for which every upstream failed, or
/// which answered with zero values, are left out of the map.
async fn resolve_records(
    upstreams: &[Arc<dyn RecordLookup>],
    query_name: &str,
) -> RecordSet {
    let mut records = RecordSet::new();
    for kind in PROBE_ORDER {
        let mut answered = None;
        for upstream in upstreams {
            match upstream.lookup(query_name, kind).await {
                Ok(values) => {
                    answered = Some(values);
                    break;
                }
                Err(e) => {
                    debug!(
                        "{kind} lookup for {query_name} failed on {}: {e}",
                        upstream.name()
                    );
                }
            }
        }
        if let Some(values) = answered {
            if !values.is_empty() {
                records.insert(kind.as_str().to_string(), values);
            }
        }
    }
    records
}

/// Best-effort registration date for `fqdn`.
///
/// Names nested deeper than [`WHOIS_MAX_DEPTH`] dot-segments are never sent
/// to the provider. Transport and parse failures alike are retried up to
/// [`WHOIS_ATTEMPTS`] times with a fixed delay; exhaustion yields the
/// sentinel, never an error.
async fn probe_creation_date(whois: &dyn CreationDateLookup, fqdn: &str) -> String {
    if name_depth(fqdn) > WHOIS_MAX_DEPTH {
        return CREATION_DATE_UNAVAILABLE.to_string();
    }

    let strategy = FixedInterval::from_millis(WHOIS_RETRY_DELAY_MS).take(WHOIS_ATTEMPTS - 1);
    match Retry::spawn(strategy, || whois.creation_date(fqdn)).await {
        Ok(Some(raw)) => format_creation_date(&raw),
        Ok(None) => CREATION_DATE_UNAVAILABLE.to_string(),
        Err(e) => {
            debug!("whois exhausted for {fqdn}: {e}");
            CREATION_DATE_UNAVAILABLE.to_string()
        }
    }
}

/// Number of dot-segments in a name, ignoring any trailing dot.
pub(crate) fn name_depth(name: &str) -> usize {
    name.trim_end_matches('.').split('.').count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::lookup::WhoisError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_name_depth() {
        assert_eq!(name_depth("a.example.com"), 3);
        assert_eq!(name_depth("b.sub.example.com"), 4);
        assert_eq!(name_depth("a.example.com."), 3);
        assert_eq!(name_depth("example.com"), 2);
    }

    struct CountingWhois {
        calls: AtomicUsize,
        fail_first: usize,
        date: Option<&'static str>,
    }

    #[async_trait]
    impl CreationDateLookup for CountingWhois {
        async fn creation_date(&self, _domain: &str) -> Result<Option<String>, WhoisError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(WhoisError::Transport("connection reset".into()));
            }
            Ok(self.date.map(str::to_string))
        }
    }

    #[tokio::test]
    async fn test_probe_skips_deep_names_without_contacting_whois() {
        let whois = CountingWhois {
            calls: AtomicUsize::new(0),
            fail_first: 0,
            date: Some("2001-01-01T00:00:00Z"),
        };
        let date = probe_creation_date(&whois, "b.sub.example.com").await;
        assert_eq!(date, CREATION_DATE_UNAVAILABLE);
        assert_eq!(whois.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_probe_queries_names_at_depth_boundary() {
        let whois = CountingWhois {
            calls: AtomicUsize::new(0),
            fail_first: 0,
            date: Some("2001-01-01T00:00:00Z"),
        };
        let date = probe_creation_date(&whois, "a.example.com").await;
        assert_eq!(date, "2001-01-01");
        assert_eq!(whois.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_retries_then_succeeds() {
        let whois = CountingWhois {
            calls: AtomicUsize::new(0),
            fail_first: 2,
            date: Some("15-Sep-1997"),
        };
        let date = probe_creation_date(&whois, "a.example.com").await;
        assert_eq!(date, "15-Sep-1997");
        assert_eq!(whois.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_exhaustion_yields_sentinel() {
        let whois = CountingWhois {
            calls: AtomicUsize::new(0),
            fail_first: usize::MAX,
            date: None,
        };
        let date = probe_creation_date(&whois, "a.example.com").await;
        assert_eq!(date, CREATION_DATE_UNAVAILABLE);
        assert_eq!(whois.calls.load(Ordering::SeqCst), WHOIS_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_probe_does_not_retry_missing_creation_date() {
        let whois = CountingWhois {
            calls: AtomicUsize::new(0),
            fail_first: 0,
            date: None,
        };
        let date = probe_creation_date(&whois, "a.example.com").await;
        assert_eq!(date, CREATION_DATE_UNAVAILABLE);
        assert_eq!(whois.calls.load(Ordering::SeqCst), 1);
    }
}
