//! Subdomain scan engine.
//!
//! The engine runs in strict stages: passive harvesters in parallel, then
//! the optional wordlist brute force, then a snapshot of the candidate set
//! is handed to the bounded resolver pool. No stage overlaps the next, which
//! is what lets the candidate set be read without contention and makes the
//! result count deterministic for a given set of candidates.

pub mod brute;
pub mod candidates;
pub mod lookup;
pub mod passive;
pub mod pool;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::config::{CT_SEARCH_BASE_URL, PASSIVE_DNS_BASE_URL};
use crate::error_handling::{InitializationError, ScanError};
use crate::initialization::{init_harvester_client, init_resolver_chain};

pub use candidates::CandidateSet;
pub use lookup::{
    CreationDateLookup, HickoryLookup, LookupError, RecordKind, RecordLookup, WhoisCreationDate,
    WhoisError, PROBE_ORDER,
};
pub use passive::{CtLogHarvester, Harvester, PassiveDnsHarvester};
pub use pool::{RecordSet, ResolverPool, SubdomainResult};

/// Per-job scan parameters.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum concurrent resolver work units.
    pub threads: usize,
    /// Timeout applied to each DNS query and harvester request.
    pub timeout: Duration,
    /// Wordlist for the brute-force stage; `None` skips the stage.
    pub wordlist_path: Option<PathBuf>,
}

/// A single scan over one apex domain.
pub struct Scanner {
    apex: String,
    wordlist_path: Option<PathBuf>,
    harvesters: Vec<Arc<dyn Harvester>>,
    pool: ResolverPool,
    candidates: CandidateSet,
}

impl Scanner {
    /// Wires a scanner against the production sources: crt.sh, the passive
    /// DNS API, the public resolver chain, and WHOIS.
    pub fn new(apex: impl Into<String>, options: ScanOptions) -> Result<Self, InitializationError> {
        let client = init_harvester_client(options.timeout)?;
        let harvesters: Vec<Arc<dyn Harvester>> = vec![
            Arc::new(CtLogHarvester::new(client.clone(), CT_SEARCH_BASE_URL)),
            Arc::new(PassiveDnsHarvester::new(client, PASSIVE_DNS_BASE_URL)),
        ];
        let pool = ResolverPool::new(
            init_resolver_chain(options.timeout),
            Arc::new(WhoisCreationDate),
            options.threads,
        );
        Ok(Self::with_parts(apex, options, harvesters, pool))
    }

    /// Assembles a scanner from explicit parts.
    ///
    /// This is the seam the integration tests use to swap in scripted
    /// harvesters, resolvers, and WHOIS sources.
    pub fn with_parts(
        apex: impl Into<String>,
        options: ScanOptions,
        harvesters: Vec<Arc<dyn Harvester>>,
        pool: ResolverPool,
    ) -> Self {
        Self {
            apex: apex.into(),
            wordlist_path: options.wordlist_path,
            harvesters,
            pool,
            candidates: CandidateSet::new(),
        }
    }

    /// Runs the full scan and returns the discovered subdomains.
    ///
    /// Harvester failures are logged and skipped. An unreadable wordlist or
    /// a pool breakdown is fatal and surfaces as the job's failure reason.
    pub async fn scan(&self) -> Result<Vec<SubdomainResult>, ScanError> {
        info!("starting subdomain scan for {}", self.apex);

        self.run_harvesters().await;
        info!(
            "passive enumeration discovered {} candidates",
            self.candidates.len()
        );

        if let Some(path) = &self.wordlist_path {
            info!("starting brute force using wordlist {}", path.display());
            brute::stream_wordlist(path, &self.candidates).await?;
        }

        let labels = self.candidates.snapshot();
        info!("resolving {} candidate subdomains", labels.len());
        let results = self.pool.resolve_all(&self.apex, labels).await?;

        info!(
            "scan for {} finished with {} results",
            self.apex,
            results.len()
        );
        Ok(results)
    }

    /// Runs every harvester concurrently and waits for all of them.
    async fn run_harvesters(&self) {
        let harvests = self.harvesters.iter().map(|harvester| {
            let apex = self.apex.as_str();
            let candidates = &self.candidates;
            async move {
                match harvester.harvest(apex, candidates).await {
                    Ok(added) => {
                        info!("{} harvester contributed {added} labels", harvester.name())
                    }
                    Err(e) => warn!("{} harvester failed: {e}", harvester.name()),
                }
            }
        });
        futures::future::join_all(harvests).await;
    }
}
