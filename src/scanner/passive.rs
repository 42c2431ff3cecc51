//! Passive subdomain harvesters.
//!
//! Each harvester is a named strategy that queries one external source and
//! writes candidate labels into the shared [`CandidateSet`]. Harvesters run
//! in parallel with each other and their failures are never fatal to a job:
//! the coordinator logs them and moves on to the active stage.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::PASSIVE_DNS_PAGE_LIMIT;
use crate::error_handling::HarvestError;
use crate::scanner::candidates::CandidateSet;

/// A strategy that contributes candidate labels from an external source.
#[async_trait]
pub trait Harvester: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Queries the source for `apex` and inserts labels into `candidates`.
    ///
    /// Returns the number of labels newly added. Issues exactly one outbound
    /// request; failures are classified but left to the caller to log.
    async fn harvest(
        &self,
        apex: &str,
        candidates: &CandidateSet,
    ) -> Result<usize, HarvestError>;
}

/// Harvester backed by a certificate-transparency search endpoint.
pub struct CtLogHarvester {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct CtEntry {
    name_value: String,
}

impl CtLogHarvester {
    /// Creates a harvester against `base_url` (no trailing slash).
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Harvester for CtLogHarvester {
    fn name(&self) -> &'static str {
        "certificate transparency"
    }

    async fn harvest(
        &self,
        apex: &str,
        candidates: &CandidateSet,
    ) -> Result<usize, HarvestError> {
        let url = format!("{}/?q=%25.{}&output=json", self.base_url, apex);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(HarvestError::Status(response.status()));
        }
        let body = response.text().await?;
        let entries: Vec<CtEntry> = serde_json::from_str(&body)?;

        let mut added = 0;
        for entry in &entries {
            // A single certificate entry can carry several names separated
            // by newlines, some of them wildcards.
            for name in entry.name_value.lines() {
                if insert_if_under_apex(candidates, name, apex) {
                    added += 1;
                }
            }
        }
        Ok(added)
    }
}

/// Harvester backed by a passive-DNS database.
pub struct PassiveDnsHarvester {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct PassiveDnsResponse {
    data: Vec<PassiveDnsEntry>,
}

#[derive(Deserialize)]
struct PassiveDnsEntry {
    id: String,
}

impl PassiveDnsHarvester {
    /// Creates a harvester against `base_url` (no trailing slash).
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Harvester for PassiveDnsHarvester {
    fn name(&self) -> &'static str {
        "passive DNS"
    }

    async fn harvest(
        &self,
        apex: &str,
        candidates: &CandidateSet,
    ) -> Result<usize, HarvestError> {
        let url = format!(
            "{}/ui/domains/{}/subdomains?limit={}",
            self.base_url, apex, PASSIVE_DNS_PAGE_LIMIT
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(HarvestError::Status(response.status()));
        }
        let body = response.text().await?;
        let parsed: PassiveDnsResponse = serde_json::from_str(&body)?;

        let mut added = 0;
        for entry in &parsed.data {
            if insert_if_under_apex(candidates, &entry.id, apex) {
                added += 1;
            }
        }
        Ok(added)
    }
}

/// Strips the apex suffix from `name` and inserts the remaining label.
///
/// Names that are not under the apex, carry a wildcard, or reduce to an
/// empty label are discarded. Returns whether a new label was added.
fn insert_if_under_apex(candidates: &CandidateSet, name: &str, apex: &str) -> bool {
    let name = name.trim().to_lowercase();
    let suffix = format!(".{apex}");
    if name.contains('*') || !name.ends_with(&suffix) {
        return false;
    }
    let label = &name[..name.len() - suffix.len()];
    if label.is_empty() {
        return false;
    }
    candidates.insert(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_if_under_apex_strips_suffix() {
        let set = CandidateSet::new();
        assert!(insert_if_under_apex(&set, "api.example.com", "example.com"));
        assert_eq!(set.snapshot(), vec!["api".to_string()]);
    }

    #[test]
    fn test_insert_if_under_apex_rejects_foreign_domains() {
        let set = CandidateSet::new();
        assert!(!insert_if_under_apex(&set, "api.example.org", "example.com"));
        assert!(!insert_if_under_apex(&set, "example.com", "example.com"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_insert_if_under_apex_rejects_wildcards() {
        let set = CandidateSet::new();
        assert!(!insert_if_under_apex(&set, "*.example.com", "example.com"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_insert_if_under_apex_lowercases() {
        let set = CandidateSet::new();
        assert!(insert_if_under_apex(&set, "MAIL.Example.COM", "example.com"));
        assert_eq!(set.snapshot(), vec!["mail".to_string()]);
    }

    #[test]
    fn test_nested_labels_survive_suffix_strip() {
        let set = CandidateSet::new();
        assert!(insert_if_under_apex(
            &set,
            "a.b.example.com",
            "example.com"
        ));
        assert_eq!(set.snapshot(), vec!["a.b".to_string()]);
    }
}
