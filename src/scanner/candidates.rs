//! Deduplicated candidate label collection.
//!
//! Harvesters and the brute-force generator all funnel their output through
//! a single [`CandidateSet`]. Labels are normalized on the way in and
//! deduplicated by exact byte equality, so the resolution stage sees each
//! candidate exactly once regardless of how many sources produced it.

use std::collections::HashSet;
use std::sync::Mutex;

/// Thread-safe set of subdomain labels awaiting resolution.
///
/// Writers (harvesters, brute-force generator) run concurrently and are
/// serialized by the internal mutex. Iteration happens only after all
/// producers have completed, via [`CandidateSet::snapshot`].
#[derive(Debug, Default)]
pub struct CandidateSet {
    labels: Mutex<HashSet<String>>,
}

impl CandidateSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes and inserts a label, returning whether it was newly added.
    ///
    /// Normalization lowercases and trims surrounding whitespace. Empty
    /// labels and labels containing a wildcard token are rejected and return
    /// `false`.
    pub fn insert(&self, label: &str) -> bool {
        let Some(normalized) = normalize_label(label) else {
            return false;
        };
        self.labels
            .lock()
            .expect("candidate set mutex poisoned")
            .insert(normalized)
    }

    /// Number of distinct labels collected so far.
    pub fn len(&self) -> usize {
        self.labels
            .lock()
            .expect("candidate set mutex poisoned")
            .len()
    }

    /// Returns `true` if no labels have been collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains the set into a plain `Vec` for the resolution stage.
    ///
    /// Only called after the staging barrier, once every producer has
    /// finished. Labels inserted after the snapshot are not seen by the
    /// current job.
    pub fn snapshot(&self) -> Vec<String> {
        self.labels
            .lock()
            .expect("candidate set mutex poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

/// Lowercases and trims a label, rejecting empty and wildcard entries.
fn normalize_label(label: &str) -> Option<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() || trimmed.contains('*') {
        return None;
    }
    Some(trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_insert_lowercases_and_trims() {
        let set = CandidateSet::new();
        assert!(set.insert("  API "));
        let labels = set.snapshot();
        assert_eq!(labels, vec!["api".to_string()]);
    }

    #[test]
    fn test_insert_rejects_wildcards_and_empty() {
        let set = CandidateSet::new();
        assert!(!set.insert("*.mail"));
        assert!(!set.insert("*"));
        assert!(!set.insert(""));
        assert!(!set.insert("   "));
        assert!(set.is_empty());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let set = CandidateSet::new();
        assert!(set.insert("www"));
        for _ in 0..10 {
            assert!(!set.insert("www"));
            assert!(!set.insert("WWW"));
        }
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_dotted_label_sequences_are_accepted() {
        let set = CandidateSet::new();
        assert!(set.insert("a.b"));
        assert!(set.snapshot().contains(&"a.b".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_writers_deduplicate() {
        let set = Arc::new(CandidateSet::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let set = Arc::clone(&set);
            handles.push(tokio::spawn(async move {
                for i in 0..100 {
                    set.insert(&format!("label-{}", i % 25));
                }
            }));
        }
        for handle in handles {
            handle.await.expect("writer task panicked");
        }
        assert_eq!(set.len(), 25);
    }
}
