//! DNS resolver chain initialization.

use std::sync::Arc;
use std::time::Duration;

use crate::config::RESOLVER_CHAIN;
use crate::scanner::lookup::{HickoryLookup, RecordLookup};

/// Builds the fallback chain of upstream resolvers.
///
/// One resolver instance per upstream in [`RESOLVER_CHAIN`], in table order.
/// Each is limited to a single attempt with the job's per-query timeout;
/// trying the next upstream on failure is the resolver pool's job, not the
/// library's.
pub fn init_resolver_chain(timeout: Duration) -> Vec<Arc<dyn RecordLookup>> {
    RESOLVER_CHAIN
        .iter()
        .map(|upstream| Arc::new(HickoryLookup::new(*upstream, timeout)) as Arc<dyn RecordLookup>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chain_preserves_table_order() {
        let chain = init_resolver_chain(Duration::from_secs(5));
        let names: Vec<&str> = chain.iter().map(|u| u.name()).collect();
        assert_eq!(names, vec!["8.8.8.8:53", "1.1.1.1:53", "9.9.9.9:53"]);
    }
}
