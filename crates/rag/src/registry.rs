//! Domain registry: decides which partitions to search for a query.

use crate::config::DomainConfig;
use std::collections::BTreeSet;

/// Maps queries to the set of domain partitions worth searching.
///
/// The keyword table is injected at construction; the registry holds no
/// global state and `resolve` is a pure function of the query text and the
/// table. Resolution policy:
///
/// 1. An explicit hint naming a known domain restricts the search to it.
///    An unknown hint is logged and ignored (not an error to the caller).
/// 2. Otherwise, keywords found in the query select their domains.
/// 3. No match means broad recall: all known domains.
///
/// The result is never empty while at least one domain is configured.
#[derive(Debug, Clone)]
pub struct DomainRegistry {
    domains: Vec<DomainConfig>,
}

impl DomainRegistry {
    pub fn new(domains: Vec<DomainConfig>) -> Self {
        Self { domains }
    }

    /// All configured domain names.
    pub fn known_domains(&self) -> BTreeSet<String> {
        self.domains.iter().map(|d| d.name.clone()).collect()
    }

    /// Resolve the partitions to search for a query.
    pub fn resolve(&self, query: &str, hint: Option<&str>) -> BTreeSet<String> {
        if let Some(hint) = hint {
            let hint_lower = hint.to_lowercase();
            if let Some(domain) = self
                .domains
                .iter()
                .find(|d| d.name.to_lowercase() == hint_lower)
            {
                tracing::debug!("Domain hint '{}' restricts search", hint);
                return std::iter::once(domain.name.clone()).collect();
            }
            tracing::warn!(
                "Unknown domain hint '{}', falling back to all domains",
                hint
            );
            return self.known_domains();
        }

        let query_lower = query.to_lowercase();
        let matched: BTreeSet<String> = self
            .domains
            .iter()
            .filter(|d| {
                d.keywords
                    .iter()
                    .any(|keyword| query_lower.contains(&keyword.to_lowercase()))
            })
            .map(|d| d.name.clone())
            .collect();

        if matched.is_empty() {
            tracing::debug!("No domain keywords matched, searching all domains");
            self.known_domains()
        } else {
            tracing::debug!("Query matched domains: {:?}", matched);
            matched
        }
    }
}
