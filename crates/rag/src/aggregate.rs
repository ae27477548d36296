//! Evidence aggregation: merge per-partition hits into one ranked list.

use crate::types::{AggregatedEvidence, Hit};

/// Merge per-domain hit lists into ranked, deduplicated evidence.
///
/// Lists are concatenated in the order given (the pipeline supplies domains
/// in sorted order, so the result is deterministic), deduplicated by chunk
/// identity with the lower-distance entry winning, stably sorted by ascending
/// distance, and truncated to `top_k`.
///
/// All-empty input produces empty evidence, not an error; the downstream
/// confidence estimator and enrichment gate handle that case explicitly.
pub fn aggregate(per_domain_hits: Vec<(String, Vec<Hit>)>, top_k: usize) -> AggregatedEvidence {
    let total: usize = per_domain_hits.iter().map(|(_, hits)| hits.len()).sum();
    let mut all_hits = Vec::with_capacity(total);

    for (domain, hits) in per_domain_hits {
        tracing::debug!("Merging {} hits from partition '{}'", hits.len(), domain);
        all_hits.extend(hits);
    }

    let mut evidence = AggregatedEvidence::from_hits(all_hits);
    evidence.truncate(top_k);

    tracing::debug!(
        "Aggregated evidence: {} entries across domains {:?}",
        evidence.len(),
        evidence.domains()
    );

    evidence
}
