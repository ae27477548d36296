//! Core data model for the retrieval orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Metadata for an ingested source document.
///
/// Owned by the ingestion side; the orchestrator only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Unique document identifier
    pub id: String,

    /// Original filename (the citation identifier)
    pub filename: String,

    /// Domain partition this document belongs to
    pub domain: String,

    /// Number of chunks produced from this document
    pub chunk_count: u32,

    /// Source size in bytes
    pub size_bytes: u64,

    /// When this document was indexed
    pub ingested_at: DateTime<Utc>,
}

/// A text chunk with its embedding. Immutable once indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk identifier
    pub id: String,

    /// Owning document's filename
    pub filename: String,

    /// Domain label inherited from the owning document
    pub domain: String,

    /// Position within the document
    pub position: u32,

    /// Text content
    pub text: String,

    /// Embedding vector (opaque to the orchestrator)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// One similarity-search result.
///
/// `score` is a distance: lower is better. Hits are produced per query and
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    /// Identity of the matched chunk
    pub chunk_id: String,

    /// Owning document's filename
    pub filename: String,

    /// Domain partition the hit came from
    pub domain: String,

    /// Chunk text, used to build the completion context
    pub text: String,

    /// Distance score (lower is better)
    pub score: f32,
}

/// Hits merged across domain partitions.
///
/// Invariants, enforced by [`AggregatedEvidence::from_hits`]:
/// - no two entries reference the same chunk
/// - entries are sorted by ascending score, with ties keeping input order
#[derive(Debug, Clone, Default)]
pub struct AggregatedEvidence {
    hits: Vec<Hit>,
}

impl AggregatedEvidence {
    /// Build evidence from raw hits, deduplicating by chunk identity and
    /// sorting by ascending score.
    ///
    /// When the same chunk appears more than once (overlapping domain
    /// searches), the lower-distance entry wins; equal scores keep the first
    /// occurrence. The sort is stable, so equal scores preserve input order.
    pub fn from_hits(hits: Vec<Hit>) -> Self {
        let mut merged: Vec<Hit> = Vec::with_capacity(hits.len());
        let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

        for hit in hits {
            match seen.get(&hit.chunk_id) {
                Some(&idx) => {
                    if hit.score < merged[idx].score {
                        merged[idx] = hit;
                    }
                }
                None => {
                    seen.insert(hit.chunk_id.clone(), merged.len());
                    merged.push(hit);
                }
            }
        }

        merged.sort_by(|a, b| a.score.total_cmp(&b.score));

        Self { hits: merged }
    }

    /// Keep only the best `top_k` entries.
    pub fn truncate(&mut self, top_k: usize) {
        self.hits.truncate(top_k);
    }

    /// The ranked hits, best first.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Set of distinct domains represented in the evidence.
    pub fn domains(&self) -> BTreeSet<String> {
        self.hits.iter().map(|h| h.domain.clone()).collect()
    }

    /// Distance scores in rank order.
    pub fn scores(&self) -> Vec<f32> {
        self.hits.iter().map(|h| h.score).collect()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// External web-search evidence, attached only when the enrichment gate
/// fires. Created per query, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentResult {
    /// The missing domain or topic this lookup covered
    pub topic: String,

    /// Source label (e.g., "duckduckgo")
    pub source: String,

    /// Short external summary text
    pub summary: String,
}

/// One citation in the final answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Source document filename
    pub filename: String,

    /// Raw distance score of the cited hit
    pub score: f32,

    /// Domain the citation came from
    pub domain: String,
}

/// Final structured answer. Immutable after construction; this is the
/// frozen JSON shape consumed by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generated answer text
    pub answer: String,

    /// Confidence score from the estimator
    pub confidence: f32,

    /// Citations in the order the evidence was supplied to the model
    pub citations: Vec<Citation>,

    /// How the answer was reasoned, including coverage and enrichment notes
    pub reasoning_summary: String,
}
