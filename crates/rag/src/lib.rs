//! Retrieval-and-reasoning orchestration for askdocs.
//!
//! The crate wires a fixed sequence of stages behind one entry point,
//! [`RagPipeline::answer`]:
//!
//! 1. **Registry**: map the query (or an explicit hint) to domain partitions
//! 2. **Store**: per-partition nearest-neighbor search, in parallel
//! 3. **Aggregate**: merge, dedup, rank, truncate the evidence
//! 4. **Confidence**: pure score over evidence strength and coverage
//! 5. **Enrichment gate**: bounded web lookups when evidence is weak
//! 6. **Composer**: citation-bearing structured answer via the LLM
//!
//! Collaborators (vector store, vectorizer, LLM, web search) sit behind
//! traits so they can be swapped or mocked; the shipped defaults are a
//! SQLite-backed store, a deterministic trigram embedder, and DuckDuckGo.

pub mod aggregate;
pub mod compose;
pub mod confidence;
pub mod config;
pub mod embed;
pub mod enrich;
pub mod ingest;
pub mod pipeline;
pub mod registry;
pub mod store;
pub mod types;

pub use compose::AnswerComposer;
pub use confidence::ConfidenceEstimator;
pub use config::{load_config, save_config, get_index_path, DomainConfig, RagConfig};
pub use embed::{TrigramVectorizer, Vectorizer};
pub use enrich::{DuckDuckGoClient, EnrichmentGate, GateState, WebSearch};
pub use ingest::{ingest_dir, ingest_file, IngestReport};
pub use pipeline::RagPipeline;
pub use registry::DomainRegistry;
pub use store::{PartitionStats, SqliteVectorStore, VectorStore};
pub use types::{AggregatedEvidence, Answer, Chunk, Citation, DocumentMeta, EnrichmentResult, Hit};

#[cfg(test)]
mod tests;
