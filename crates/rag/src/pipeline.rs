//! The retrieval-and-reasoning pipeline.
//!
//! One entry point, [`RagPipeline::answer`], wires the stages together:
//! domain resolution, parallel per-partition search, evidence aggregation,
//! confidence estimation, the enrichment gate, and answer composition.
//! Collaborator failures inside a stage degrade the answer; they never
//! surface to the caller as errors.

use crate::compose::AnswerComposer;
use crate::confidence::ConfidenceEstimator;
use crate::config::RagConfig;
use crate::enrich::{EnrichmentGate, EnrichmentOutcome, GateState, WebSearch};
use crate::registry::DomainRegistry;
use crate::store::VectorStore;
use crate::embed::Vectorizer;
use crate::types::{Answer, Hit};
use askdocs_llm::LlmClient;
use std::sync::Arc;
use std::time::Duration;

/// The orchestrator. Holds configuration and collaborators; stateless across
/// queries.
pub struct RagPipeline {
    config: RagConfig,
    registry: DomainRegistry,
    store: Arc<dyn VectorStore>,
    vectorizer: Arc<dyn Vectorizer>,
    llm: Arc<dyn LlmClient>,
    web: Arc<dyn WebSearch>,
    estimator: ConfidenceEstimator,
    gate: EnrichmentGate,
    composer: AnswerComposer,
}

impl RagPipeline {
    pub fn new(
        config: RagConfig,
        model: impl Into<String>,
        store: Arc<dyn VectorStore>,
        vectorizer: Arc<dyn Vectorizer>,
        llm: Arc<dyn LlmClient>,
        web: Arc<dyn WebSearch>,
    ) -> Self {
        let registry = DomainRegistry::new(config.domains.clone());
        let estimator = ConfidenceEstimator::new(config.coverage_penalty);
        let gate = EnrichmentGate::new(
            config.confidence_threshold,
            Duration::from_secs(config.enrichment.timeout_secs),
            config.enrichment.max_lookups,
        );
        let composer = AnswerComposer::new(
            model,
            config.completion.temperature,
            config.completion.max_tokens,
            Duration::from_secs(config.completion.timeout_secs),
        );

        Self {
            config,
            registry,
            store,
            vectorizer,
            llm,
            web,
            estimator,
            gate,
            composer,
        }
    }

    /// Answer a question over the indexed documents.
    ///
    /// Infallible by contract: embedding, search, enrichment, and completion
    /// failures all degrade within the pipeline.
    pub async fn answer(&self, question: &str, domain_hint: Option<&str>) -> Answer {
        let expected = self.registry.resolve(question, domain_hint);
        tracing::info!("Searching domains {:?}", expected);

        let query_embedding = match self.vectorizer.embed(question).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::error!("Failed to embed question: {}", e);
                return Answer {
                    answer: "The question could not be processed because embedding failed."
                        .to_string(),
                    confidence: 0.0,
                    citations: Vec::new(),
                    reasoning_summary: "Query embedding failed; no retrieval was performed."
                        .to_string(),
                };
            }
        };

        let per_domain_hits = self.search_partitions(&expected, &query_embedding).await;
        let evidence = crate::aggregate::aggregate(per_domain_hits, self.config.top_k);

        let confidence = self.estimator.estimate(&evidence, &expected);
        let gap = self.estimator.coverage_gap(&evidence, &expected);
        tracing::info!(
            "Evidence: {} entries, confidence {:.3}, coverage gap {:?}",
            evidence.len(),
            confidence,
            gap
        );

        let enrichment: Option<EnrichmentOutcome> =
            match self.gate.evaluate(confidence, &gap) {
                GateState::Sufficient => None,
                GateState::Enrich if !self.config.enrichment.enabled => {
                    tracing::debug!("Enrichment gate fired but enrichment is disabled");
                    None
                }
                GateState::Enrich => {
                    Some(self.gate.run(self.web.as_ref(), question, &gap).await)
                }
            };

        self.composer
            .compose(
                self.llm.as_ref(),
                &self.estimator,
                question,
                &evidence,
                &expected,
                confidence,
                enrichment.as_ref(),
            )
            .await
    }

    /// Fan out the search across partitions.
    ///
    /// Partitions are queried concurrently; a failed partition is logged and
    /// contributes no hits. Results come back in sorted domain order, which
    /// keeps downstream aggregation deterministic.
    async fn search_partitions(
        &self,
        domains: &std::collections::BTreeSet<String>,
        query_embedding: &[f32],
    ) -> Vec<(String, Vec<Hit>)> {
        let searches = domains.iter().map(|domain| {
            let store = Arc::clone(&self.store);
            let k = self.config.per_domain_k;
            async move {
                let hits = match store.search(domain, query_embedding, k).await {
                    Ok(hits) => hits,
                    Err(e) => {
                        tracing::warn!("Search failed for partition '{}': {}", domain, e);
                        Vec::new()
                    }
                };
                (domain.clone(), hits)
            }
        });

        futures::future::join_all(searches).await
    }
}
