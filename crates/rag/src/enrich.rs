//! Enrichment gate: bounded external web lookups for weak evidence.
//!
//! The gate is a two-state machine. It stays `Sufficient` while internal
//! evidence is confident and covers every expected domain; it transitions to
//! `Enrich` when confidence drops below the threshold or a coverage gap
//! exists. Enrichment issues at most one timeout-bounded lookup per missing
//! domain, never retries, and degrades back to `Sufficient` behavior on any
//! failure. The failures are reported so the reasoning summary can record
//! them.

use crate::types::EnrichmentResult;
use askdocs_core::{AppError, AppResult};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

/// Maximum length of an external summary, in characters.
const MAX_SUMMARY_CHARS: usize = 200;

/// Gate decision for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Internal evidence suffices; no external call.
    Sufficient,
    /// External enrichment is required.
    Enrich,
}

/// External web-search collaborator boundary.
#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    /// Source label used in citations and summaries (e.g., "duckduckgo").
    fn source_name(&self) -> &str;

    /// Fetch a short summary for a query, or fail.
    async fn search_web(&self, query: &str) -> AppResult<String>;
}

/// Outcome of running the gate, including what failed.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentOutcome {
    /// Whether any external lookup was attempted.
    pub attempted: bool,

    /// Successful lookups, one per topic.
    pub results: Vec<EnrichmentResult>,

    /// Human-readable failure notes ("hr: request timed out").
    pub failures: Vec<String>,
}

impl EnrichmentOutcome {
    /// Topics that produced usable content.
    pub fn covered_topics(&self) -> BTreeSet<String> {
        self.results.iter().map(|r| r.topic.clone()).collect()
    }
}

/// The enrichment gate.
#[derive(Debug, Clone)]
pub struct EnrichmentGate {
    confidence_threshold: f32,
    timeout: Duration,
    max_lookups: usize,
}

impl EnrichmentGate {
    pub fn new(confidence_threshold: f32, timeout: Duration, max_lookups: usize) -> Self {
        Self {
            confidence_threshold,
            timeout,
            max_lookups,
        }
    }

    /// Decide whether enrichment is required.
    ///
    /// Fires iff confidence is below the threshold OR the coverage gap is
    /// non-empty.
    pub fn evaluate(&self, confidence: f32, gap: &BTreeSet<String>) -> GateState {
        if confidence < self.confidence_threshold || !gap.is_empty() {
            GateState::Enrich
        } else {
            GateState::Sufficient
        }
    }

    /// Run bounded enrichment lookups.
    ///
    /// One lookup per missing domain (capped at `max_lookups`); when the gap
    /// is empty but confidence was low, a single lookup on the question
    /// itself. Each lookup gets one attempt under the configured timeout.
    pub async fn run(
        &self,
        web: &dyn WebSearch,
        question: &str,
        gap: &BTreeSet<String>,
    ) -> EnrichmentOutcome {
        let topics: Vec<(String, String)> = if gap.is_empty() {
            vec![(question.to_string(), question.to_string())]
        } else {
            gap.iter()
                .map(|domain| (domain.clone(), format!("{} {}", question, domain)))
                .collect()
        };

        let mut outcome = EnrichmentOutcome {
            attempted: true,
            ..Default::default()
        };

        for (topic, query) in topics.into_iter().take(self.max_lookups) {
            tracing::info!("Enrichment lookup for topic '{}'", topic);

            match tokio::time::timeout(self.timeout, web.search_web(&query)).await {
                Ok(Ok(summary)) => {
                    outcome.results.push(EnrichmentResult {
                        topic,
                        source: web.source_name().to_string(),
                        summary,
                    });
                }
                Ok(Err(e)) => {
                    tracing::warn!("Enrichment failed for topic '{}': {}", topic, e);
                    outcome.failures.push(format!("{}: {}", topic, e));
                }
                Err(_) => {
                    tracing::warn!(
                        "Enrichment timed out for topic '{}' after {:?}",
                        topic,
                        self.timeout
                    );
                    outcome.failures.push(format!("{}: request timed out", topic));
                }
            }
        }

        outcome
    }
}

/// DuckDuckGo Instant Answer API response, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text", default)]
    text: String,
}

/// Web search client backed by the DuckDuckGo Instant Answer API.
pub struct DuckDuckGoClient {
    base_url: String,
    client: reqwest::Client,
}

impl DuckDuckGoClient {
    pub fn new() -> Self {
        Self::with_base_url("https://api.duckduckgo.com")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for DuckDuckGoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WebSearch for DuckDuckGoClient {
    fn source_name(&self) -> &str {
        "duckduckgo"
    }

    async fn search_web(&self, query: &str) -> AppResult<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Enrichment(format!("Web search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Enrichment(format!(
                "Web search error ({})",
                response.status()
            )));
        }

        let answer: InstantAnswer = response
            .json()
            .await
            .map_err(|e| AppError::Enrichment(format!("Failed to parse search response: {}", e)))?;

        let summary = if !answer.abstract_text.is_empty() {
            answer.abstract_text
        } else {
            answer
                .related_topics
                .into_iter()
                .map(|t| t.text)
                .find(|t| !t.is_empty())
                .ok_or_else(|| AppError::Enrichment("No results".to_string()))?
        };

        Ok(truncate_summary(&summary, MAX_SUMMARY_CHARS))
    }
}

/// Truncate a summary on a char boundary.
fn truncate_summary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
