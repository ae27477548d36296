//! Answer composition: evidence plus completion into a structured answer.
//!
//! The composer is the only component that talks to the completion provider
//! for answering. It never raises to the caller: completion failures and
//! timeouts produce a degraded answer that still carries the citations and a
//! reasoning summary explaining what happened.

use crate::confidence::ConfidenceEstimator;
use crate::enrich::EnrichmentOutcome;
use crate::types::{AggregatedEvidence, Answer, Citation};
use askdocs_llm::{LlmClient, LlmRequest};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

/// Characters of chunk text included per context block.
const SNIPPET_CHARS: usize = 300;

const SYSTEM_PROMPT: &str = "You are a careful analyst answering questions \
from retrieved document excerpts. Use only the provided context; do not \
invent facts. If the context is insufficient, say so plainly. Respond with a \
single JSON object and nothing else, with exactly these keys: \
\"answer\" (string), \"reasoning_summary\" (string, one or two sentences on \
how the answer follows from the context), \"missing_info\" (string, what the \
context lacks, or an empty string).";

/// The JSON object the model is instructed to return.
#[derive(Debug, Deserialize)]
struct ModelReply {
    answer: String,
    #[serde(default)]
    reasoning_summary: String,
    #[serde(default)]
    missing_info: String,
}

/// Builds the final structured answer from evidence and completion.
pub struct AnswerComposer {
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl AnswerComposer {
    pub fn new(model: impl Into<String>, temperature: f32, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            model: model.into(),
            temperature,
            max_tokens,
            timeout,
        }
    }

    /// Compose an answer. Infallible by contract: every failure mode maps to
    /// a degraded answer.
    ///
    /// `confidence` is the estimator's value for the evidence and is passed
    /// through verbatim, except for one recomputation when enrichment
    /// produced content (the external topics then count toward coverage).
    #[allow(clippy::too_many_arguments)]
    pub async fn compose(
        &self,
        llm: &dyn LlmClient,
        estimator: &ConfidenceEstimator,
        question: &str,
        evidence: &AggregatedEvidence,
        expected: &BTreeSet<String>,
        confidence: f32,
        enrichment: Option<&EnrichmentOutcome>,
    ) -> Answer {
        let citations = build_citations(evidence);
        let gap = estimator.coverage_gap(evidence, expected);

        let enrichment_results = enrichment.map(|o| o.results.as_slice()).unwrap_or(&[]);
        let enrichment_failures = enrichment.map(|o| o.failures.as_slice()).unwrap_or(&[]);

        let confidence = if enrichment_results.is_empty() {
            confidence
        } else {
            let extra = enrichment
                .map(|o| o.covered_topics())
                .unwrap_or_default();
            estimator.estimate_with_extra_coverage(evidence, expected, &extra)
        };

        // Nothing to ground an answer on: report that directly instead of
        // asking the model to reason over an empty context.
        if evidence.is_empty() && enrichment_results.is_empty() {
            return Answer {
                answer: "No relevant information was found in the indexed documents."
                    .to_string(),
                confidence: 0.0,
                citations,
                reasoning_summary: annotate_summary(
                    "No internal evidence was retrieved for this question.".to_string(),
                    &gap,
                    enrichment_failures,
                ),
            };
        }

        let prompt = build_prompt(question, evidence, enrichment_results);
        let request = LlmRequest::new(prompt, self.model.clone())
            .with_system(SYSTEM_PROMPT)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let completion = tokio::time::timeout(self.timeout, llm.complete(&request)).await;

        let (answer_text, mut summary) = match completion {
            Ok(Ok(response)) => parse_reply(&response.content),
            Ok(Err(e)) => {
                tracing::warn!("Completion failed: {}", e);
                return degraded_answer(citations, &gap, enrichment_failures);
            }
            Err(_) => {
                tracing::warn!("Completion timed out after {:?}", self.timeout);
                return degraded_answer(citations, &gap, enrichment_failures);
            }
        };

        summary = annotate_summary(summary, &gap, enrichment_failures);

        Answer {
            answer: answer_text,
            confidence,
            citations,
            reasoning_summary: summary,
        }
    }
}

fn build_citations(evidence: &AggregatedEvidence) -> Vec<Citation> {
    evidence
        .hits()
        .iter()
        .map(|h| Citation {
            filename: h.filename.clone(),
            score: h.score,
            domain: h.domain.clone(),
        })
        .collect()
}

fn build_prompt(
    question: &str,
    evidence: &AggregatedEvidence,
    enrichment: &[crate::types::EnrichmentResult],
) -> String {
    let mut prompt = String::from("Context:\n");

    for hit in evidence.hits() {
        let snippet: String = hit.text.chars().take(SNIPPET_CHARS).collect();
        prompt.push_str(&format!(
            "[{} | {} | score={:.3}] -> {}\n",
            hit.filename, hit.domain, hit.score, snippet
        ));
    }

    if !enrichment.is_empty() {
        prompt.push_str("\nExternal lookups (secondary, not from the document index):\n");
        for result in enrichment {
            prompt.push_str(&format!(
                "[web:{} | {}] -> {}\n",
                result.source, result.topic, result.summary
            ));
        }
    }

    prompt.push_str(&format!("\nQuestion: {}\n", question));
    prompt
}

/// Parse the model's JSON reply, falling back to the raw content.
///
/// Models do not always honor the strict-JSON instruction; a reply that is
/// not valid JSON (or lacks the `answer` key) is used verbatim as the answer
/// text.
fn parse_reply(content: &str) -> (String, String) {
    let trimmed = strip_code_fence(content.trim());

    match serde_json::from_str::<ModelReply>(trimmed) {
        Ok(reply) => {
            let mut summary = reply.reasoning_summary;
            if !reply.missing_info.is_empty() {
                if !summary.is_empty() {
                    summary.push(' ');
                }
                summary.push_str(&format!("Missing information: {}", reply.missing_info));
            }
            (reply.answer, summary)
        }
        Err(_) => {
            tracing::debug!("Model reply was not valid JSON; using raw content");
            (trimmed.to_string(), String::new())
        }
    }
}

/// Strip a surrounding markdown code fence, if present.
fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    let Some(rest) = rest.split_once('\n').map(|(_, body)| body) else {
        return content;
    };
    rest.trim_end().strip_suffix("```").unwrap_or(content).trim()
}

fn annotate_summary(mut summary: String, gap: &BTreeSet<String>, failures: &[String]) -> String {
    if !gap.is_empty() {
        let names: Vec<&str> = gap.iter().map(|s| s.as_str()).collect();
        if !summary.is_empty() {
            summary.push(' ');
        }
        summary.push_str(&format!(
            "No documents found for domain(s): {}.",
            names.join(", ")
        ));
    }

    if !failures.is_empty() {
        if !summary.is_empty() {
            summary.push(' ');
        }
        summary.push_str(&format!(
            "External enrichment failed for: {}.",
            failures.join("; ")
        ));
    }

    summary
}

fn degraded_answer(
    citations: Vec<Citation>,
    gap: &BTreeSet<String>,
    failures: &[String],
) -> Answer {
    Answer {
        answer: "The answer could not be generated because the completion provider \
                 was unavailable. The citations below list the evidence that was retrieved."
            .to_string(),
        confidence: 0.0,
        citations,
        reasoning_summary: annotate_summary(
            "Completion failed; returning retrieved evidence without a generated answer."
                .to_string(),
            gap,
            failures,
        ),
    }
}
