//! Confidence estimation over aggregated evidence.
//!
//! A pure function of the evidence's distance distribution and the coverage
//! of the expected domains. Identical inputs always produce identical
//! scores, so the estimator can be unit-tested without any collaborator.

use crate::types::AggregatedEvidence;
use std::collections::BTreeSet;

/// Derives a scalar confidence in `[0, 1]` from aggregated evidence.
///
/// The base score is `1 / (1 + mean_distance)`, so stronger (lower-distance)
/// evidence approaches 1. When expected domains are missing from the
/// evidence, a multiplicative penalty proportional to the missing fraction
/// is applied: more missing domains never increase the score. Empty evidence
/// scores exactly 0.
#[derive(Debug, Clone)]
pub struct ConfidenceEstimator {
    coverage_penalty: f32,
}

impl ConfidenceEstimator {
    /// Create an estimator with the given coverage penalty weight (0..=1).
    pub fn new(coverage_penalty: f32) -> Self {
        Self {
            coverage_penalty: coverage_penalty.clamp(0.0, 1.0),
        }
    }

    /// Estimate confidence for evidence against the expected domain set.
    pub fn estimate(&self, evidence: &AggregatedEvidence, expected: &BTreeSet<String>) -> f32 {
        self.estimate_with_extra_coverage(evidence, expected, &BTreeSet::new())
    }

    /// Estimate confidence counting `extra_covered` domains as present.
    ///
    /// Used once after enrichment fires: externally looked-up topics count
    /// toward coverage, everything else follows the same formula.
    pub fn estimate_with_extra_coverage(
        &self,
        evidence: &AggregatedEvidence,
        expected: &BTreeSet<String>,
        extra_covered: &BTreeSet<String>,
    ) -> f32 {
        if evidence.is_empty() {
            return 0.0;
        }

        let scores = evidence.scores();
        let mean_distance: f32 = scores.iter().sum::<f32>() / scores.len() as f32;
        let base = 1.0 / (1.0 + mean_distance.max(0.0));

        let covered = evidence.domains();
        let missing = expected
            .iter()
            .filter(|d| !covered.contains(*d) && !extra_covered.contains(*d))
            .count();

        let factor = if expected.is_empty() {
            1.0
        } else {
            let missing_fraction = missing as f32 / expected.len() as f32;
            (1.0 - self.coverage_penalty * missing_fraction).max(0.0)
        };

        base * factor
    }

    /// Expected domains absent from the evidence.
    pub fn coverage_gap(
        &self,
        evidence: &AggregatedEvidence,
        expected: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        let covered = evidence.domains();
        expected
            .iter()
            .filter(|d| !covered.contains(*d))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hit;

    fn hit(chunk_id: &str, domain: &str, score: f32) -> Hit {
        Hit {
            chunk_id: chunk_id.to_string(),
            filename: format!("{}.txt", chunk_id),
            domain: domain.to_string(),
            text: "text".to_string(),
            score,
        }
    }

    fn domains(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_empty_evidence_is_exactly_zero() {
        let estimator = ConfidenceEstimator::new(0.5);
        let evidence = AggregatedEvidence::default();
        assert_eq!(estimator.estimate(&evidence, &domains(&["hr"])), 0.0);
    }

    #[test]
    fn test_deterministic() {
        let estimator = ConfidenceEstimator::new(0.5);
        let evidence = AggregatedEvidence::from_hits(vec![
            hit("a", "finance", 1.39),
            hit("b", "finance", 1.72),
        ]);
        let expected = domains(&["finance", "hr"]);

        let first = estimator.estimate(&evidence, &expected);
        let second = estimator.estimate(&evidence, &expected);
        assert_eq!(first, second);
    }

    #[test]
    fn test_lower_distance_raises_confidence() {
        let estimator = ConfidenceEstimator::new(0.5);
        let strong = AggregatedEvidence::from_hits(vec![hit("a", "finance", 0.1)]);
        let weak = AggregatedEvidence::from_hits(vec![hit("b", "finance", 1.8)]);
        let expected = domains(&["finance"]);

        assert!(estimator.estimate(&strong, &expected) > estimator.estimate(&weak, &expected));
    }

    #[test]
    fn test_full_coverage_no_penalty() {
        let estimator = ConfidenceEstimator::new(0.5);
        let evidence = AggregatedEvidence::from_hits(vec![hit("a", "finance", 1.0)]);

        let score = estimator.estimate(&evidence, &domains(&["finance"]));
        // 1 / (1 + 1.0), no penalty
        assert!((score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_missing_domains_monotonic_penalty() {
        let estimator = ConfidenceEstimator::new(0.5);
        let evidence = AggregatedEvidence::from_hits(vec![hit("a", "finance", 1.0)]);

        let none_missing = estimator.estimate(&evidence, &domains(&["finance"]));
        let one_missing = estimator.estimate(&evidence, &domains(&["finance", "hr"]));
        let two_missing =
            estimator.estimate(&evidence, &domains(&["finance", "hr", "sustainability"]));

        assert!(none_missing > one_missing);
        assert!(one_missing > two_missing);
    }

    #[test]
    fn test_penalty_is_total_at_full_miss() {
        // Penalty weight 1.0 and nothing covered drives confidence to zero
        let estimator = ConfidenceEstimator::new(1.0);
        let evidence = AggregatedEvidence::from_hits(vec![hit("a", "general", 0.2)]);

        let score = estimator.estimate(&evidence, &domains(&["hr"]));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_extra_coverage_lifts_penalty() {
        let estimator = ConfidenceEstimator::new(0.5);
        let evidence = AggregatedEvidence::from_hits(vec![hit("a", "finance", 1.0)]);
        let expected = domains(&["finance", "hr"]);

        let without = estimator.estimate(&evidence, &expected);
        let with = estimator.estimate_with_extra_coverage(&evidence, &expected, &domains(&["hr"]));

        assert!(with > without);
        // hr now covered, so no penalty remains
        assert!((with - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_coverage_gap() {
        let estimator = ConfidenceEstimator::new(0.5);
        let evidence = AggregatedEvidence::from_hits(vec![hit("a", "finance", 1.0)]);

        let gap = estimator.coverage_gap(&evidence, &domains(&["finance", "hr"]));
        assert_eq!(gap, domains(&["hr"]));
    }

    #[test]
    fn test_no_expected_domains_no_penalty() {
        let estimator = ConfidenceEstimator::new(0.5);
        let evidence = AggregatedEvidence::from_hits(vec![hit("a", "finance", 1.0)]);
        let score = estimator.estimate(&evidence, &BTreeSet::new());
        assert!((score - 0.5).abs() < 1e-6);
    }
}
