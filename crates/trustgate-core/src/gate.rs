//! Admission quality gate.
//!
//! Applies per-metric thresholds to an [`AggregatedAudit`] and produces a
//! [`GateDecision`]: a pure function of the audit and the rule set, with no
//! I/O and no state.

use serde::{Deserialize, Serialize};

use crate::domain::{is_not_applicable, round3, AggregatedAudit, MetricName};

/// Default threshold for every gated metric.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A metric must score at least `threshold` (inclusive).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GateRule {
    pub metric: MetricName,
    pub threshold: f64,
}

impl GateRule {
    pub fn new(metric: MetricName, threshold: f64) -> Self {
        Self { metric, threshold }
    }
}

/// The metrics that gate admission and their thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateRuleSet {
    pub rules: Vec<GateRule>,
}

impl Default for GateRuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl GateRuleSet {
    /// Every metric except `size_score`, each at [`DEFAULT_THRESHOLD`].
    pub fn standard() -> Self {
        let rules = [
            MetricName::Reproducibility,
            MetricName::CodeQuality,
            MetricName::License,
            MetricName::DatasetQuality,
            MetricName::RampUpTime,
            MetricName::BusFactor,
            MetricName::PerformanceClaims,
            MetricName::DatasetAndCodeScore,
            MetricName::Reviewedness,
        ]
        .into_iter()
        .map(|metric| GateRule::new(metric, DEFAULT_THRESHOLD))
        .collect();
        Self { rules }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule, replacing any existing rule for the same metric.
    pub fn with_rule(mut self, rule: GateRule) -> Self {
        self.rules.retain(|r| r.metric != rule.metric);
        self.rules.push(rule);
        self
    }

    pub fn threshold(&self, metric: MetricName) -> Option<f64> {
        self.rules
            .iter()
            .find(|r| r.metric == metric)
            .map(|r| r.threshold)
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    BelowThreshold,
    /// The audit has no outcome for a gated metric.
    Missing,
}

/// One gated metric that did not clear its threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailingMetric {
    pub metric: MetricName,
    pub score: f64,
    pub threshold: f64,
    /// `score - threshold`, rounded to three decimals; always negative.
    pub gap: f64,
    pub reason: FailureReason,
}

impl FailingMetric {
    fn new(metric: MetricName, score: f64, threshold: f64, reason: FailureReason) -> Self {
        Self {
            metric,
            score,
            threshold,
            gap: round3(score - threshold),
            reason,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateDecision {
    pub passes: bool,
    pub failing_metrics: Vec<FailingMetric>,
}

impl GateDecision {
    fn from_failures(failing_metrics: Vec<FailingMetric>) -> Self {
        Self {
            passes: failing_metrics.is_empty(),
            failing_metrics,
        }
    }

    /// One line per failing metric, for rejection messages.
    pub fn explain(&self) -> String {
        self.failing_metrics
            .iter()
            .map(|f| match f.reason {
                FailureReason::BelowThreshold => format!(
                    "{}: {:.3} < {:.3} (gap {:.3})",
                    f.metric, f.score, f.threshold, f.gap
                ),
                FailureReason::Missing => format!("{}: no score recorded", f.metric),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Evaluate an audit against a rule set.
///
/// Not-applicable scores are skipped: they neither pass nor fail.
pub fn evaluate_gate(rule_set: &GateRuleSet, audit: &AggregatedAudit) -> GateDecision {
    let failing = rule_set
        .rules
        .iter()
        .filter_map(|rule| check_rule(rule, audit))
        .collect();
    GateDecision::from_failures(failing)
}

fn check_rule(rule: &GateRule, audit: &AggregatedAudit) -> Option<FailingMetric> {
    let Some(score) = audit.score(rule.metric) else {
        return Some(FailingMetric::new(
            rule.metric,
            0.0,
            rule.threshold,
            FailureReason::Missing,
        ));
    };
    if is_not_applicable(score) || score >= rule.threshold {
        return None;
    }
    Some(FailingMetric::new(
        rule.metric,
        score,
        rule.threshold,
        FailureReason::BelowThreshold,
    ))
}
