//! Metric outcomes and the aggregated audit built from them.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::artifact::Category;

/// Score meaning "precondition unmet", distinct from a genuine zero.
pub const NOT_APPLICABLE: f64 = -1.0;

/// Whether a score is exactly the not-applicable sentinel.
pub fn is_not_applicable(score: f64) -> bool {
    score == NOT_APPLICABLE
}

/// The closed set of metrics an audit can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    RampUpTime,
    BusFactor,
    PerformanceClaims,
    License,
    SizeScore,
    DatasetAndCodeScore,
    DatasetQuality,
    CodeQuality,
    Reproducibility,
    Reviewedness,
}

impl MetricName {
    /// Every metric, in report order.
    pub const ALL: [MetricName; 10] = [
        MetricName::RampUpTime,
        MetricName::BusFactor,
        MetricName::PerformanceClaims,
        MetricName::License,
        MetricName::SizeScore,
        MetricName::DatasetAndCodeScore,
        MetricName::DatasetQuality,
        MetricName::CodeQuality,
        MetricName::Reproducibility,
        MetricName::Reviewedness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RampUpTime => "ramp_up_time",
            MetricName::BusFactor => "bus_factor",
            MetricName::PerformanceClaims => "performance_claims",
            MetricName::License => "license",
            MetricName::SizeScore => "size_score",
            MetricName::DatasetAndCodeScore => "dataset_and_code_score",
            MetricName::DatasetQuality => "dataset_quality",
            MetricName::CodeQuality => "code_quality",
            MetricName::Reproducibility => "reproducibility",
            MetricName::Reviewedness => "reviewedness",
        }
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single metric computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricOutcome {
    /// Usually in `[0, 1]`; [`NOT_APPLICABLE`] when the metric does not apply.
    pub score: f64,
    pub latency_ms: u64,
}

impl MetricOutcome {
    pub fn new(score: f64, latency_ms: u64) -> Self {
        Self { score, latency_ms }
    }

    /// Outcome whose latency is measured from `started`.
    pub fn since(score: f64, started: Instant) -> Self {
        Self::new(score, elapsed_ms(started))
    }

    /// Substitute for a metric that errored or panicked.
    pub fn zero() -> Self {
        Self::new(0.0, 0)
    }

    pub fn is_applicable(&self) -> bool {
        !is_not_applicable(self.score)
    }

    /// Clamp an applicable score into `[0, 1]` (NaN becomes 0); the sentinel
    /// passes through unchanged.
    pub fn bounded(self) -> Self {
        if !self.is_applicable() {
            return self;
        }
        let score = if self.score.is_nan() {
            0.0
        } else {
            self.score.clamp(0.0, 1.0)
        };
        Self { score, ..self }
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Per-device deployability scores carried alongside `size_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeBreakdown {
    pub raspberry_pi: f64,
    pub jetson_nano: f64,
    pub desktop_pc: f64,
    pub aws_server: f64,
}

impl SizeBreakdown {
    pub fn uniform(score: f64) -> Self {
        Self {
            raspberry_pi: score,
            jetson_nano: score,
            desktop_pc: score,
            aws_server: score,
        }
    }

    pub fn mean(&self) -> f64 {
        (self.raspberry_pi + self.jetson_nano + self.desktop_pc + self.aws_server) / 4.0
    }
}

/// One outcome per metric plus the weighted net score.
///
/// Built once by the scorer and never mutated afterwards; fields are only
/// reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedAudit {
    name: String,
    category: Category,
    outcomes: BTreeMap<MetricName, MetricOutcome>,
    size_breakdown: Option<SizeBreakdown>,
    net_score: f64,
    net_score_latency_ms: u64,
}

impl AggregatedAudit {
    /// Assemble an audit. `net_score` is clamped into `[0, 1]`; a non-finite
    /// value becomes 0.
    pub fn new(
        name: impl Into<String>,
        category: Category,
        outcomes: BTreeMap<MetricName, MetricOutcome>,
        size_breakdown: Option<SizeBreakdown>,
        net_score: f64,
        net_score_latency_ms: u64,
    ) -> Self {
        let net_score = if net_score.is_finite() {
            net_score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            name: name.into(),
            category,
            outcomes,
            size_breakdown,
            net_score,
            net_score_latency_ms,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn outcomes(&self) -> &BTreeMap<MetricName, MetricOutcome> {
        &self.outcomes
    }

    pub fn outcome(&self, metric: MetricName) -> Option<&MetricOutcome> {
        self.outcomes.get(&metric)
    }

    pub fn score(&self, metric: MetricName) -> Option<f64> {
        self.outcome(metric).map(|o| o.score)
    }

    pub fn size_breakdown(&self) -> Option<&SizeBreakdown> {
        self.size_breakdown.as_ref()
    }

    pub fn net_score(&self) -> f64 {
        self.net_score
    }

    pub fn net_score_latency_ms(&self) -> u64 {
        self.net_score_latency_ms
    }

    /// Reserved tree score. Not yet implemented: always 0.0 with latency 0
    /// and weight 0 in the net score.
    pub fn treescore(&self) -> MetricOutcome {
        MetricOutcome::zero()
    }

    /// Flat NDJSON record: `<metric>` and `<metric>_latency` per metric,
    /// with `size_score` expanded into its device breakdown when known.
    pub fn to_record(&self) -> serde_json::Value {
        let mut record = serde_json::Map::new();
        record.insert("name".into(), self.name.clone().into());
        record.insert("category".into(), self.category.to_string().into());
        record.insert("net_score".into(), round3(self.net_score).into());
        record.insert("net_score_latency".into(), self.net_score_latency_ms.into());

        for (metric, outcome) in &self.outcomes {
            let value = match (metric, &self.size_breakdown) {
                (MetricName::SizeScore, Some(breakdown)) => serde_json::json!({
                    "raspberry_pi": round3(breakdown.raspberry_pi),
                    "jetson_nano": round3(breakdown.jetson_nano),
                    "desktop_pc": round3(breakdown.desktop_pc),
                    "aws_server": round3(breakdown.aws_server),
                }),
                _ => round3(outcome.score).into(),
            };
            record.insert(metric.as_str().into(), value);
            record.insert(
                format!("{}_latency", metric.as_str()),
                outcome.latency_ms.into(),
            );
        }

        let treescore = self.treescore();
        record.insert("treescore".into(), treescore.score.into());
        record.insert("treescore_latency".into(), treescore.latency_ms.into());
        serde_json::Value::Object(record)
    }
}

/// Round to three decimal places for reporting.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
