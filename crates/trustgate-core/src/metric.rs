//! The metric contract and the registry of active metrics.

use std::sync::Arc;

use async_trait::async_trait;
use hub_client::PlatformClient;

use crate::config::ScoringConfig;
use crate::domain::{EvaluationContext, MetricName, MetricOutcome};
use crate::metrics::{
    BusFactorMetric, CodeQualityMetric, DatasetAndCodeMetric, DatasetQualityMetric, LicenseMetric,
    PerformanceClaimsMetric, RampUpMetric, ReproducibilityMetric, ReviewednessMetric, SizeMetric,
};
use crate::sandbox::ScriptRunner;

/// A single trust/quality check.
///
/// `compute` reads the context and never mutates it. Anticipated failures
/// (missing documentation, unreachable repository) map to a defined score;
/// an `Err` is reserved for the unexpected and is scored 0 by the scorer.
#[async_trait]
pub trait Metric: Send + Sync {
    fn name(&self) -> MetricName;

    async fn compute(
        &self,
        ctx: &EvaluationContext,
        config: &ScoringConfig,
    ) -> anyhow::Result<MetricOutcome>;
}

/// Ordered set of active metrics, built once at startup.
#[derive(Clone, Default)]
pub struct MetricRegistry {
    metrics: Vec<Arc<dyn Metric>>,
}

impl MetricRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every built-in metric.
    pub fn standard(platform: Arc<dyn PlatformClient>, runner: Arc<dyn ScriptRunner>) -> Self {
        Self::empty()
            .with_metric(RampUpMetric)
            .with_metric(BusFactorMetric)
            .with_metric(PerformanceClaimsMetric)
            .with_metric(LicenseMetric)
            .with_metric(SizeMetric)
            .with_metric(DatasetAndCodeMetric)
            .with_metric(DatasetQualityMetric::new(platform))
            .with_metric(CodeQualityMetric)
            .with_metric(ReproducibilityMetric::new(runner))
            .with_metric(ReviewednessMetric)
    }

    /// Register a metric, replacing any existing one with the same name.
    pub fn with_metric(mut self, metric: impl Metric + 'static) -> Self {
        let metric: Arc<dyn Metric> = Arc::new(metric);
        self.metrics.retain(|m| m.name() != metric.name());
        self.metrics.push(metric);
        self
    }

    pub fn metrics(&self) -> &[Arc<dyn Metric>] {
        &self.metrics
    }

    pub fn names(&self) -> Vec<MetricName> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("metrics", &self.names())
            .finish()
    }
}
