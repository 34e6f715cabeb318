//! End-to-end evaluation: enrich, score, gate.
//!
//! An [`Evaluator`] is built once at startup and shared; it holds no
//! per-evaluation state, so concurrent evaluations never see each other's
//! contexts.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use hub_client::{HuggingFaceClient, PlatformClient};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ScoringConfig;
use crate::domain::outcome::elapsed_ms;
use crate::domain::{round3, AggregatedAudit, ArtifactReference, EvaluationContext, Result};
use crate::enrich::Enricher;
use crate::gate::{evaluate_gate, FailingMetric, GateDecision};
use crate::metric::MetricRegistry;
use crate::obs;
use crate::sandbox::{ScriptRunner, SubprocessRunner};
use crate::scorer::ParallelScorer;

/// Result handed to the registration workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub evaluation_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub passes: bool,
    pub audit: AggregatedAudit,
    pub failing_metrics: Vec<FailingMetric>,
}

impl Evaluation {
    pub fn decision(&self) -> GateDecision {
        GateDecision {
            passes: self.passes,
            failing_metrics: self.failing_metrics.clone(),
        }
    }

    /// Caller-facing summary with scores rounded to three decimals.
    pub fn report(&self) -> IngestReport {
        IngestReport {
            evaluation_id: self.evaluation_id,
            evaluated_at: self.evaluated_at,
            name: self.audit.name().to_string(),
            passes: self.passes,
            net_score: round3(self.audit.net_score()),
            scores: self
                .audit
                .outcomes()
                .iter()
                .map(|(m, o)| (m.as_str().to_string(), round3(o.score)))
                .collect(),
            failing_metrics: self
                .failing_metrics
                .iter()
                .map(|f| FailingMetric {
                    score: round3(f.score),
                    threshold: round3(f.threshold),
                    ..f.clone()
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub evaluation_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub name: String,
    pub passes: bool,
    pub net_score: f64,
    pub scores: std::collections::BTreeMap<String, f64>,
    pub failing_metrics: Vec<FailingMetric>,
}

impl IngestReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub struct Evaluator {
    enricher: Enricher,
    scorer: ParallelScorer,
}

impl Evaluator {
    pub fn new(enricher: Enricher, scorer: ParallelScorer) -> Self {
        Self { enricher, scorer }
    }

    /// Evaluator with every built-in metric.
    pub fn standard(
        platform: Arc<dyn PlatformClient>,
        runner: Arc<dyn ScriptRunner>,
        config: ScoringConfig,
    ) -> Self {
        let registry = MetricRegistry::standard(Arc::clone(&platform), runner);
        Self::new(
            Enricher::new(platform),
            ParallelScorer::new(registry, Arc::new(config)),
        )
    }

    /// Production evaluator: HuggingFace client from `HF_ENDPOINT` /
    /// `HF_TOKEN` and the configured interpreter.
    pub fn from_env(config: ScoringConfig) -> Result<Self> {
        let platform: Arc<dyn PlatformClient> = Arc::new(HuggingFaceClient::from_env()?);
        let runner: Arc<dyn ScriptRunner> = Arc::new(SubprocessRunner::from_config(&config.sandbox));
        Ok(Self::standard(platform, runner, config))
    }

    pub fn config(&self) -> &ScoringConfig {
        self.scorer.config()
    }

    /// Evaluate a bare reference with no linked resources.
    pub async fn evaluate(&self, reference: ArtifactReference) -> Evaluation {
        self.evaluate_context(EvaluationContext::new(reference)).await
    }

    /// Enrich `ctx`, score it and apply the gate.
    pub async fn evaluate_context(&self, mut ctx: EvaluationContext) -> Evaluation {
        let evaluation_id = Uuid::new_v4();
        let id = evaluation_id.to_string();
        let artifact = ctx.artifact.canonical_name.clone();
        let started = Instant::now();

        let span = obs::evaluation_span(&id, &artifact);
        async move {
            obs::emit_evaluation_started(&id, &artifact, self.scorer.registry().len());

            self.enricher.enrich(&mut ctx).await;
            let audit = self.scorer.score(Arc::new(ctx)).await;
            let decision = evaluate_gate(&self.config().gate, &audit);

            obs::emit_gate_evaluated(&artifact, decision.passes, decision.failing_metrics.len());
            obs::emit_evaluation_finished(&id, &artifact, audit.net_score(), elapsed_ms(started));

            Evaluation {
                evaluation_id,
                evaluated_at: Utc::now(),
                passes: decision.passes,
                audit,
                failing_metrics: decision.failing_metrics,
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetricName, MetricOutcome};
    use crate::gate::GateRuleSet;
    use crate::metric::Metric;
    use async_trait::async_trait;
    use hub_client::StaticClient;

    struct Fixed(MetricName, f64);

    #[async_trait]
    impl Metric for Fixed {
        fn name(&self) -> MetricName {
            self.0
        }

        async fn compute(
            &self,
            _ctx: &EvaluationContext,
            _config: &ScoringConfig,
        ) -> anyhow::Result<MetricOutcome> {
            Ok(MetricOutcome::new(self.1, 2))
        }
    }

    fn evaluator(registry: MetricRegistry) -> Evaluator {
        Evaluator::new(
            Enricher::new(Arc::new(StaticClient::new())),
            ParallelScorer::new(registry, Arc::new(ScoringConfig::default())),
        )
    }

    #[tokio::test]
    async fn test_rejection_lists_failing_metric() {
        let registry = MetricRegistry::empty()
            .with_metric(Fixed(MetricName::License, 0.4))
            .with_metric(Fixed(MetricName::RampUpTime, 0.9));
        let config = ScoringConfig {
            gate: GateRuleSet::empty()
                .with_rule(crate::gate::GateRule::new(MetricName::License, 0.5))
                .with_rule(crate::gate::GateRule::new(MetricName::RampUpTime, 0.5)),
            ..ScoringConfig::default()
        };
        let evaluator = Evaluator::new(
            Enricher::new(Arc::new(StaticClient::new())),
            ParallelScorer::new(registry, Arc::new(config)),
        );

        let evaluation = evaluator
            .evaluate(ArtifactReference::huggingface_model("acme/tiny"))
            .await;
        assert!(!evaluation.passes);
        assert_eq!(evaluation.failing_metrics.len(), 1);
        assert_eq!(evaluation.failing_metrics[0].gap, -0.1);
        assert!(!evaluation.decision().passes);

        let report = evaluation.report();
        assert_eq!(report.scores["license"], 0.4);
        assert_eq!(report.name, "tiny");
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["failing_metrics"][0]["metric"], "license");
        assert_eq!(json["failing_metrics"][0]["reason"], "below_threshold");
    }

    #[tokio::test]
    async fn test_each_evaluation_gets_fresh_id() {
        let evaluator = evaluator(MetricRegistry::empty().with_metric(Fixed(MetricName::License, 1.0)));
        let a = evaluator
            .evaluate(ArtifactReference::huggingface_model("acme/tiny"))
            .await;
        let b = evaluator
            .evaluate(ArtifactReference::huggingface_model("acme/tiny"))
            .await;
        assert_ne!(a.evaluation_id, b.evaluation_id);
    }
}
