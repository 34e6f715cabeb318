//! trustgate core library
//!
//! Scores third-party ML artifacts against trust/quality metrics and
//! decides registry admission.
//!
//! Flow: [`enrich::Enricher`] gathers evidence into an
//! [`EvaluationContext`], [`scorer::ParallelScorer`] runs every registered
//! [`metric::Metric`] concurrently into an [`AggregatedAudit`], and
//! [`gate::evaluate_gate`] turns the audit into a [`GateDecision`].
//! [`pipeline::Evaluator`] wires the three together.

pub mod config;
pub mod domain;
pub mod enrich;
pub mod gate;
pub mod git;
pub mod metric;
pub mod metrics;
pub mod obs;
pub mod pipeline;
pub mod sandbox;
pub mod scorer;
pub mod telemetry;

pub use config::{GitConfig, MetricWeights, SandboxConfig, ScoringConfig, SizeLimits};

pub use domain::{
    build_contexts, is_not_applicable, parse_url, AggregatedAudit, ArtifactReference, Category,
    EvaluationContext, MetricName, MetricOutcome, Platform, Result, SizeBreakdown, TrustgateError,
    NOT_APPLICABLE,
};

pub use enrich::Enricher;

pub use gate::{evaluate_gate, FailingMetric, FailureReason, GateDecision, GateRule, GateRuleSet};

pub use metric::{Metric, MetricRegistry};

pub use metrics::{ReproducibilityDetails, ReproducibilityMetric, ReviewednessMetric};

pub use pipeline::{Evaluation, Evaluator, IngestReport};

pub use sandbox::{ScriptRunner, SubprocessRunner, SANDBOX_LIMITATIONS};

pub use scorer::{net_score, ParallelScorer};

pub use hub_client::{HuggingFaceClient, PlatformClient, StaticClient};
