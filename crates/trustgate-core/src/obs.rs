//! Structured lifecycle events for evaluations.
//!
//! Every evaluation runs inside an [`evaluation_span`]; the `emit_*` helpers
//! log one event each with a stable `event` field so log pipelines can key
//! on it.

use tracing::{info, warn};

/// Span tagging everything logged during one evaluation.
///
/// Attach it to the evaluation future with `tracing::Instrument` so it
/// follows the task across await points.
///
/// ```ignore
/// evaluate(ctx).instrument(evaluation_span(&id, "google/bert")).await
/// ```
pub fn evaluation_span(evaluation_id: &str, artifact: &str) -> tracing::Span {
    tracing::info_span!(
        "trustgate.evaluation",
        evaluation_id = %evaluation_id,
        artifact = %artifact,
    )
}

pub fn emit_evaluation_started(evaluation_id: &str, artifact: &str, metric_count: usize) {
    info!(
        event = "evaluation.started",
        evaluation_id = %evaluation_id,
        artifact = %artifact,
        metric_count = metric_count,
    );
}

pub fn emit_metric_completed(artifact: &str, metric: &str, score: f64, latency_ms: u64) {
    info!(
        event = "metric.completed",
        artifact = %artifact,
        metric = %metric,
        score = score,
        latency_ms = latency_ms,
    );
}

/// A metric errored or panicked; its score has been replaced with 0.
pub fn emit_metric_failed(artifact: &str, metric: &str, error: &dyn std::fmt::Display) {
    warn!(
        event = "metric.failed",
        artifact = %artifact,
        metric = %metric,
        error = %error,
    );
}

pub fn emit_evaluation_finished(
    evaluation_id: &str,
    artifact: &str,
    net_score: f64,
    duration_ms: u64,
) {
    info!(
        event = "evaluation.finished",
        evaluation_id = %evaluation_id,
        artifact = %artifact,
        net_score = net_score,
        duration_ms = duration_ms,
    );
}

pub fn emit_gate_evaluated(artifact: &str, passes: bool, failing: usize) {
    info!(
        event = "gate.evaluated",
        artifact = %artifact,
        passes = passes,
        failing = failing,
    );
}

/// A code sample was refused before execution. Only the digest is logged,
/// never the sample text.
pub fn emit_sample_blocked(artifact: &str, sample_index: usize, digest: &str, patterns: &[&str]) {
    warn!(
        event = "sandbox.sample_blocked",
        artifact = %artifact,
        sample_index = sample_index,
        sha256 = %digest,
        patterns = %patterns.join(","),
    );
}
