//! Reproducibility with a real interpreter. Skipped when `python3` is absent.

use std::process::Command;
use std::sync::Arc;
use std::time::{Duration, Instant};

use trustgate_core::{
    ArtifactReference, EvaluationContext, Metric, ReproducibilityMetric, SandboxConfig,
    ScoringConfig, SubprocessRunner,
};

fn python_available() -> bool {
    Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn config(timeout_secs: u64) -> ScoringConfig {
    ScoringConfig {
        sandbox: SandboxConfig {
            timeout_secs,
            ..SandboxConfig::default()
        },
        ..ScoringConfig::default()
    }
}

async fn score(doc: &str, config: &ScoringConfig) -> f64 {
    let metric = ReproducibilityMetric::new(Arc::new(SubprocessRunner::from_config(&config.sandbox)));
    let ctx = EvaluationContext::new(ArtifactReference::huggingface_model("acme/tiny"))
        .with_documentation(doc);
    metric.compute(&ctx, config).await.unwrap().score
}

#[tokio::test]
async fn sample_that_runs_scores_one() {
    if !python_available() {
        return;
    }
    let doc = "# Tiny\n```python\nprint(sum(range(10)))\n```\n";
    assert_eq!(score(doc, &config(15)).await, 1.0);
}

#[tokio::test]
async fn sample_fixed_by_placeholder_substitution_scores_half() {
    if !python_available() {
        return;
    }
    let doc = "```python\nprint(model_name.upper())\n```";
    assert_eq!(score(doc, &config(15)).await, 0.5);
}

#[tokio::test]
async fn broken_sample_scores_zero() {
    if !python_available() {
        return;
    }
    let doc = "```python\nraise ValueError('nope')\n```";
    assert_eq!(score(doc, &config(15)).await, 0.0);
}

#[tokio::test]
async fn dangerous_sample_is_refused() {
    if !python_available() {
        return;
    }
    let doc = "```python\nimport os\nos.system('true')\nprint('ran')\n```";
    assert_eq!(score(doc, &config(15)).await, 0.0);
}

#[tokio::test]
async fn infinite_loop_is_cut_off_by_deadline() {
    if !python_available() {
        return;
    }
    let doc = "```python\nwhile True:\n    pass\n```";
    let started = Instant::now();
    assert_eq!(score(doc, &config(1)).await, 0.0);
    // unmodified run plus one fixed retry, each bounded by the deadline
    assert!(started.elapsed() < Duration::from_secs(10));
}
