//! Can the model be run from the code samples in its own documentation?
//!
//! 1.0 when a sample runs unmodified, 0.5 when one runs after the bounded
//! auto-fixes, 0.0 otherwise. Samples matching the danger blacklist are
//! never executed; see [`crate::sandbox::SANDBOX_LIMITATIONS`] for what the
//! sandbox does not protect against.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::ScoringConfig;
use crate::domain::{EvaluationContext, MetricName, MetricOutcome};
use crate::metric::Metric;
use crate::obs;
use crate::sandbox::{
    apply_safe_fixes, extract_code_samples, run_sample, scan_sample, ScanVerdict, ScriptRunner,
};

const RUNS_UNMODIFIED: f64 = 1.0;
const RUNS_AFTER_FIXES: f64 = 0.5;
const DOES_NOT_RUN: f64 = 0.0;

/// Breakdown of one reproducibility assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReproducibilityDetails {
    pub model_id: String,
    pub score: f64,
    pub total_samples: usize,
    pub safe_samples: usize,
    pub unsafe_samples: usize,
    pub has_dangerous_operations: bool,
    pub documentation_exists: bool,
}

pub struct ReproducibilityMetric {
    runner: Arc<dyn ScriptRunner>,
}

impl ReproducibilityMetric {
    pub fn new(runner: Arc<dyn ScriptRunner>) -> Self {
        Self { runner }
    }

    /// Full assessment: sample counts plus the score.
    pub async fn details(
        &self,
        ctx: &EvaluationContext,
        config: &ScoringConfig,
    ) -> anyhow::Result<ReproducibilityDetails> {
        let model_id = ctx.artifact_id();
        let mut details = ReproducibilityDetails {
            model_id: model_id.clone(),
            score: DOES_NOT_RUN,
            total_samples: 0,
            safe_samples: 0,
            unsafe_samples: 0,
            has_dangerous_operations: false,
            documentation_exists: false,
        };

        let Some(doc) = ctx.documentation.as_deref().filter(|d| !d.trim().is_empty()) else {
            return Ok(details);
        };
        details.documentation_exists = true;

        let samples = extract_code_samples(doc, &config.sandbox.fence_languages)?;
        details.total_samples = samples.len();

        let safe: Vec<&str> = samples
            .iter()
            .enumerate()
            .filter_map(|(index, code)| match scan_sample(code) {
                ScanVerdict::Safe => Some(code.as_str()),
                ScanVerdict::Unsafe { matched } => {
                    obs::emit_sample_blocked(&model_id, index, &sample_digest(code), &matched);
                    None
                }
            })
            .collect();
        details.safe_samples = safe.len();
        details.unsafe_samples = samples.len() - safe.len();
        details.has_dangerous_operations = details.unsafe_samples > 0;

        details.score = self.execute(&model_id, &safe, config).await;
        Ok(details)
    }

    async fn execute(&self, model_id: &str, safe: &[&str], config: &ScoringConfig) -> f64 {
        if safe.is_empty() {
            return DOES_NOT_RUN;
        }
        for code in safe {
            if self.runs(code, config).await {
                return RUNS_UNMODIFIED;
            }
        }
        for (index, code) in safe.iter().enumerate() {
            let fixed = apply_safe_fixes(code, model_id);
            if let ScanVerdict::Unsafe { matched } = scan_sample(&fixed) {
                obs::emit_sample_blocked(model_id, index, &sample_digest(&fixed), &matched);
                continue;
            }
            if self.runs(&fixed, config).await {
                return RUNS_AFTER_FIXES;
            }
        }
        DOES_NOT_RUN
    }

    async fn runs(&self, code: &str, config: &ScoringConfig) -> bool {
        match run_sample(self.runner.as_ref(), code, &config.sandbox).await {
            Ok(report) => {
                debug!(outcome = ?report.outcome, elapsed_ms = report.elapsed_ms, "sample executed");
                report.succeeded()
            }
            Err(e) => {
                warn!(error = %e, "sample could not be executed");
                false
            }
        }
    }
}

fn sample_digest(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

#[async_trait]
impl Metric for ReproducibilityMetric {
    fn name(&self) -> MetricName {
        MetricName::Reproducibility
    }

    async fn compute(
        &self,
        ctx: &EvaluationContext,
        config: &ScoringConfig,
    ) -> anyhow::Result<MetricOutcome> {
        let started = Instant::now();
        let details = self.details(ctx, config).await?;
        Ok(MetricOutcome::since(details.score, started))
    }
}
