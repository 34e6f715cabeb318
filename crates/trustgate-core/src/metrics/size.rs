//! Deployability across device classes by estimated model size.

use std::sync::OnceLock;
use std::time::Instant;

use async_trait::async_trait;
use regex::Regex;

use crate::config::{ScoringConfig, SizeLimits};
use crate::domain::{EvaluationContext, MetricName, MetricOutcome, SizeBreakdown};
use crate::metric::Metric;

/// Bytes per parameter assumed when only a parameter count is known (fp16).
const BYTES_PER_PARAM: f64 = 2.0;
const BYTES_PER_GB: f64 = 1e9;

/// Score for a model of `size_gb` on a device with `limit_gb` of memory.
///
/// Piecewise linear over `r = size / limit`: 1.0 up to r = 0.5, 0.8 at
/// r = 1, 0.5 at r = 2 and 0.0 from r = 4.
pub fn device_score(size_gb: f64, limit_gb: f64) -> f64 {
    if limit_gb <= 0.0 {
        return 0.0;
    }
    let r = size_gb / limit_gb;
    let score = if r <= 0.5 {
        1.0
    } else if r <= 1.0 {
        1.0 - 0.2 * (r - 0.5) / 0.5
    } else if r <= 2.0 {
        0.8 - 0.3 * (r - 1.0)
    } else if r < 4.0 {
        0.5 - 0.25 * (r - 2.0)
    } else {
        0.0
    };
    score.clamp(0.0, 1.0)
}

fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(gb|mb|billion|million|b|m)\b")
            .expect("size pattern must compile")
    })
}

/// Estimated size in GB from `7B`, `270M`, `13.5GB`, `7 billion` and the
/// like. An explicit byte size wins over a parameter count.
pub fn size_from_text(text: &str) -> Option<f64> {
    let mut from_params = None;
    for caps in size_pattern().captures_iter(text) {
        let Ok(value) = caps[1].parse::<f64>() else {
            continue;
        };
        match caps[2].to_lowercase().as_str() {
            "gb" => return Some(value),
            "mb" => return Some(value / 1000.0),
            "b" | "billion" => {
                from_params.get_or_insert(value * 1e9 * BYTES_PER_PARAM / BYTES_PER_GB);
            }
            _ => {
                from_params.get_or_insert(value * 1e6 * BYTES_PER_PARAM / BYTES_PER_GB);
            }
        }
    }
    from_params
}

/// Estimated size in GB, from the parameter count when the platform reports
/// one, else from the documentation.
pub fn estimate_size_gb(ctx: &EvaluationContext) -> Option<f64> {
    ctx.platform_metadata
        .as_ref()
        .and_then(|i| i.parameter_count)
        .map(|params| params as f64 * BYTES_PER_PARAM / BYTES_PER_GB)
        .or_else(|| ctx.documentation.as_deref().and_then(size_from_text))
}

/// Per-device scores; 0.5 everywhere when the size is unknown.
pub fn size_breakdown(ctx: &EvaluationContext, limits: &SizeLimits) -> SizeBreakdown {
    match estimate_size_gb(ctx) {
        Some(size) => SizeBreakdown {
            raspberry_pi: device_score(size, limits.raspberry_pi),
            jetson_nano: device_score(size, limits.jetson_nano),
            desktop_pc: device_score(size, limits.desktop_pc),
            aws_server: device_score(size, limits.aws_server),
        },
        None => SizeBreakdown::uniform(0.5),
    }
}

pub struct SizeMetric;

#[async_trait]
impl Metric for SizeMetric {
    fn name(&self) -> MetricName {
        MetricName::SizeScore
    }

    async fn compute(
        &self,
        ctx: &EvaluationContext,
        config: &ScoringConfig,
    ) -> anyhow::Result<MetricOutcome> {
        let started = Instant::now();
        let score = size_breakdown(ctx, &config.size_limits).mean();
        Ok(MetricOutcome::since(score, started))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{round3, ArtifactReference};
    use hub_client::ModelInfo;

    #[test]
    fn test_device_score_breakpoints() {
        assert_eq!(device_score(1.0, 2.0), 1.0);
        assert_eq!(round3(device_score(2.0, 2.0)), 0.8);
        assert_eq!(round3(device_score(4.0, 2.0)), 0.5);
        assert_eq!(device_score(10.0, 2.0), 0.0);
        assert_eq!(round3(device_score(3.0, 2.0)), 0.65);
    }

    #[test]
    fn test_size_from_text() {
        assert_eq!(size_from_text("weights are 13.5GB on disk"), Some(13.5));
        assert_eq!(size_from_text("a 7B model"), Some(14.0));
        assert_eq!(size_from_text("270M parameters"), Some(0.54));
        assert_eq!(size_from_text("7 billion params, 13 GB"), Some(13.0));
        assert_eq!(size_from_text("no numbers here"), None);
    }

    #[test]
    fn test_unknown_size_is_half_everywhere() {
        let ctx = EvaluationContext::new(ArtifactReference::huggingface_model("acme/tiny"));
        let b = size_breakdown(&ctx, &SizeLimits::default());
        assert_eq!(b, SizeBreakdown::uniform(0.5));
    }

    #[test]
    fn test_parameter_count_beats_readme() {
        let info = ModelInfo {
            parameter_count: Some(110_000_000),
            ..ModelInfo::default()
        };
        let ctx = EvaluationContext::new(ArtifactReference::huggingface_model("acme/tiny"))
            .with_platform_metadata(info)
            .with_documentation("a 70B model");
        let b = size_breakdown(&ctx, &SizeLimits::default());
        assert_eq!(b.raspberry_pi, 1.0);
        assert_eq!(b.aws_server, 1.0);
    }
}
