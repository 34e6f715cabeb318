//! License clarity and compatibility.

use std::sync::OnceLock;
use std::time::Instant;

use async_trait::async_trait;
use regex::Regex;

use crate::config::ScoringConfig;
use crate::domain::{EvaluationContext, MetricName, MetricOutcome};
use crate::metric::Metric;

const COMPATIBLE: &[&str] = &["apache-2.0", "mit", "bsd-3-clause"];
const RESTRICTIVE: &[&str] = &["gpl", "agpl", "commercial", "proprietary", "all rights reserved"];

struct LicensePatterns {
    sections: [Regex; 3],
    markdown_link: Regex,
}

fn patterns() -> &'static LicensePatterns {
    static PATTERNS: OnceLock<LicensePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| LicensePatterns {
        sections: [
            Regex::new(r"(?is)##?\s*License\s*\n\s*(.+?)(?:\n##|\n\n|\z)")
                .expect("license heading pattern must compile"),
            Regex::new(r"(?i)License:\s*(.+?)(?:\n|\z)")
                .expect("license field pattern must compile"),
            Regex::new(r"(?i)\*\*License\*\*:?\s*(.+?)(?:\n|\z)")
                .expect("bold license pattern must compile"),
        ],
        markdown_link: Regex::new(r"\[([^\]]+)\]\([^)]+\)")
            .expect("markdown link pattern must compile"),
    })
}

/// License text from a README section, front matter field or bold label.
pub fn license_from_readme(readme: &str) -> Option<String> {
    let p = patterns();
    let found = p
        .sections
        .iter()
        .find_map(|re| re.captures(readme).and_then(|c| c.get(1)))?;
    let text = p.markdown_link.replace_all(found.as_str().trim(), "$1");
    Some(text.chars().take(200).collect())
}

pub struct LicenseMetric;

impl LicenseMetric {
    pub fn score(ctx: &EvaluationContext) -> f64 {
        let license = ctx
            .platform_metadata
            .as_ref()
            .and_then(|i| i.license_tag())
            .map(str::to_string)
            .or_else(|| ctx.documentation.as_deref().and_then(license_from_readme));

        let Some(license) = license else {
            return 0.3;
        };
        let license = license.to_lowercase();
        if COMPATIBLE.iter().any(|c| license.contains(c)) {
            1.0
        } else if RESTRICTIVE.iter().any(|r| license.contains(r)) {
            0.7
        } else {
            0.5
        }
    }
}

#[async_trait]
impl Metric for LicenseMetric {
    fn name(&self) -> MetricName {
        MetricName::License
    }

    async fn compute(
        &self,
        ctx: &EvaluationContext,
        _config: &ScoringConfig,
    ) -> anyhow::Result<MetricOutcome> {
        let started = Instant::now();
        Ok(MetricOutcome::since(Self::score(ctx), started))
    }
}
