//! Static health of the linked code repository.

use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::ScoringConfig;
use crate::domain::{EvaluationContext, MetricName, MetricOutcome};
use crate::git::GitCli;
use crate::metric::Metric;

const NO_REPO_SCORE: f64 = 0.4;
const MAX_FILES_CHECKED: usize = 20;
const ERROR_BUDGET: f64 = 50.0;
const CI_MARKERS: &[&str] = &[
    ".github/workflows",
    "ci",
    ".travis.yml",
    ".circleci",
    "azure-pipelines.yml",
    ".gitlab-ci.yml",
];

/// Cheap syntax suspicion for a Python source: unbalanced brackets outside
/// strings and comments, or indentation mixing tabs and spaces.
pub fn looks_malformed(source: &str) -> bool {
    let mut stack = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut tabs = false;
    let mut spaces = false;

    for line in source.lines() {
        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        tabs |= indent.contains('\t');
        spaces |= indent.contains(' ');

        for c in line.chars() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '#' => break,
                '"' | '\'' => quote = Some(c),
                '(' | '[' | '{' => stack.push(c),
                ')' | ']' | '}' => {
                    let open = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    if stack.pop() != Some(open) {
                        return true;
                    }
                }
                _ => {}
            }
        }
        // an open quote carries over; that is how triple-quoted strings span lines
        escaped = false;
    }
    !stack.is_empty() || (tabs && spaces)
}

/// Score a checked-out repository.
pub fn score_checkout(root: &Path) -> f64 {
    let errors = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|x| x == "py"))
        .take(MAX_FILES_CHECKED)
        .filter(|e| {
            std::fs::read_to_string(e.path())
                .map(|src| looks_malformed(&src))
                .unwrap_or(false)
        })
        .count();

    let mut score = (1.0 - errors as f64 / ERROR_BUDGET).clamp(0.0, 1.0);
    if root.join("tests").exists() || root.join("test").exists() {
        score += 0.1;
    }
    if CI_MARKERS.iter().any(|m| root.join(m).exists()) {
        score += 0.1;
    }
    score.min(1.0)
}

pub struct CodeQualityMetric;

#[async_trait]
impl Metric for CodeQualityMetric {
    fn name(&self) -> MetricName {
        MetricName::CodeQuality
    }

    async fn compute(
        &self,
        ctx: &EvaluationContext,
        config: &ScoringConfig,
    ) -> anyhow::Result<MetricOutcome> {
        let started = Instant::now();
        let Some(repo) = ctx.linked_code_repo() else {
            return Ok(MetricOutcome::since(NO_REPO_SCORE, started));
        };

        let git = GitCli::from_config(&config.git);
        let clone = match git.clone_ephemeral(&repo.url, Some(1)).await {
            Ok(clone) => clone,
            Err(e) => {
                debug!(repo = %repo.url, error = %e, "clone failed, using default score");
                return Ok(MetricOutcome::since(NO_REPO_SCORE, started));
            }
        };

        let score = tokio::task::spawn_blocking(move || {
            let score = score_checkout(clone.path());
            drop(clone);
            score
        })
        .await?;
        Ok(MetricOutcome::since(score, started))
    }
}
