//! Fraction of a repository's added code lines that arrived through a
//! reviewed change.
//!
//! Returns the not-applicable sentinel when there is no linked repository or
//! git cannot produce a history; that is distinct from a real 0.0, which
//! means the history holds no reviewed code (or no code at all).
//!
//! Merge commits carry no `--numstat` lines, so code that reached the
//! default branch through a "Merge pull request #N" commit is attributed to
//! the branch commits underneath it and counts as reviewed only when those
//! subjects reference a change number themselves.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Instant;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::ScoringConfig;
use crate::domain::{EvaluationContext, MetricName, MetricOutcome, NOT_APPLICABLE};
use crate::git::{GitCli, COMMIT_SEPARATOR, FIELD_SEPARATOR};
use crate::metric::Metric;

const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "java", "cpp", "c", "h", "hpp", "go", "rs", "rb", "php",
    "swift", "kt", "scala", "cs", "r", "m", "sh", "yaml", "yml", "json", "toml", "xml",
];
const WEIGHT_EXTENSIONS: &[&str] = &[
    "pt",
    "pth",
    "bin",
    "safetensors",
    "h5",
    "pb",
    "onnx",
    "tflite",
    "ckpt",
    "pkl",
    "pickle",
    "npz",
    "npy",
    "weights",
];

/// One commit from `git log --numstat`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitStat {
    pub hash: String,
    pub subject: String,
    /// `(path, added lines)`; binary files count 0 added.
    pub files: Vec<(String, u64)>,
}

fn review_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"#\d+",
            r"(?i)\bPR\s*#\d+",
            r"(?i)merge pull request #\d+",
            r"\(#\d+\)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("review pattern must compile"))
        .collect()
    })
}

/// Whether a commit subject carries pull-request or merge evidence.
pub fn is_reviewed_message(subject: &str) -> bool {
    review_patterns().iter().any(|re| re.is_match(subject))
        || subject.trim_start().to_lowercase().starts_with("merge")
}

/// Extension allow-list minus weight formats. Size is checked separately.
pub fn is_code_path(path: &str) -> bool {
    let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let ext = ext.to_lowercase();
    !WEIGHT_EXTENSIONS.contains(&ext.as_str()) && CODE_EXTENSIONS.contains(&ext.as_str())
}

/// Parse the output of [`GitCli::log_numstat`].
pub fn parse_numstat(log: &str) -> Vec<CommitStat> {
    log.split(COMMIT_SEPARATOR)
        .filter(|chunk| !chunk.trim().is_empty())
        .filter_map(|chunk| {
            let mut lines = chunk.lines();
            let header = lines.next()?;
            let (hash, subject) = header.split_once(FIELD_SEPARATOR)?;
            let files = lines
                .filter_map(|line| {
                    let mut parts = line.splitn(3, '\t');
                    let added = parts.next()?;
                    let _removed = parts.next()?;
                    let path = parts.next()?.trim();
                    let added = if added == "-" { 0 } else { added.parse().ok()? };
                    Some((path.to_string(), added))
                })
                .collect();
            Some(CommitStat {
                hash: hash.trim().to_string(),
                subject: subject.to_string(),
                files,
            })
        })
        .collect()
}

/// `(reviewed added lines, total added lines)` over code files in `commits`.
///
/// Files present in the checkout and larger than `max_file_bytes` are not
/// code regardless of extension.
pub fn tally(commits: &[CommitStat], checkout: &Path, max_file_bytes: u64) -> (u64, u64) {
    let mut oversized: HashMap<&str, bool> = HashMap::new();
    let mut reviewed = 0;
    let mut total = 0;

    for commit in commits {
        let commit_reviewed = is_reviewed_message(&commit.subject);
        for (path, added) in &commit.files {
            if !is_code_path(path) {
                continue;
            }
            let too_big = *oversized.entry(path.as_str()).or_insert_with(|| {
                std::fs::metadata(checkout.join(path))
                    .map(|m| m.len() > max_file_bytes)
                    .unwrap_or(false)
            });
            if too_big {
                continue;
            }
            total += added;
            if commit_reviewed {
                reviewed += added;
            }
        }
    }
    (reviewed, total)
}

pub struct ReviewednessMetric;

impl ReviewednessMetric {
    async fn score(ctx: &EvaluationContext, config: &ScoringConfig) -> f64 {
        let Some(repo) = ctx.linked_code_repo() else {
            debug!(artifact = %ctx.artifact.canonical_name, "no linked repository");
            return NOT_APPLICABLE;
        };

        let git = GitCli::from_config(&config.git);
        let clone = match git.clone_ephemeral(&repo.url, None).await {
            Ok(clone) => clone,
            Err(e) => {
                warn!(repo = %repo.url, error = %e, "clone failed");
                return NOT_APPLICABLE;
            }
        };
        let log = match git.log_numstat(clone.path()).await {
            Ok(log) => log,
            Err(e) => {
                warn!(repo = %repo.url, error = %e, "git log failed");
                return NOT_APPLICABLE;
            }
        };

        let max_bytes = config.git.max_code_file_bytes;
        let counted = tokio::task::spawn_blocking(move || {
            let commits = parse_numstat(&log);
            let counts = tally(&commits, clone.path(), max_bytes);
            drop(clone);
            counts
        })
        .await;

        match counted {
            Ok((_, 0)) => 0.0,
            Ok((reviewed, total)) => {
                let score = reviewed as f64 / total as f64;
                info!(repo = %repo.url, reviewed, total, score, "reviewedness computed");
                score
            }
            Err(e) => {
                warn!(repo = %repo.url, error = %e, "history analysis aborted");
                NOT_APPLICABLE
            }
        }
    }
}

#[async_trait]
impl Metric for ReviewednessMetric {
    fn name(&self) -> MetricName {
        MetricName::Reviewedness
    }

    async fn compute(
        &self,
        ctx: &EvaluationContext,
        config: &ScoringConfig,
    ) -> anyhow::Result<MetricOutcome> {
        let started = Instant::now();
        let score = Self::score(ctx, config).await;
        Ok(MetricOutcome::since(score, started))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_evidence() {
        for msg in [
            "Fix tokenizer (#42)",
            "PR #7: bump deps",
            "Merge pull request #12 from acme/feature",
            "Merge branch 'main'",
            "closes #3",
        ] {
            assert!(is_reviewed_message(msg), "{msg}");
        }
        assert!(!is_reviewed_message("quick fix"));
        assert!(!is_reviewed_message("emerge from the void"));
    }

    #[test]
    fn test_code_paths() {
        assert!(is_code_path("src/model.py"));
        assert!(is_code_path("config/settings.YAML"));
        assert!(!is_code_path("weights/model.safetensors"));
        assert!(!is_code_path("pytorch_model.bin"));
        assert!(!is_code_path("README.md"));
        assert!(!is_code_path("Makefile"));
    }

    #[test]
    fn test_parse_numstat() {
        let log = "\u{1e}abc\u{1f}Add model (#1)\n\n10\t0\tmodel.py\n-\t-\tweights.bin\n\u{1e}def\u{1f}tweak\n3\t1\tmodel.py\n";
        let commits = parse_numstat(log);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].hash, "abc");
        assert_eq!(commits[0].subject, "Add model (#1)");
        assert_eq!(
            commits[0].files,
            vec![("model.py".to_string(), 10), ("weights.bin".to_string(), 0)]
        );
        assert_eq!(commits[1].files, vec![("model.py".to_string(), 3)]);
    }

    #[test]
    fn test_tally_skips_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.json"), vec![b'x'; 64]).unwrap();
        let commits = vec![CommitStat {
            hash: "a".into(),
            subject: "direct".into(),
            files: vec![("big.json".into(), 5), ("small.py".into(), 2)],
        }];
        assert_eq!(tally(&commits, dir.path(), 32), (0, 2));
    }
}
