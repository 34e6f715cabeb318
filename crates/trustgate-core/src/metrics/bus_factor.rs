//! Maintainer concentration: community engagement plus contributor count.

use std::time::Instant;

use async_trait::async_trait;
use hub_client::ModelInfo;
use tracing::debug;

use crate::config::ScoringConfig;
use crate::domain::{EvaluationContext, MetricName, MetricOutcome};
use crate::git::GitCli;
use crate::metric::Metric;

const HUB_WEIGHT: f64 = 0.6;
const GIT_WEIGHT: f64 = 0.4;
/// Commits fetched when counting authors.
const AUTHOR_HISTORY_DEPTH: u32 = 200;

/// Download and like tiers plus recent activity, capped at 0.8.
pub fn engagement_score(info: &ModelInfo) -> f64 {
    let downloads = match info.downloads {
        d if d > 10_000 => 0.4,
        d if d > 1_000 => 0.3,
        d if d > 100 => 0.2,
        d if d > 10 => 0.1,
        _ => 0.0,
    };
    let likes = match info.likes {
        l if l > 100 => 0.3,
        l if l > 50 => 0.2,
        l if l > 10 => 0.1,
        l if l > 0 => 0.05,
        _ => 0.0,
    };
    let activity = if info.last_modified.is_some() { 0.1 } else { 0.0 };
    f64::min(0.8, downloads + likes + activity)
}

pub fn contributor_score(authors: usize) -> f64 {
    match authors {
        0 => 0.1,
        1 => 0.5,
        2 => 0.6,
        _ => 0.8,
    }
}

pub struct BusFactorMetric;

impl BusFactorMetric {
    async fn git_score(ctx: &EvaluationContext, config: &ScoringConfig) -> f64 {
        let Some(repo) = ctx.linked_code_repo() else {
            return 0.0;
        };
        let git = GitCli::from_config(&config.git);
        let authors = async {
            let clone = git
                .clone_ephemeral(&repo.url, Some(AUTHOR_HISTORY_DEPTH))
                .await?;
            git.author_count(clone.path()).await
        };
        match authors.await {
            Ok(n) => contributor_score(n),
            Err(e) => {
                debug!(repo = %repo.url, error = %e, "contributor count unavailable");
                0.0
            }
        }
    }
}

#[async_trait]
impl Metric for BusFactorMetric {
    fn name(&self) -> MetricName {
        MetricName::BusFactor
    }

    async fn compute(
        &self,
        ctx: &EvaluationContext,
        config: &ScoringConfig,
    ) -> anyhow::Result<MetricOutcome> {
        let started = Instant::now();
        let (hub, git_weight) = match &ctx.platform_metadata {
            Some(info) => (engagement_score(info) * HUB_WEIGHT, GIT_WEIGHT),
            None => (0.0, 1.0),
        };
        let git = Self::git_score(ctx, config).await * git_weight;
        Ok(MetricOutcome::since(f64::min(1.0, hub + git), started))
    }
}
