//! Domain models for trustgate.
//!
//! - `ArtifactReference`: what is being scored
//! - `EvaluationContext`: evidence gathered about it
//! - `MetricOutcome` / `AggregatedAudit`: what the metrics concluded

pub mod artifact;
pub mod context;
pub mod error;
pub mod outcome;

pub use artifact::{build_contexts, parse_url, ArtifactReference, Category, Platform};
pub use context::EvaluationContext;
pub use error::{Result, TrustgateError};
pub use outcome::{
    is_not_applicable, round3, AggregatedAudit, MetricName, MetricOutcome, SizeBreakdown,
    NOT_APPLICABLE,
};
