//! Built-in metric variants.
//!
//! Each type implements [`Metric`](crate::metric::Metric). Text heuristics
//! work on the lowercased documentation; git-backed metrics clone the first
//! linked code repository into a temporary directory.

pub mod bus_factor;
pub mod code_quality;
pub mod dataset_and_code;
pub mod dataset_quality;
pub mod license;
pub mod performance_claims;
pub mod ramp_up;
pub mod reproducibility;
pub mod reviewedness;
pub mod size;

pub use bus_factor::BusFactorMetric;
pub use code_quality::CodeQualityMetric;
pub use dataset_and_code::DatasetAndCodeMetric;
pub use dataset_quality::DatasetQualityMetric;
pub use license::LicenseMetric;
pub use performance_claims::PerformanceClaimsMetric;
pub use ramp_up::RampUpMetric;
pub use reproducibility::{ReproducibilityDetails, ReproducibilityMetric};
pub use reviewedness::ReviewednessMetric;
pub use size::{size_breakdown, SizeMetric};

pub(crate) fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}
