//! Sandbox: pattern-filtered, deadline-bounded execution of documentation
//! code samples.
//!
//! # Modules
//!
//! - [`extract`]: fenced sample extraction
//! - [`scan`]: dangerous-construct blacklist, `ScanVerdict`
//! - [`fixes`]: bounded auto-fixes for a retry
//! - [`execution`]: `ScriptRunner`, `SubprocessRunner`, `run_sample()`
//! - [`error`]: `SandboxError` / `SandboxResult`

pub mod error;
pub mod execution;
pub mod extract;
pub mod fixes;
pub mod scan;

pub use error::{SandboxError, SandboxResult};
pub use execution::{run_sample, ExecutionOutcome, ExecutionReport, ScriptRunner, SubprocessRunner};
pub use extract::extract_code_samples;
pub use fixes::apply_safe_fixes;
pub use scan::{scan_sample, ScanVerdict};

/// What this sandbox does and does not isolate.
///
/// Samples are refused when they match a regex blacklist, and survivors run
/// under a wall-clock deadline in a throwaway directory with a cleared
/// environment and null stdin. There is no privilege drop, no network
/// namespace, no filesystem jail and no memory or CPU limit. A sample that
/// evades the blacklist runs with the full rights of the calling user until
/// the deadline. Only run the scorer where that is acceptable, for example
/// inside a disposable container.
pub const SANDBOX_LIMITATIONS: &str = "regex blacklist + wall-clock timeout + temporary working \
directory; no privilege drop, network isolation, filesystem jail or resource limits";
