//! Scoring configuration: metric weights, gate thresholds, sandbox and git
//! limits, and device size limits.
//!
//! Loaded from TOML. Every section and field is optional; anything left out
//! keeps its documented default.
//!
//! ```toml
//! [weights]
//! license = 0.2
//!
//! [[gate.rules]]
//! metric = "license"
//! threshold = 0.6
//!
//! [sandbox]
//! timeout_secs = 5
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{MetricName, Result, TrustgateError};
use crate::gate::GateRuleSet;

/// Env var naming the TOML config file read by [`ScoringConfig::from_env`].
pub const CONFIG_ENV: &str = "TRUSTGATE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: MetricWeights,
    pub gate: GateRuleSet,
    pub sandbox: SandboxConfig,
    pub git: GitConfig,
    pub size_limits: SizeLimits,
}

impl ScoringConfig {
    /// Read a TOML config file.
    ///
    /// A missing file is not an error: a warning is logged and defaults are
    /// used. A file that exists but does not parse is a config error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config: Self = toml::from_str(&text)
            .map_err(|e| TrustgateError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded scoring config");
        Ok(config)
    }

    /// Load from `$TRUSTGATE_CONFIG` when set, otherwise defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(&PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }
}

/// Per-metric weights for the net score. They need not sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricWeights {
    pub ramp_up_time: f64,
    pub bus_factor: f64,
    pub performance_claims: f64,
    pub license: f64,
    pub size_score: f64,
    pub dataset_and_code_score: f64,
    pub dataset_quality: f64,
    pub code_quality: f64,
    pub reproducibility: f64,
    pub reviewedness: f64,
    /// Reserved; the tree score is not computed.
    pub treescore: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            ramp_up_time: 0.15,
            bus_factor: 0.10,
            performance_claims: 0.15,
            license: 0.10,
            size_score: 0.15,
            dataset_and_code_score: 0.15,
            dataset_quality: 0.10,
            code_quality: 0.10,
            reproducibility: 0.10,
            reviewedness: 0.10,
            treescore: 0.0,
        }
    }
}

impl MetricWeights {
    pub fn weight(&self, metric: MetricName) -> f64 {
        match metric {
            MetricName::RampUpTime => self.ramp_up_time,
            MetricName::BusFactor => self.bus_factor,
            MetricName::PerformanceClaims => self.performance_claims,
            MetricName::License => self.license,
            MetricName::SizeScore => self.size_score,
            MetricName::DatasetAndCodeScore => self.dataset_and_code_score,
            MetricName::DatasetQuality => self.dataset_quality,
            MetricName::CodeQuality => self.code_quality,
            MetricName::Reproducibility => self.reproducibility,
            MetricName::Reviewedness => self.reviewedness,
        }
    }
}

/// Limits for running documentation code samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub interpreter: String,
    /// Fence info strings treated as the target language.
    pub fence_languages: Vec<String>,
    pub timeout_secs: u64,
    /// Maximum characters kept from each of stdout and stderr.
    pub output_cap: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            fence_languages: vec!["python".to_string(), "py".to_string()],
            timeout_secs: 15,
            output_cap: 1000,
        }
    }
}

impl SandboxConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Limits for git-backed metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub executable: String,
    pub clone_timeout_secs: u64,
    pub log_timeout_secs: u64,
    /// Files larger than this are never counted as code.
    pub max_code_file_bytes: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            executable: "git".to_string(),
            clone_timeout_secs: 120,
            log_timeout_secs: 60,
            max_code_file_bytes: 10 * 1024 * 1024,
        }
    }
}

impl GitConfig {
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }

    pub fn log_timeout(&self) -> Duration {
        Duration::from_secs(self.log_timeout_secs)
    }
}

/// Memory budget per deployment target, in GB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeLimits {
    pub raspberry_pi: f64,
    pub jetson_nano: f64,
    pub desktop_pc: f64,
    pub aws_server: f64,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            raspberry_pi: 1.0,
            jetson_nano: 4.0,
            desktop_pc: 16.0,
            aws_server: 64.0,
        }
    }
}
