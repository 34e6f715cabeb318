//! hub-client: model hub metadata access for trustgate
//!
//! This crate is the platform-metadata collaborator of the evaluation
//! pipeline. It fetches model info, README text, structured configuration
//! and dataset info from a model hub.
//!
//! - [`PlatformClient`]: the async contract consumed by enrichment and metrics
//! - [`HuggingFaceClient`]: reqwest-backed implementation
//! - [`fakes::StaticClient`]: canned in-memory hub for tests

pub mod client;
pub mod error;
pub mod fakes;
pub mod huggingface;
pub mod model;

pub use client::{PlatformClient, CONFIG_FILES, README_CANDIDATES};
pub use error::HubError;
pub use fakes::StaticClient;
pub use huggingface::{HubConfig, HuggingFaceClient};
pub use model::{ConfigFiles, DatasetInfo, ModelInfo, RepoKind};

/// Result type for hub operations
pub type Result<T> = std::result::Result<T, HubError>;
