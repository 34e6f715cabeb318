//! Hub metadata records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which hub namespace a repository lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoKind {
    Model,
    Dataset,
}

/// Structured configuration files keyed by file name (`config.json`, ...).
pub type ConfigFiles = BTreeMap<String, serde_json::Value>;

/// Model metadata as exposed to metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub author: Option<String>,
    pub downloads: u64,
    pub likes: u64,
    pub last_modified: Option<String>,
    pub tags: Vec<String>,
    pub pipeline_tag: Option<String>,
    pub library_name: Option<String>,
    /// Structured evaluation results (`model-index`), when published.
    pub model_index: Option<serde_json::Value>,
    /// Repository file listing.
    pub files: Vec<String>,
    /// Total parameter count reported by safetensors metadata.
    pub parameter_count: Option<u64>,
}

impl ModelInfo {
    /// License declared through a `license:<id>` tag, if any.
    pub fn license_tag(&self) -> Option<&str> {
        self.tags.iter().find_map(|t| t.strip_prefix("license:"))
    }
}

/// Dataset metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub id: String,
    pub author: Option<String>,
    pub downloads: u64,
    pub likes: u64,
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Wire formats
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ModelInfoWire {
    #[serde(default)]
    id: String,
    #[serde(default, rename = "modelId")]
    model_id: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    downloads: u64,
    #[serde(default)]
    likes: u64,
    #[serde(default, rename = "lastModified")]
    last_modified: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    pipeline_tag: Option<String>,
    #[serde(default)]
    library_name: Option<String>,
    #[serde(default, rename = "model-index")]
    model_index: Option<serde_json::Value>,
    #[serde(default, rename = "cardData")]
    card_data: Option<serde_json::Value>,
    #[serde(default)]
    siblings: Vec<SiblingWire>,
    #[serde(default)]
    safetensors: Option<SafetensorsWire>,
}

#[derive(Debug, Deserialize)]
struct SiblingWire {
    rfilename: String,
}

#[derive(Debug, Deserialize)]
struct SafetensorsWire {
    #[serde(default)]
    total: Option<u64>,
}

impl From<ModelInfoWire> for ModelInfo {
    fn from(wire: ModelInfoWire) -> Self {
        let model_index = wire.model_index.filter(|v| !v.is_null()).or_else(|| {
            wire.card_data
                .as_ref()
                .and_then(|card| card.get("model-index"))
                .filter(|v| !v.is_null())
                .cloned()
        });

        let id = if wire.id.is_empty() {
            wire.model_id.unwrap_or_default()
        } else {
            wire.id
        };

        ModelInfo {
            id,
            author: wire.author,
            downloads: wire.downloads,
            likes: wire.likes,
            last_modified: wire.last_modified,
            tags: wire.tags,
            pipeline_tag: wire.pipeline_tag,
            library_name: wire.library_name,
            model_index,
            files: wire.siblings.into_iter().map(|s| s.rfilename).collect(),
            parameter_count: wire.safetensors.and_then(|s| s.total),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DatasetInfoWire {
    #[serde(default)]
    id: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    downloads: u64,
    #[serde(default)]
    likes: u64,
    #[serde(default)]
    tags: Vec<String>,
}

impl From<DatasetInfoWire> for DatasetInfo {
    fn from(wire: DatasetInfoWire) -> Self {
        DatasetInfo {
            id: wire.id,
            author: wire.author,
            downloads: wire.downloads,
            likes: wire.likes,
            tags: wire.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_wire_conversion() {
        let json = serde_json::json!({
            "id": "google/gemma-2b",
            "author": "google",
            "downloads": 12000,
            "likes": 42,
            "lastModified": "2024-03-01T00:00:00.000Z",
            "tags": ["transformers", "license:apache-2.0"],
            "pipeline_tag": "text-generation",
            "siblings": [{"rfilename": "config.json"}, {"rfilename": "model.safetensors"}],
            "safetensors": {"parameters": {"BF16": 2506172416u64}, "total": 2506172416u64},
            "cardData": {"model-index": [{"name": "gemma"}]}
        });

        let wire: ModelInfoWire = serde_json::from_value(json).unwrap();
        let info = ModelInfo::from(wire);

        assert_eq!(info.id, "google/gemma-2b");
        assert_eq!(info.files, vec!["config.json", "model.safetensors"]);
        assert_eq!(info.parameter_count, Some(2_506_172_416));
        assert_eq!(info.license_tag(), Some("apache-2.0"));
        assert!(info.model_index.is_some(), "model-index falls back to cardData");
    }

    #[test]
    fn test_model_wire_tolerates_sparse_payload() {
        let wire: ModelInfoWire = serde_json::from_str(r#"{"modelId": "gpt2"}"#).unwrap();
        let info = ModelInfo::from(wire);
        assert_eq!(info.id, "gpt2");
        assert_eq!(info.downloads, 0);
        assert!(info.files.is_empty());
        assert!(info.model_index.is_none());
    }
}
