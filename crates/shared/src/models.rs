//! Model metadata as reported by the chat server's `/api/models`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts numbers and numeric strings; anything else reads as unknown.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Decodes each entry on its own so one bad entry does not sink the list.
fn tolerant_models<'de, D>(deserializer: D) -> Result<Vec<ModelInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match ModelInfo::deserialize(&item) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::debug!("skipping model entry {}: {}", item, e);
                None
            }
        })
        .collect())
}

/// Information about one installed model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model tag (e.g., "qwen3:4b"); unique within a catalog
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    /// Context window in tokens, when the server knows it
    #[serde(default, deserialize_with = "lenient_number")]
    pub context_length: Option<f64>,

    /// Parameter size label (e.g., "7.6B", "4b")
    #[serde(default, deserialize_with = "lenient_label")]
    pub parameter_size: Option<String>,
}

impl ModelInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context_length: None,
            parameter_size: None,
        }
    }

    pub fn with_context_length(mut self, tokens: f64) -> Self {
        self.context_length = Some(tokens);
        self
    }

    pub fn with_parameter_size(mut self, size: impl Into<String>) -> Self {
        self.parameter_size = Some(size.into());
        self
    }
}

/// Body of a `/api/models` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelList {
    #[serde(default, deserialize_with = "tolerant_models")]
    pub models: Vec<ModelInfo>,
    #[serde(default)]
    pub error: Option<String>,
}
