// src/message.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One preview row: column name to scalar value.
pub type PreviewRow = Map<String, Value>;

/// Body of a 2xx `/api/upload` answer. Every field is optional on the wire;
/// the upload coordinator decides what a usable answer looks like.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub preview_rows: Option<Vec<PreviewRow>>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Body of `POST /api/chat`. The filter fields are always sent, as `null`
/// when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub dataset_id: String,
    pub message: String,
    pub filter_column: Option<String>,
    pub filter_value: Option<Value>,
}

impl ChatRequest {
    pub fn new(dataset_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            message: message.into(),
            filter_column: None,
            filter_value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}
