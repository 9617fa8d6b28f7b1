// src/services/chat.rs
use tracing::{debug, warn};

use crate::TRACING_TARGET_CHAT;
use crate::error::ChatError;
use crate::message::ChatRequest;
use crate::services::backend::AnalysisBackend;
use crate::services::dataset::DatasetDescriptor;

/// Check a message before anything is sent. Empty input wins over a missing
/// dataset.
pub fn validate_message(
    dataset: Option<&DatasetDescriptor>,
    text: &str,
) -> Result<ChatRequest, ChatError> {
    if text.trim().is_empty() {
        return Err(ChatError::EmptyInput);
    }

    let dataset = dataset
        .filter(|d| d.is_usable())
        .ok_or(ChatError::UploadRequired)?;

    Ok(ChatRequest::new(dataset.dataset_id.clone(), text))
}

/// Post one message and return the reply text.
pub async fn request_reply(
    backend: &dyn AnalysisBackend,
    request: ChatRequest,
) -> Result<String, ChatError> {
    let dataset_id = request.dataset_id.clone();
    match backend.chat(request).await {
        Ok(response) => {
            debug!(
                target: TRACING_TARGET_CHAT,
                %dataset_id,
                reply_len = response.reply.len(),
                "reply received"
            );
            Ok(response.reply)
        }
        Err(err) => {
            warn!(target: TRACING_TARGET_CHAT, %dataset_id, error = %err, "chat request failed");
            Err(err.into())
        }
    }
}

/// Transcript text for a failed exchange.
pub fn failure_text(err: &ChatError) -> String {
    format!("Error: {err}")
}
