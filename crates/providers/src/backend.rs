//! The seam between the chat core and whatever serves models.

use anyhow::Result;
use async_trait::async_trait;
use shared::agent_api::ChatMessage;
use shared::attachment::AttachmentKind;
use shared::models::ModelInfo;

/// A file travelling with a submission
#[derive(Debug, Clone)]
pub struct Upload {
    pub kind: AttachmentKind,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Everything the server needs to answer one user turn.
#[derive(Debug, Clone)]
pub struct ChatSubmission {
    pub prompt: String,
    /// Prior turns, system turn first. Does not include `prompt`.
    pub history: Vec<ChatMessage>,
    pub model: String,
    /// Locale code, e.g. "ru-RU"
    pub lang: Option<String>,
    pub upload: Option<Upload>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendReply {
    /// Raw model output, think block included
    pub reply: String,
    /// Warning key from server-side document handling (e.g. "pdf_truncated")
    pub document_warning: Option<String>,
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Fetch the installed models.
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// Submit one turn. Non-success responses are errors carrying the
    /// server's message.
    async fn chat(&self, submission: ChatSubmission) -> Result<BackendReply>;
}
