//! Session controller: the one place that owns locale, model selection,
//! conversation history and the pending attachment.

use crate::attachment::{Attachment, AttachmentPreparer, ReadCompletion, TextRead, TextReadOutcome};
use crate::budget::CharBudgetEstimator;
use crate::catalog::ModelCatalog;
use crate::error::{CoreError, RejectReason};
use crate::reply::{decompose, ParsedReply};
use crate::source::SharedFile;
use providers::{ChatBackend, ChatSubmission, Upload};
use shared::agent_api::{ChatMessage, Role};
use shared::attachment::AttachmentKind;
use shared::locale::Locale;
use shared::settings::{ClientSettings, DEFAULT_MODEL};

/// Result of a successful send
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub reply: ParsedReply,
    /// Warning key from server-side document handling, passed through as-is
    pub document_warning: Option<String>,
}

#[derive(Debug)]
pub struct ChatSession {
    locale: Locale,
    selected_model: String,
    catalog: ModelCatalog,
    history: Vec<ChatMessage>,
    attachments: AttachmentPreparer,
}

impl ChatSession {
    pub fn new(locale: Locale, model: impl Into<String>) -> Self {
        Self {
            locale,
            selected_model: model.into(),
            catalog: ModelCatalog::new(),
            history: vec![ChatMessage::system(locale.system_prompt())],
            attachments: AttachmentPreparer::new(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(Locale::from_tag(&settings.locale), settings.default_model.clone())
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Switch locale. The system turn is rewritten in place; the rest of the
    /// history is untouched.
    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
        let prompt = locale.system_prompt().to_string();
        match self.history.first_mut() {
            Some(first) if first.role == Role::System => first.content = prompt,
            _ => self.history.insert(0, ChatMessage::system(prompt)),
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Drop all turns except the system prompt, and any pending attachment.
    pub fn clear(&mut self) {
        self.history.truncate(1);
        self.attachments.clear();
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub async fn refresh_models(&mut self, backend: &dyn ChatBackend) -> Result<usize, CoreError> {
        let result = self.catalog.refresh(backend).await;
        self.reconcile_selection();
        result
    }

    fn reconcile_selection(&mut self) {
        let resolved = self
            .catalog
            .resolve_selection(&self.selected_model)
            .map(str::to_string);
        if let Some(name) = resolved.filter(|n| *n != self.selected_model) {
            tracing::info!("model {} not installed, using {}", self.selected_model, name);
            self.selected_model = name;
        }
    }

    /// Select a model. Once the catalog is loaded only listed models are
    /// accepted.
    pub fn select_model(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || (self.catalog.is_loaded() && self.catalog.lookup(name).is_none()) {
            return false;
        }
        self.selected_model = name.to_string();
        true
    }

    pub fn active_model(&self) -> &str {
        if self.selected_model.is_empty() {
            DEFAULT_MODEL
        } else {
            &self.selected_model
        }
    }

    /// Character budget of the active model
    pub fn char_budget(&self) -> usize {
        CharBudgetEstimator::new(&self.catalog).budget_for(self.active_model())
    }

    pub fn pending_attachment(&self) -> Option<&Attachment> {
        self.attachments.pending()
    }

    pub fn clear_attachment(&mut self) {
        self.attachments.clear();
    }

    /// Stage a file, replacing any pending one. Text files return a read
    /// job whose outcome goes to [`ChatSession::complete_text_read`].
    pub fn stage_attachment(
        &mut self,
        file: SharedFile,
        kind: AttachmentKind,
    ) -> Option<TextRead> {
        let budget = self.char_budget();
        self.attachments.prepare(file, kind, budget)
    }

    pub fn complete_text_read(
        &mut self,
        outcome: TextReadOutcome,
    ) -> Result<ReadCompletion, CoreError> {
        let budget = self.char_budget();
        self.attachments.finish_text_read(outcome, budget)
    }

    /// Stage a file and wait for it to be ready.
    pub async fn attach(&mut self, file: SharedFile, kind: AttachmentKind) -> Result<(), CoreError> {
        if let Some(job) = self.stage_attachment(file, kind) {
            let outcome = job.run().await;
            self.complete_text_read(outcome)?;
        }
        Ok(())
    }

    /// Send `prompt` with the pending attachment, if any.
    ///
    /// Turns are only recorded after the backend answered. The attachment is
    /// consumed by any attempt that gets past the precondition checks.
    pub async fn send(
        &mut self,
        backend: &dyn ChatBackend,
        prompt: &str,
    ) -> Result<Exchange, CoreError> {
        if self.attachments.is_busy() {
            tracing::debug!("send rejected: attachment not ready");
            return Err(CoreError::SubmissionRejected(RejectReason::AttachmentNotReady));
        }
        let prompt = prompt.trim();
        if prompt.is_empty() && self.attachments.pending().is_none() {
            tracing::debug!("send rejected: nothing to send");
            return Err(CoreError::SubmissionRejected(RejectReason::Empty));
        }

        let upload = match self.attachments.take() {
            Some(attachment) => {
                let bytes = attachment.upload_bytes().await.map_err(|source| {
                    CoreError::AttachmentRead {
                        file_name: attachment.file_name().to_string(),
                        source,
                    }
                })?;
                Some(Upload {
                    kind: attachment.kind(),
                    file_name: attachment.file_name().to_string(),
                    bytes,
                })
            }
            None => None,
        };

        let submission = ChatSubmission {
            prompt: prompt.to_string(),
            history: self.history.clone(),
            model: self.active_model().to_string(),
            lang: Some(self.locale.lang_code().to_string()),
            upload,
        };

        match backend.chat(submission).await {
            Ok(reply) => {
                self.history.push(ChatMessage::user(prompt));
                self.history.push(ChatMessage::assistant(reply.reply.clone()));
                Ok(Exchange {
                    reply: decompose(&reply.reply),
                    document_warning: reply.document_warning,
                })
            }
            Err(e) => {
                tracing::warn!("chat request failed: {:#}", e);
                Err(CoreError::Transport(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FileSource, MemoryFile};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use providers::BackendReply;
    use shared::attachment::WarningCode;
    use shared::models::ModelInfo;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeBackend {
        models: Vec<ModelInfo>,
        reply: Option<BackendReply>,
        seen: Mutex<Vec<ChatSubmission>>,
    }

    impl FakeBackend {
        fn replying(raw: &str) -> Self {
            Self {
                reply: Some(BackendReply {
                    reply: raw.to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatBackend for FakeBackend {
        async fn list_models(&self) -> anyhow::Result<Vec<ModelInfo>> {
            Ok(self.models.clone())
        }

        async fn chat(&self, submission: ChatSubmission) -> anyhow::Result<BackendReply> {
            self.seen.lock().unwrap().push(submission);
            self.reply.clone().ok_or_else(|| anyhow!("connection reset"))
        }
    }

    fn session() -> ChatSession {
        ChatSession::new(Locale::En, "qwen3:4b")
    }

    #[test]
    fn test_locale_change_rewrites_system_turn() {
        let mut s = session();
        s.history.push(ChatMessage::user("hi"));
        s.set_locale(Locale::Ru);

        assert_eq!(s.history().len(), 2);
        assert_eq!(s.history()[0], ChatMessage::system(Locale::Ru.system_prompt()));
        assert_eq!(s.history()[1], ChatMessage::user("hi"));
    }

    #[tokio::test]
    async fn test_empty_send_rejected_without_network() {
        let backend = FakeBackend::replying("unused");
        let mut s = session();

        let err = s.send(&backend, "   ").await.unwrap_err();
        assert!(matches!(err, CoreError::SubmissionRejected(RejectReason::Empty)));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_send_rejected_while_text_is_reading() {
        let backend = FakeBackend::replying("unused");
        let mut s = session();
        let job = s
            .stage_attachment(MemoryFile::shared("a.txt", "abc"), AttachmentKind::Text)
            .unwrap();

        let err = s.send(&backend, "summarize").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::SubmissionRejected(RejectReason::AttachmentNotReady)
        ));
        assert_eq!(backend.calls(), 0);
        assert!(s.pending_attachment().is_some());

        s.complete_text_read(job.run().await).unwrap();
        assert!(s.send(&backend, "summarize").await.is_ok());
    }

    #[tokio::test]
    async fn test_successful_send_records_turns() {
        let backend = FakeBackend::replying("<think>greet back</think>Hello!");
        let mut s = session();
        s.set_locale(Locale::De);
        s.attach(MemoryFile::shared("cat.png", vec![1u8, 2, 3]), AttachmentKind::Image)
            .await
            .unwrap();

        let exchange = s.send(&backend, "  Hi there ").await.unwrap();
        assert_eq!(exchange.reply.answer, "Hello!");
        assert_eq!(exchange.reply.thoughts.as_deref(), Some("greet back"));

        let seen = backend.seen.lock().unwrap();
        let sent = &seen[0];
        assert_eq!(sent.prompt, "Hi there");
        assert_eq!(sent.model, "qwen3:4b");
        assert_eq!(sent.lang.as_deref(), Some("de-DE"));
        assert_eq!(sent.history.len(), 1);
        let upload = sent.upload.as_ref().unwrap();
        assert_eq!(upload.kind, AttachmentKind::Image);
        assert_eq!(upload.bytes, vec![1u8, 2, 3]);
        drop(seen);

        assert_eq!(
            s.history()[1..],
            [
                ChatMessage::user("Hi there"),
                ChatMessage::assistant("<think>greet back</think>Hello!"),
            ]
        );
        assert!(s.pending_attachment().is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_history() {
        let backend = FakeBackend::default();
        let mut s = session();
        s.attach(MemoryFile::shared("doc.pdf", "%PDF"), AttachmentKind::Pdf)
            .await
            .unwrap();

        let err = s.send(&backend, "read this").await.unwrap_err();
        assert!(matches!(err, CoreError::Transport(_)));
        assert_eq!(err.to_string(), "connection reset");
        assert_eq!(s.history().len(), 1);
        assert!(s.pending_attachment().is_none());
    }

    #[tokio::test]
    async fn test_attachment_only_send_is_allowed() {
        let backend = FakeBackend::replying("It is a cat.");
        let mut s = session();
        s.attach(MemoryFile::shared("cat.jpg", "jpg"), AttachmentKind::Image)
            .await
            .unwrap();

        let exchange = s.send(&backend, "").await.unwrap();
        assert_eq!(exchange.reply.answer, "It is a cat.");
        assert_eq!(s.history()[1], ChatMessage::user(""));
    }

    #[tokio::test]
    async fn test_refresh_reconciles_selection_and_budget() {
        let backend = FakeBackend {
            models: vec![
                ModelInfo::named("llama3.2:1b").with_context_length(2048.0),
                ModelInfo::named("gemma3:12b"),
            ],
            ..Default::default()
        };
        let mut s = session();
        assert_eq!(s.char_budget(), 10_000);

        assert_eq!(s.refresh_models(&backend).await.unwrap(), 2);
        assert_eq!(s.active_model(), "llama3.2:1b");
        assert_eq!(s.char_budget(), 8_192);

        assert!(!s.select_model("qwen3:4b"));
        assert!(s.select_model("gemma3:12b"));
        assert_eq!(s.char_budget(), 6_000);
    }

    #[tokio::test]
    async fn test_text_warning_uses_active_model_budget() {
        let mut s = ChatSession::new(Locale::En, "tinyllama:1b");
        s.attach(MemoryFile::shared("long.txt", "a".repeat(4_001)), AttachmentKind::Text)
            .await
            .unwrap();
        assert_eq!(
            s.pending_attachment().unwrap().warning(),
            Some(WarningCode::TextTruncated)
        );

        s.attach(MemoryFile::shared("ok.txt", "a".repeat(4_000)), AttachmentKind::Text)
            .await
            .unwrap();
        assert!(s.pending_attachment().unwrap().warning().is_none());
    }

    #[tokio::test]
    async fn test_second_stage_wins_over_pending_read() {
        let mut s = session();
        let first = s
            .stage_attachment(MemoryFile::shared("one.txt", "x".repeat(50_000)), AttachmentKind::Text)
            .unwrap();
        s.stage_attachment(MemoryFile::shared("two.pdf", "%PDF"), AttachmentKind::Pdf);

        assert_eq!(
            s.complete_text_read(first.run().await).unwrap(),
            ReadCompletion::Superseded
        );
        let pending = s.pending_attachment().unwrap();
        assert_eq!(pending.kind(), AttachmentKind::Pdf);
        assert!(pending.warning().is_none());
    }

    /// Returns different content on every read.
    #[derive(Debug, Default)]
    struct GrowingFile {
        reads: Mutex<usize>,
    }

    #[async_trait]
    impl FileSource for GrowingFile {
        fn name(&self) -> &str {
            "log.txt"
        }

        fn size(&self) -> u64 {
            0
        }

        async fn read_bytes(&self) -> anyhow::Result<Vec<u8>> {
            let mut reads = self.reads.lock().unwrap();
            *reads += 1;
            Ok("line\n".repeat(*reads).into_bytes())
        }
    }

    #[tokio::test]
    async fn test_text_upload_matches_checked_content() {
        let backend = FakeBackend::replying("ok");
        let file = Arc::new(GrowingFile::default());
        let mut s = session();
        s.attach(file.clone(), AttachmentKind::Text).await.unwrap();
        assert_eq!(s.pending_attachment().unwrap().preview_text(), Some("line"));

        s.send(&backend, "summarize").await.unwrap();
        assert_eq!(*file.reads.lock().unwrap(), 1);
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].upload.as_ref().unwrap().bytes, b"line\n".to_vec());
    }

    #[test]
    fn test_clear_keeps_system_turn() {
        let mut s = session();
        s.history.push(ChatMessage::user("a"));
        s.history.push(ChatMessage::assistant("b"));
        s.clear();
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history()[0].role, Role::System);
    }
}
