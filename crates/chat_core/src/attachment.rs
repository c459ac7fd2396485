//! Staging a single attachment for the next outgoing message.
//!
//! Images and PDFs are ready as soon as they are prepared. Text files need an
//! asynchronous read: [`AttachmentPreparer::prepare`] hands back a
//! [`TextRead`] job, the caller runs it, and feeds the outcome to
//! [`AttachmentPreparer::finish_text_read`]. Every preparation gets a fresh
//! [`Generation`]; an outcome whose generation no longer matches the pending
//! slot is dropped without touching it.

use crate::error::CoreError;
use crate::source::SharedFile;
use crate::text::{char_len, decode_text, preview_snippet};
use shared::attachment::{AttachmentKind, WarningCode};

/// PDFs above this size always get a truncation warning (4 MiB).
pub const PDF_SIZE_CEILING: u64 = 4 * 1024 * 1024;

/// What the shell can show for a staged attachment
#[derive(Debug, Clone)]
pub enum Preview {
    /// Image thumbnail source; the bytes stay behind the file handle
    Image(SharedFile),
    /// Whitespace-collapsed head of a text file
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Attachment {
    kind: AttachmentKind,
    file: SharedFile,
    preview: Option<Preview>,
    warning: Option<WarningCode>,
    ready: bool,
    /// Bytes a text file was checked against, sent as-is
    contents: Option<Vec<u8>>,
}

impl Attachment {
    fn image(file: SharedFile) -> Self {
        Self {
            kind: AttachmentKind::Image,
            preview: Some(Preview::Image(file.clone())),
            file,
            warning: None,
            ready: true,
            contents: None,
        }
    }

    fn pdf(file: SharedFile, budget: usize) -> Self {
        Self {
            kind: AttachmentKind::Pdf,
            warning: pdf_warning(file.size(), budget),
            file,
            preview: None,
            ready: true,
            contents: None,
        }
    }

    fn pending_text(file: SharedFile) -> Self {
        Self {
            kind: AttachmentKind::Text,
            file,
            preview: None,
            warning: None,
            ready: false,
            contents: None,
        }
    }

    fn finish_text(&mut self, raw: Vec<u8>, budget: usize) {
        if self.ready {
            return;
        }
        let text = decode_text(&raw);
        if char_len(&text) > budget {
            self.warning = Some(WarningCode::TextTruncated);
        }
        self.preview = Some(Preview::Text(preview_snippet(&text)));
        self.contents = Some(raw);
        self.ready = true;
    }

    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    pub fn file_name(&self) -> &str {
        self.file.name()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn preview_text(&self) -> Option<&str> {
        match &self.preview {
            Some(Preview::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn warning(&self) -> Option<WarningCode> {
        self.warning
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Bytes to upload. Text files reuse what was read at preparation;
    /// images and PDFs are read from the source now.
    pub async fn upload_bytes(&self) -> anyhow::Result<Vec<u8>> {
        match &self.contents {
            Some(bytes) => Ok(bytes.clone()),
            None => self.file.read_bytes().await,
        }
    }
}

/// Size heuristic for PDFs, whose text is only extracted server-side: warn
/// when the byte size is over twice the char budget or over the hard ceiling.
pub fn pdf_warning(size_bytes: u64, budget: usize) -> Option<WarningCode> {
    let over_budget = size_bytes > (budget as u64).saturating_mul(2);
    if over_budget || size_bytes > PDF_SIZE_CEILING {
        Some(WarningCode::PdfTruncated)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// A pending text read. Owns everything it needs, so it can run while the
/// session keeps handling other events.
#[derive(Debug)]
pub struct TextRead {
    generation: Generation,
    file: SharedFile,
}

impl TextRead {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub async fn run(self) -> TextReadOutcome {
        let result = self.file.read_bytes().await;
        TextReadOutcome {
            generation: self.generation,
            file_name: self.file.name().to_string(),
            result,
        }
    }
}

#[derive(Debug)]
pub struct TextReadOutcome {
    generation: Generation,
    file_name: String,
    result: anyhow::Result<Vec<u8>>,
}

impl TextReadOutcome {
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadCompletion {
    /// The pending attachment is now ready
    Applied,
    /// A newer preparation (or a clear) replaced the one this read was for
    Superseded,
}

/// Owner of the single pending-attachment slot.
#[derive(Debug, Default)]
pub struct AttachmentPreparer {
    next_generation: u64,
    pending: Option<(Generation, Attachment)>,
}

impl AttachmentPreparer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `file`, replacing whatever was pending. `budget` is the char
    /// budget of the currently selected model (used for PDFs). Returns the
    /// read job for text files.
    pub fn prepare(
        &mut self,
        file: SharedFile,
        kind: AttachmentKind,
        budget: usize,
    ) -> Option<TextRead> {
        self.next_generation += 1;
        let generation = Generation(self.next_generation);

        let (attachment, job) = match kind {
            AttachmentKind::Image => (Attachment::image(file), None),
            AttachmentKind::Pdf => (Attachment::pdf(file, budget), None),
            AttachmentKind::Text => (
                Attachment::pending_text(file.clone()),
                Some(TextRead { generation, file }),
            ),
        };
        tracing::debug!(
            kind = kind.as_str(),
            file = attachment.file_name(),
            warning = ?attachment.warning(),
            "attachment staged"
        );
        self.pending = Some((generation, attachment));
        job
    }

    /// Apply a finished text read. `budget` is evaluated for the model
    /// selected at completion time.
    pub fn finish_text_read(
        &mut self,
        outcome: TextReadOutcome,
        budget: usize,
    ) -> Result<ReadCompletion, CoreError> {
        let is_current = matches!(&self.pending, Some((g, _)) if *g == outcome.generation);
        if !is_current {
            tracing::debug!("ignoring superseded read of {}", outcome.file_name);
            return Ok(ReadCompletion::Superseded);
        }

        match outcome.result {
            Ok(raw) => {
                if let Some((_, attachment)) = self.pending.as_mut() {
                    attachment.finish_text(raw, budget);
                }
                Ok(ReadCompletion::Applied)
            }
            Err(source) => {
                tracing::warn!("Failed to read text file {}: {:#}", outcome.file_name, source);
                self.pending = None;
                Err(CoreError::AttachmentRead {
                    file_name: outcome.file_name,
                    source,
                })
            }
        }
    }

    pub fn pending(&self) -> Option<&Attachment> {
        self.pending.as_ref().map(|(_, a)| a)
    }

    /// True while a staged text file is still being read
    pub fn is_busy(&self) -> bool {
        self.pending().is_some_and(|a| !a.is_ready())
    }

    /// Remove the pending attachment for sending.
    pub fn take(&mut self) -> Option<Attachment> {
        self.pending.take().map(|(_, a)| a)
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
