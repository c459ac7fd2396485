//! Attachment kinds and the truncation warnings attached to them.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// What kind of file is staged for the next message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Text,
    Pdf,
}

impl AttachmentKind {
    /// Detect the kind from the file extension.
    ///
    /// Anything that is not a known text or PDF extension is treated as an
    /// image, which the server runs through OCR.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("txt" | "md" | "csv") => AttachmentKind::Text,
            Some("pdf") => AttachmentKind::Pdf,
            _ => AttachmentKind::Image,
        }
    }

    /// Value of the `upload_kind` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::Image => "image",
            AttachmentKind::Text => "text",
            AttachmentKind::Pdf => "pdf",
        }
    }
}

/// Signals that a document will not reach the model in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    TextTruncated,
    PdfTruncated,
}

impl WarningCode {
    pub fn key(&self) -> &'static str {
        match self {
            WarningCode::TextTruncated => "text_truncated",
            WarningCode::PdfTruncated => "pdf_truncated",
        }
    }

    /// Map a key reported by the server (`document_warning`) back to a code.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        [WarningCode::TextTruncated, WarningCode::PdfTruncated]
            .into_iter()
            .find(|code| code.key() == key)
    }
}
