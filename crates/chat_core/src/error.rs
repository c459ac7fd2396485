//! Error kinds surfaced by the chat core. None of them end the session.

/// Why a send was refused before anything hit the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No prompt text and no attachment
    Empty,
    /// A text attachment is still being read
    AttachmentNotReady,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Failed to load models: {0}")]
    CatalogLoad(#[source] anyhow::Error),

    #[error("Failed to read attachment {file_name}: {source}")]
    AttachmentRead {
        file_name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Submission rejected: {0:?}")]
    SubmissionRejected(RejectReason),

    #[error("{0}")]
    Transport(#[source] anyhow::Error),
}
