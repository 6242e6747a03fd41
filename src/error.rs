//! Error types for the triage pipeline.

/// Top-level error type for the pipeline.
///
/// Stage-internal failures are logged and the affected unit of work is
/// dropped; nothing escalates to a pipeline-level failure. These types
/// exist so collaborators have a concrete error vocabulary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Mail store error: {0}")]
    MailStore(#[from] MailStoreError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),
}

/// Batch message-fetch errors. A failed fetch abandons the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum MailStoreError {
    #[error("Mailbox unavailable for {owner}: {reason}")]
    Unavailable { owner: String, reason: String },

    #[error("Fetch failed for batch of {batch_size} users: {reason}")]
    FetchFailed { batch_size: usize, reason: String },
}

/// Per-message classification errors. A failed check drops that message.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classifier backend unavailable: {0}")]
    Backend(String),

    #[error("Unknown message id: {0}")]
    UnknownMessage(u64),
}
