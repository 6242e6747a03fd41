//! Shared types and collaborator seams for the triage pipeline.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, MailStoreError};

// ── Pipeline data ───────────────────────────────────────────────────

/// A resolved user. Identity is the canonical email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub email: String,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Opaque, totally ordered message identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A message fetched for a user. `owner` is the resolved email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub owner: String,
}

/// A message with its spam verdict. Produced at most once per message;
/// messages whose classification fails never become one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedMessage {
    pub id: MessageId,
    pub is_spam: bool,
}

impl ClassifiedMessage {
    /// Render the report line: `"<is_spam> <id>"`.
    pub fn report_line(&self) -> String {
        format!("{} {}", self.is_spam, self.id)
    }
}

// ── Collaborator seams ──────────────────────────────────────────────

/// Resolves raw email identifiers to users — pure lookup, no pipeline
/// logic. Structurally infallible: unknown identifiers still resolve to
/// a user carrying a canonical form of the input.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve_user(&self, email: &str) -> User;
}

/// Fetches every message for a batch of users in one call.
///
/// One call per batch is the contract — batching exists to amortize the
/// fixed cost of this call. An error abandons the whole batch.
#[async_trait]
pub trait MailStore: Send + Sync {
    async fn fetch_messages(&self, users: &[User]) -> Result<Vec<Message>, MailStoreError>;
}

/// Classifies a single message as spam or not. An error drops that one
/// message; it is never retried.
#[async_trait]
pub trait SpamClassifier: Send + Sync {
    async fn check_spam(&self, id: MessageId) -> Result<bool, ClassifierError>;
}
