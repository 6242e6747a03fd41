//! In-memory collaborators for tests and the demo binary.
//!
//! These implement the collaborator seams with plain maps. The directory
//! canonicalizes addresses (case fold, plus-tag stripping) so that
//! distinct raw identifiers can resolve to the same user — the reason
//! the resolver deduplicates on the resolved email. The store and
//! classifier support injected failures for exercising drop policies.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ClassifierError, MailStoreError};
use crate::pipeline::types::{
    MailStore, Message, MessageId, SpamClassifier, User, UserDirectory,
};

// ── Directory ───────────────────────────────────────────────────────

/// Map-backed directory with address canonicalization.
///
/// Unknown addresses resolve to a user carrying the canonical form of
/// the input, keeping the lookup structurally infallible.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    aliases: HashMap<String, String>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a canonical address to a different canonical owner, e.g. a
    /// forwarding address onto the primary mailbox.
    pub fn with_alias(mut self, from: &str, to: &str) -> Self {
        self.aliases
            .insert(Self::canonicalize(from), Self::canonicalize(to));
        self
    }

    /// Lowercase and strip any `+tag` from the local part.
    fn canonicalize(email: &str) -> String {
        let email = email.trim().to_ascii_lowercase();
        match email.split_once('@') {
            Some((local, domain)) => {
                let local = local.split('+').next().unwrap_or(local);
                format!("{local}@{domain}")
            }
            None => email,
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn resolve_user(&self, email: &str) -> User {
        let canonical = Self::canonicalize(email);
        let email = self.aliases.get(&canonical).cloned().unwrap_or(canonical);
        User { email }
    }
}

// ── Mail store ──────────────────────────────────────────────────────

/// Map-backed mail store recording the size of every fetch call.
#[derive(Debug, Default)]
pub struct InMemoryMailStore {
    mailboxes: HashMap<String, Vec<u64>>,
    failing_owners: HashSet<String>,
    batch_log: Mutex<Vec<usize>>,
}

impl InMemoryMailStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mailbox(mut self, owner: &str, ids: impl IntoIterator<Item = u64>) -> Self {
        self.mailboxes
            .insert(owner.to_string(), ids.into_iter().collect());
        self
    }

    /// Any batch containing this owner fails wholesale.
    pub fn failing_for(mut self, owner: &str) -> Self {
        self.failing_owners.insert(owner.to_string());
        self
    }

    /// Sizes of every fetch call made so far, in call order.
    pub fn recorded_batches(&self) -> Vec<usize> {
        self.batch_log
            .lock()
            .expect("batch log lock poisoned")
            .clone()
    }
}

#[async_trait]
impl MailStore for InMemoryMailStore {
    async fn fetch_messages(&self, users: &[User]) -> Result<Vec<Message>, MailStoreError> {
        self.batch_log
            .lock()
            .expect("batch log lock poisoned")
            .push(users.len());

        if let Some(user) = users.iter().find(|u| self.failing_owners.contains(&u.email)) {
            return Err(MailStoreError::Unavailable {
                owner: user.email.clone(),
                reason: "injected failure".to_string(),
            });
        }

        let mut messages = Vec::new();
        for user in users {
            if let Some(ids) = self.mailboxes.get(&user.email) {
                messages.extend(ids.iter().map(|&id| Message {
                    id: MessageId(id),
                    owner: user.email.clone(),
                }));
            }
        }
        Ok(messages)
    }
}

// ── Classifier ──────────────────────────────────────────────────────

/// Set-backed classifier: ids in the spam set are spam, ids in the
/// failure set error out.
#[derive(Debug, Default)]
pub struct RuleClassifier {
    spam_ids: HashSet<u64>,
    failing_ids: HashSet<u64>,
}

impl RuleClassifier {
    pub fn new(spam_ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            spam_ids: spam_ids.into_iter().collect(),
            failing_ids: HashSet::new(),
        }
    }

    pub fn failing_on(mut self, id: u64) -> Self {
        self.failing_ids.insert(id);
        self
    }
}

#[async_trait]
impl SpamClassifier for RuleClassifier {
    async fn check_spam(&self, id: MessageId) -> Result<bool, ClassifierError> {
        if self.failing_ids.contains(&id.0) {
            return Err(ClassifierError::Backend("injected failure".to_string()));
        }
        Ok(self.spam_ids.contains(&id.0))
    }
}
