//! User resolver stage — concurrent, deduplicating email resolution.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};

use crate::pipeline::driver::Stage;
use crate::pipeline::types::{User, UserDirectory};

/// Resolves raw email identifiers to users, forwarding each distinct
/// resolved email at most once per run.
///
/// Resolution runs under a bounded concurrency limit. Deduplication
/// happens *after* resolution: distinct raw identifiers may normalize to
/// the same canonical email, so the seen-set keys on the resolved
/// `User::email`, never on the raw input.
pub struct UserResolver {
    directory: Arc<dyn UserDirectory>,
    workers: usize,
}

impl UserResolver {
    pub fn new(directory: Arc<dyn UserDirectory>, workers: usize) -> Self {
        Self {
            directory,
            workers: workers.max(1),
        }
    }
}

#[async_trait]
impl Stage for UserResolver {
    type In = String;
    type Out = User;

    fn name(&self) -> &'static str {
        "resolve_users"
    }

    async fn run(
        self,
        input: mpsc::UnboundedReceiver<String>,
        output: mpsc::UnboundedSender<User>,
    ) {
        let Self { directory, workers } = self;
        let seen: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));

        UnboundedReceiverStream::new(input)
            .for_each_concurrent(workers, |email| {
                let directory = Arc::clone(&directory);
                let seen = Arc::clone(&seen);
                let output = output.clone();
                async move {
                    if email.trim().is_empty() {
                        warn!("dropping empty email identifier");
                        return;
                    }

                    let user = directory.resolve_user(&email).await;

                    // Check-insert-forward is the sole critical section;
                    // the lock covers nothing else.
                    let mut seen = seen.lock().await;
                    if seen.insert(user.email.clone()) {
                        if output.send(user).is_err() {
                            warn!("user output queue closed; dropping resolved user");
                        }
                    } else {
                        debug!(raw = %email, "duplicate resolved email; dropping");
                    }
                }
            })
            .await;
    }
}
