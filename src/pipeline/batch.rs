//! Message batcher stage — amortizes fetch cost over user batches.

use std::mem;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::pipeline::driver::Stage;
use crate::pipeline::types::{MailStore, Message, User};

/// Groups resolved users into fixed-size batches and dispatches one
/// concurrent fetch per batch.
///
/// A partial remainder at end-of-stream goes out as a final smaller
/// batch, so `ceil(users / batch_size)` fetch calls are made in total.
/// A failed fetch drops that whole batch; other batches are unaffected.
pub struct MessageBatcher {
    store: Arc<dyn MailStore>,
    batch_size: usize,
}

impl MessageBatcher {
    pub fn new(store: Arc<dyn MailStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl Stage for MessageBatcher {
    type In = User;
    type Out = Message;

    fn name(&self) -> &'static str {
        "fetch_messages"
    }

    async fn run(
        self,
        mut input: mpsc::UnboundedReceiver<User>,
        output: mpsc::UnboundedSender<Message>,
    ) {
        let mut pending = Vec::with_capacity(self.batch_size);
        let mut fetches: Vec<JoinHandle<()>> = Vec::new();

        while let Some(user) = input.recv().await {
            pending.push(user);
            if pending.len() == self.batch_size {
                let batch = mem::replace(&mut pending, Vec::with_capacity(self.batch_size));
                fetches.push(spawn_fetch(Arc::clone(&self.store), batch, output.clone()));
            }
        }
        if !pending.is_empty() {
            fetches.push(spawn_fetch(Arc::clone(&self.store), pending, output.clone()));
        }

        // The stage's own sender is dropped on return; only the joined
        // fetch tasks above ever held clones, so the queue closes once.
        for result in join_all(fetches).await {
            if let Err(e) = result {
                error!(error = %e, "fetch task panicked");
            }
        }
    }
}

fn spawn_fetch(
    store: Arc<dyn MailStore>,
    batch: Vec<User>,
    output: mpsc::UnboundedSender<Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let batch_size = batch.len();
        match store.fetch_messages(&batch).await {
            Ok(messages) => {
                debug!(batch_size, messages = messages.len(), "batch fetched");
                for message in messages {
                    if output.send(message).is_err() {
                        warn!("message output queue closed; dropping remainder");
                        break;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, batch_size, "batch fetch failed; dropping batch");
            }
        }
    })
}
