//! Pipeline driver — typed stage chaining and lifecycle.
//!
//! The driver owns hand-off queue creation and stage spawning. Each stage
//! runs as an independent tokio task bound to one input receiver and one
//! output sender; every queue boundary is strongly typed. Dropping the
//! output sender when a stage returns is the sole termination signal
//! propagated downstream. The driver holds no business logic and does not
//! aggregate stage-internal errors — it only waits for completion.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// One pipeline stage: consumes items of `In`, produces items of `Out`.
///
/// `run` must return only after its input is exhausted and all work the
/// stage spawned has finished. The driver moves the output sender into
/// the stage task, so returning from `run` closes the downstream queue
/// exactly once.
#[async_trait]
pub trait Stage: Send + 'static {
    type In: Send + 'static;
    type Out: Send + 'static;

    /// Stage name for logging.
    fn name(&self) -> &'static str;

    async fn run(
        self,
        input: mpsc::UnboundedReceiver<Self::In>,
        output: mpsc::UnboundedSender<Self::Out>,
    );
}

/// Chains stages through freshly created unbounded hand-off queues.
///
/// Each `stage` call spawns the stage immediately, so stages overlap in
/// time: stage N+1 starts consuming before stage N finishes producing.
/// Senders on unbounded queues never block; receivers await until their
/// queue is both empty and closed.
pub struct PipelineBuilder<T: Send + 'static> {
    tail: mpsc::UnboundedReceiver<T>,
    handles: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> PipelineBuilder<T> {
    /// Start a pipeline fed from an already-open external queue.
    pub fn from_channel(source: mpsc::UnboundedReceiver<T>) -> Self {
        Self {
            tail: source,
            handles: Vec::new(),
        }
    }

    /// Start a pipeline pre-loaded with `items`; the source queue closes
    /// once they are all enqueued.
    pub fn from_iter<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        for item in items {
            // Receiver is held right here; the send cannot fail.
            let _ = tx.send(item);
        }
        Self::from_channel(rx)
    }

    /// Append a stage, spawning it bound to the current tail queue and a
    /// fresh output queue.
    pub fn stage<S>(mut self, stage: S) -> PipelineBuilder<S::Out>
    where
        S: Stage<In = T>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let input = self.tail;
        let name = stage.name();
        let handle = tokio::spawn(async move {
            debug!(stage = name, "stage started");
            stage.run(input, tx).await;
            debug!(stage = name, "stage finished");
        });
        self.handles.push(handle);
        PipelineBuilder {
            tail: rx,
            handles: self.handles,
        }
    }

    /// Wait for every stage task to finish, then drain whatever the last
    /// stage emitted. Unbounded queues mean draining afterwards cannot
    /// deadlock.
    pub async fn run(self) -> Vec<T> {
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "stage task panicked");
            }
        }

        let mut tail = self.tail;
        let mut collected = Vec::new();
        while let Some(item) = tail.recv().await {
            collected.push(item);
        }
        collected
    }
}
