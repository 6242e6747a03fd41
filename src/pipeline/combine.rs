//! Result combiner — barrier stage producing the ordered report.

use std::cmp::Ordering;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::pipeline::driver::Stage;
use crate::pipeline::types::ClassifiedMessage;

/// Buffers every verdict, sorts them, then emits formatted report lines.
///
/// This is a full barrier, not a streaming stage: nothing is emitted
/// until the input queue closes. The sort is the only total-order
/// guarantee in the pipeline — spam-flagged messages first, then
/// ascending message id within each group. Ties need identical ids,
/// which identifier uniqueness rules out, so the order is deterministic.
#[derive(Debug, Default)]
pub struct ResultCombiner;

impl ResultCombiner {
    pub fn new() -> Self {
        Self
    }
}

/// Spam before non-spam, then ascending id.
fn verdict_order(a: &ClassifiedMessage, b: &ClassifiedMessage) -> Ordering {
    b.is_spam.cmp(&a.is_spam).then(a.id.cmp(&b.id))
}

#[async_trait]
impl Stage for ResultCombiner {
    type In = ClassifiedMessage;
    type Out = String;

    fn name(&self) -> &'static str {
        "combine_results"
    }

    async fn run(
        self,
        mut input: mpsc::UnboundedReceiver<ClassifiedMessage>,
        output: mpsc::UnboundedSender<String>,
    ) {
        let mut verdicts = Vec::new();
        while let Some(verdict) = input.recv().await {
            verdicts.push(verdict);
        }

        verdicts.sort_by(verdict_order);
        debug!(count = verdicts.len(), "emitting sorted report");
        for verdict in &verdicts {
            if output.send(verdict.report_line()).is_err() {
                break;
            }
        }
    }
}
