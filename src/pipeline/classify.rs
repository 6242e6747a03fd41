//! Spam classifier stage — fixed worker pool over a shared queue.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, warn};

use crate::pipeline::driver::Stage;
use crate::pipeline::types::{ClassifiedMessage, Message, SpamClassifier};

/// A fixed pool of workers competitively consuming one shared message
/// queue.
///
/// This is the concurrency bound of the whole pipeline: upstream stages
/// may fan out per item, but at most `workers` classification calls are
/// ever outstanding. The receiver mutex is held only while pulling the
/// next message, never across a classification call.
///
/// A classification error drops that one message and the worker keeps
/// consuming — the pool never shrinks mid-run.
pub struct SpamCheckPool {
    classifier: Arc<dyn SpamClassifier>,
    workers: usize,
}

impl SpamCheckPool {
    pub fn new(classifier: Arc<dyn SpamClassifier>, workers: usize) -> Self {
        Self {
            classifier,
            workers: workers.max(1),
        }
    }
}

#[async_trait]
impl Stage for SpamCheckPool {
    type In = Message;
    type Out = ClassifiedMessage;

    fn name(&self) -> &'static str {
        "check_spam"
    }

    async fn run(
        self,
        input: mpsc::UnboundedReceiver<Message>,
        output: mpsc::UnboundedSender<ClassifiedMessage>,
    ) {
        let input = Arc::new(Mutex::new(input));
        let mut pool = Vec::with_capacity(self.workers);

        for worker in 0..self.workers {
            let input = Arc::clone(&input);
            let output = output.clone();
            let classifier = Arc::clone(&self.classifier);
            pool.push(tokio::spawn(async move {
                loop {
                    let message = { input.lock().await.recv().await };
                    let Some(message) = message else { break };

                    match classifier.check_spam(message.id).await {
                        Ok(is_spam) => {
                            let classified = ClassifiedMessage {
                                id: message.id,
                                is_spam,
                            };
                            if output.send(classified).is_err() {
                                warn!(worker, "verdict output queue closed; stopping");
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(
                                worker,
                                id = %message.id,
                                error = %e,
                                "classification failed; dropping message"
                            );
                        }
                    }
                }
            }));
        }
        drop(output);

        for result in join_all(pool).await {
            if let Err(e) = result {
                error!(error = %e, "classifier worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::RuleClassifier;
    use crate::pipeline::driver::PipelineBuilder;
    use crate::pipeline::types::MessageId;

    fn messages(ids: &[u64]) -> Vec<Message> {
        ids.iter()
            .map(|&id| Message {
                id: MessageId(id),
                owner: "u@x".to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn classifies_every_message() {
        let classifier = Arc::new(RuleClassifier::new([2, 3]));
        let mut verdicts = PipelineBuilder::from_iter(messages(&[1, 2, 3, 4]))
            .stage(SpamCheckPool::new(classifier, 3))
            .run()
            .await;

        verdicts.sort_by_key(|v| v.id);
        let spam: Vec<bool> = verdicts.iter().map(|v| v.is_spam).collect();
        assert_eq!(verdicts.len(), 4);
        assert_eq!(spam, vec![false, true, true, false]);
    }

    #[tokio::test]
    async fn worker_survives_a_classification_error() {
        // One worker, failure in the middle: everything after the failed
        // message must still be classified.
        let classifier = Arc::new(RuleClassifier::new([1]).failing_on(2));
        let mut verdicts = PipelineBuilder::from_iter(messages(&[1, 2, 3, 4]))
            .stage(SpamCheckPool::new(classifier, 1))
            .run()
            .await;

        verdicts.sort_by_key(|v| v.id);
        let ids: Vec<MessageId> = verdicts.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![MessageId(1), MessageId(3), MessageId(4)]);
    }

    #[tokio::test]
    async fn one_error_means_exactly_one_missing_verdict() {
        let classifier = Arc::new(RuleClassifier::new([]).failing_on(5));
        let verdicts = PipelineBuilder::from_iter(messages(&[1, 2, 3, 4, 5, 6]))
            .stage(SpamCheckPool::new(classifier, 4))
            .run()
            .await;

        assert_eq!(verdicts.len(), 5);
        assert!(verdicts.iter().all(|v| v.id != MessageId(5)));
    }
}
