//! mail-triage — concurrent spam-triage pipeline.
//!
//! Processes a stream of email identifiers through five overlapping
//! stages: resolve users (deduplicated), fetch their messages in
//! batches, classify each message, and emit a deterministically ordered
//! report of `"<is_spam> <id>"` lines. See [`pipeline`] for the engine
//! and [`run_triage`] for the wired-up entry point.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod memory;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::Error;

use pipeline::{
    MailStore, MessageBatcher, PipelineBuilder, ResultCombiner, SpamCheckPool, SpamClassifier,
    UserDirectory, UserResolver,
};

/// Run the full triage pipeline over `emails` and return the report
/// lines, spam first, ascending message id within each group.
///
/// Each call builds fresh hand-off queues and fresh dedup state; runs
/// are independent. Work dropped on collaborator errors is logged and
/// silently missing from the report.
pub async fn run_triage(
    emails: Vec<String>,
    directory: Arc<dyn UserDirectory>,
    store: Arc<dyn MailStore>,
    classifier: Arc<dyn SpamClassifier>,
    config: &PipelineConfig,
) -> Vec<String> {
    PipelineBuilder::from_iter(emails)
        .stage(UserResolver::new(directory, config.resolver_workers))
        .stage(MessageBatcher::new(store, config.fetch_batch_size))
        .stage(SpamCheckPool::new(classifier, config.classifier_workers))
        .stage(ResultCombiner::new())
        .run()
        .await
}
