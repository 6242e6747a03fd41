//! Five-stage spam-triage pipeline.
//!
//! Emails flow left-to-right through typed, unbounded hand-off queues:
//! 1. `UserResolver` — deduplicating concurrent email resolution
//! 2. `MessageBatcher` — batched message fetching
//! 3. `SpamCheckPool` — fixed worker pool classifying messages
//! 4. `ResultCombiner` — drain-all barrier emitting the ordered report
//!
//! Every stage is an independent tokio task; stages overlap in time.
//! The combiner's final sort is the only ordering guarantee.

pub mod batch;
pub mod classify;
pub mod combine;
pub mod driver;
pub mod resolve;
pub mod types;

pub use batch::MessageBatcher;
pub use classify::SpamCheckPool;
pub use combine::ResultCombiner;
pub use driver::{PipelineBuilder, Stage};
pub use resolve::UserResolver;
pub use types::{
    ClassifiedMessage, MailStore, Message, MessageId, SpamClassifier, User, UserDirectory,
};
