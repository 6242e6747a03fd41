//! Configuration types.

/// Pipeline tuning knobs.
///
/// Passed explicitly into each stage constructor — there is no
/// process-wide configuration state. Zero values are clamped to 1 so a
/// bad override can never stall a stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How many users go into one message-fetch call.
    pub fetch_batch_size: usize,
    /// Fixed size of the spam-classifier worker pool. This is the
    /// concurrency bound of the whole pipeline.
    pub classifier_workers: usize,
    /// Concurrency limit for user resolution.
    pub resolver_workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_batch_size: 10,
            classifier_workers: 8,
            resolver_workers: 8,
        }
    }
}

impl PipelineConfig {
    /// Read overrides from `MAIL_TRIAGE_*` environment variables,
    /// falling back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fetch_batch_size: env_usize("MAIL_TRIAGE_BATCH_SIZE", defaults.fetch_batch_size),
            classifier_workers: env_usize(
                "MAIL_TRIAGE_CLASSIFIER_WORKERS",
                defaults.classifier_workers,
            ),
            resolver_workers: env_usize(
                "MAIL_TRIAGE_RESOLVER_WORKERS",
                defaults.resolver_workers,
            ),
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
        .max(1)
}
