use std::sync::Arc;

use mail_triage::config::PipelineConfig;
use mail_triage::memory::{InMemoryDirectory, InMemoryMailStore, RuleClassifier};
use mail_triage::run_triage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = PipelineConfig::from_env();
    tracing::info!(
        batch_size = config.fetch_batch_size,
        classifier_workers = config.classifier_workers,
        resolver_workers = config.resolver_workers,
        "starting triage run"
    );

    // Demo fixtures: duplicate and aliased identifiers exercise the
    // dedup path, the spam set drives the verdicts.
    let directory = Arc::new(InMemoryDirectory::new().with_alias("al@example.com", "alice@example.com"));
    let store = Arc::new(
        InMemoryMailStore::new()
            .with_mailbox("alice@example.com", [4, 1, 9])
            .with_mailbox("bob@example.com", [7, 2])
            .with_mailbox("carol@example.com", [5]),
    );
    let classifier = Arc::new(RuleClassifier::new([1, 2, 5]));

    let emails: Vec<String> = [
        "Alice@Example.com",
        "bob+news@example.com",
        "al@example.com",
        "carol@example.com",
        "alice@example.com",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    let report = run_triage(emails, directory, store, classifier, &config).await;

    let as_json = std::env::var("MAIL_TRIAGE_JSON").is_ok_and(|v| v == "1");
    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in &report {
            println!("{line}");
        }
    }

    Ok(())
}
