//! End-to-end pipeline runs against the in-memory collaborators.

use std::sync::Arc;

use mail_triage::config::PipelineConfig;
use mail_triage::memory::{InMemoryDirectory, InMemoryMailStore, RuleClassifier};
use mail_triage::run_triage;

fn emails(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn small_config() -> PipelineConfig {
    PipelineConfig {
        fetch_batch_size: 2,
        classifier_workers: 3,
        resolver_workers: 4,
    }
}

#[tokio::test]
async fn full_run_produces_ordered_report() {
    let directory = Arc::new(InMemoryDirectory::new());
    let store = Arc::new(
        InMemoryMailStore::new()
            .with_mailbox("alice@example.com", [4, 1])
            .with_mailbox("bob@example.com", [3, 2]),
    );
    let classifier = Arc::new(RuleClassifier::new([1, 2]));

    let report = run_triage(
        emails(&[
            "alice@example.com",
            "Bob@Example.com",
            "alice+promo@example.com",
        ]),
        directory,
        store,
        classifier,
        &small_config(),
    )
    .await;

    assert_eq!(report, vec!["true 1", "true 2", "false 3", "false 4"]);
}

#[tokio::test]
async fn duplicates_never_duplicate_messages() {
    let directory = Arc::new(InMemoryDirectory::new());
    let store = Arc::new(InMemoryMailStore::new().with_mailbox("a@x", [1, 2, 3]));
    let classifier = Arc::new(RuleClassifier::new([]));

    let report = run_triage(
        emails(&["a@x", "a@x", "A@X", "a+tag@x"]),
        directory,
        store,
        classifier,
        &small_config(),
    )
    .await;

    assert_eq!(report, vec!["false 1", "false 2", "false 3"]);
}

#[tokio::test]
async fn classification_error_drops_exactly_one_line() {
    let directory = Arc::new(InMemoryDirectory::new());
    let store = Arc::new(InMemoryMailStore::new().with_mailbox("a@x", [1, 2, 3, 4]));
    let classifier = Arc::new(RuleClassifier::new([1]).failing_on(3));

    let report = run_triage(
        emails(&["a@x"]),
        directory,
        store,
        classifier,
        &small_config(),
    )
    .await;

    assert_eq!(report, vec!["true 1", "false 2", "false 4"]);
}

#[tokio::test]
async fn failed_batch_drops_only_that_batch() {
    // Batch size 1 pins each user to their own fetch call, so only the
    // failing owner's messages go missing.
    let directory = Arc::new(InMemoryDirectory::new());
    let store = Arc::new(
        InMemoryMailStore::new()
            .with_mailbox("a@x", [1])
            .with_mailbox("b@x", [2])
            .with_mailbox("c@x", [3])
            .failing_for("b@x"),
    );
    let classifier = Arc::new(RuleClassifier::new([]));
    let config = PipelineConfig {
        fetch_batch_size: 1,
        ..small_config()
    };

    let report = run_triage(
        emails(&["a@x", "b@x", "c@x"]),
        directory,
        store,
        classifier,
        &config,
    )
    .await;

    assert_eq!(report, vec!["false 1", "false 3"]);
}

#[tokio::test]
async fn fetch_call_count_is_ceil_of_users_over_batch_size() {
    let directory = Arc::new(InMemoryDirectory::new());
    let store = Arc::new(InMemoryMailStore::new());
    let classifier = Arc::new(RuleClassifier::new([]));

    let input: Vec<String> = (0..5).map(|i| format!("u{i}@x")).collect();
    let _ = run_triage(
        input,
        directory,
        Arc::clone(&store) as Arc<dyn mail_triage::pipeline::MailStore>,
        classifier,
        &small_config(),
    )
    .await;

    let mut batches = store.recorded_batches();
    batches.sort_unstable();
    assert_eq!(batches, vec![1, 2, 2]);
}

#[tokio::test]
async fn fresh_runs_on_identical_input_match() {
    let config = small_config();
    let mut reports = Vec::new();
    for _ in 0..2 {
        let directory = Arc::new(InMemoryDirectory::new());
        let store = Arc::new(
            InMemoryMailStore::new()
                .with_mailbox("a@x", [5, 1])
                .with_mailbox("b@x", [2, 8]),
        );
        let classifier = Arc::new(RuleClassifier::new([5, 2]));
        reports.push(
            run_triage(
                emails(&["a@x", "b@x", "a@x"]),
                directory,
                store,
                classifier,
                &config,
            )
            .await,
        );
    }

    assert_eq!(reports[0], reports[1]);
    assert_eq!(reports[0], vec!["true 2", "true 5", "false 1", "false 8"]);
}

#[tokio::test]
async fn empty_input_yields_empty_report() {
    let directory = Arc::new(InMemoryDirectory::new());
    let store = Arc::new(InMemoryMailStore::new());
    let classifier = Arc::new(RuleClassifier::new([]));

    let report = run_triage(Vec::new(), directory, store, classifier, &small_config()).await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn larger_run_keeps_total_order() {
    let directory = Arc::new(InMemoryDirectory::new());
    let mut store = InMemoryMailStore::new();
    for i in 0..20u64 {
        store = store.with_mailbox(&format!("u{i}@x"), [i * 2, i * 2 + 1]);
    }
    let store = Arc::new(store);
    // Even ids are spam.
    let classifier = Arc::new(RuleClassifier::new((0..40).filter(|id| id % 2 == 0)));

    let input: Vec<String> = (0..20).map(|i| format!("u{i}@x")).collect();
    let report = run_triage(input, directory, store, classifier, &small_config()).await;

    assert_eq!(report.len(), 40);
    let expected: Vec<String> = (0..40u64)
        .filter(|id| id % 2 == 0)
        .map(|id| format!("true {id}"))
        .chain(
            (0..40u64)
                .filter(|id| id % 2 == 1)
                .map(|id| format!("false {id}")),
        )
        .collect();
    assert_eq!(report, expected);
}
