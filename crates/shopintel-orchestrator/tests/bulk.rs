//! Bulk jobs against mocked storefronts, one `MockServer` per target.

mod common;

use std::time::Duration;

use wiremock::MockServer;

use shopintel_core::{Target, TargetStatus};
use shopintel_orchestrator::{BulkSummary, ExtractOptions, ExtractOutput, Mode};

use common::{mount_store, orchestrator, store, target_for};

const POLL: Duration = Duration::from_millis(10);

#[tokio::test]
async fn progress_is_monotone_and_matches_terminal_share() {
    let a = store(&["Tee"]).await;
    let b = store(&["Hoodie"]).await;
    let c = store(&["Cap"]).await;
    let unreachable = Target::parse("http://127.0.0.1:1").unwrap();

    let orch = orchestrator(2, Vec::new());
    let handle = orch.start_bulk(
        vec![target_for(&a), unreachable.clone(), target_for(&b), target_for(&c)],
        ExtractOptions::default(),
    );
    assert_eq!(handle.total, 4);

    let mut seen = Vec::new();
    let job = tokio::time::timeout(
        Duration::from_secs(30),
        orch.wait_for_job(handle.id, POLL, |job| {
            let counts = job.counts();
            #[allow(clippy::cast_precision_loss)]
            let expected = counts.terminal() as f64 / job.entries.len() as f64;
            assert!((job.progress - expected).abs() < 1e-9);
            seen.push(job.progress);
        }),
    )
    .await
    .expect("job finishes")
    .expect("job exists");

    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress: {seen:?}");
    assert!((job.progress - 1.0).abs() < f64::EPSILON);
    assert!(job.finished_at.is_some());

    let unreachable_entry = job
        .entries
        .iter()
        .find(|e| e.target == unreachable)
        .unwrap();
    assert_eq!(unreachable_entry.status, TargetStatus::Failed);
    assert!(unreachable_entry.error.is_some());

    let counts = job.counts();
    assert_eq!(counts.succeeded, 3);
    assert_eq!(counts.failed, 1);
    assert!(job
        .entries
        .iter()
        .filter(|e| e.status == TargetStatus::Succeeded)
        .all(|e| e.insights.as_ref().is_some_and(|i| i.products.len() == 1)));

    let summary = BulkSummary::from_job(&job);
    assert!((summary.success_rate.unwrap() - 0.75).abs() < 1e-9);
}

#[tokio::test]
async fn cancel_skips_pending_targets_but_lets_running_one_finish() {
    let slow = MockServer::start().await;
    mount_store(&slow, &["Tee"], Duration::from_millis(800)).await;
    let b = store(&["Hoodie"]).await;
    let c = store(&["Cap"]).await;

    let orch = orchestrator(1, Vec::new());
    let handle = orch.start_bulk(
        vec![target_for(&slow), target_for(&b), target_for(&c)],
        ExtractOptions::default(),
    );

    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let job = orch.job_snapshot(handle.id).unwrap();
            if job.entries[0].status == TargetStatus::Running {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("first target starts");

    orch.cancel(handle.id).unwrap();

    let job = tokio::time::timeout(
        Duration::from_secs(30),
        orch.wait_for_job(handle.id, POLL, |_| {}),
    )
    .await
    .expect("job finishes")
    .unwrap();

    assert!(job.cancel_requested);
    assert_eq!(job.entries[0].status, TargetStatus::Succeeded);
    assert_eq!(job.entries[1].status, TargetStatus::Cancelled);
    assert_eq!(job.entries[2].status, TargetStatus::Cancelled);
    assert!((job.progress - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn bulk_mode_through_extract_dedupes_targets() {
    let a = store(&["Tee"]).await;
    let orch = orchestrator(2, Vec::new());

    let output = orch
        .extract(
            target_for(&a),
            Mode::Bulk(vec![target_for(&a)]),
            ExtractOptions::default(),
        )
        .await
        .unwrap();
    let ExtractOutput::Bulk(handle) = output else {
        panic!("expected a bulk handle");
    };
    assert_eq!(handle.total, 1);

    let job = tokio::time::timeout(
        Duration::from_secs(30),
        orch.wait_for_job(handle.id, POLL, |_| {}),
    )
    .await
    .expect("job finishes")
    .unwrap();
    assert_eq!(job.counts().succeeded, 1);
}

#[tokio::test]
async fn empty_bulk_job_is_immediately_complete() {
    let orch = orchestrator(2, Vec::new());
    let handle = orch.start_bulk(Vec::new(), ExtractOptions::default());
    let job = orch.job_snapshot(handle.id).unwrap();
    assert!(job.is_finished());
    assert!((job.progress - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn cancelling_unknown_job_is_an_error() {
    let orch = orchestrator(1, Vec::new());
    assert!(orch.cancel(uuid::Uuid::new_v4()).is_err());
}
