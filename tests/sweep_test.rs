//! Batch sweep tests: per-request outcomes, failure isolation, and safety
//! against re-runs.

mod common;

use lifeline::models::formation_request::RequestStatus;
use lifeline::models::vote::VoteValue;
use lifeline::workflow::{Decision, SweepAction};

use common::{MemStore, RecordingNotifier, approvals, submitted_request, vote, workflow_over};

#[tokio::test]
async fn sweep_provisions_only_requests_that_pass_quorum() {
    let store = MemStore::new();
    let notifier = RecordingNotifier::new();

    // Passes quorum: 2 approvals, 48h old.
    store.insert_request(submitted_request(1, 48), approvals(1, 2));
    // Too young, despite quorum.
    store.insert_request(submitted_request(2, 1), approvals(2, 2));
    // Blocked by an objection.
    let mut blocked_votes = approvals(3, 3);
    blocked_votes.push(vote(9, 3, 200, VoteValue::Object));
    store.insert_request(submitted_request(3, 48), blocked_votes);

    let workflow = workflow_over(store.clone(), notifier.clone());
    let outcomes = workflow.sweep().await.expect("sweep should succeed");

    assert_eq!(outcomes.len(), 3);

    assert_eq!(outcomes[0].request_id, 1);
    assert_eq!(outcomes[0].decision, Decision::Approve);
    assert!(matches!(
        outcomes[0].action,
        SweepAction::Provisioned { .. }
    ));

    assert_eq!(outcomes[1].request_id, 2);
    assert_eq!(
        outcomes[1].decision,
        Decision::Pending("needs more review time".to_string())
    );
    assert!(matches!(outcomes[1].action, SweepAction::Skipped));

    assert_eq!(outcomes[2].request_id, 3);
    assert_eq!(
        outcomes[2].decision,
        Decision::Pending("has 1 objections".to_string())
    );
    assert!(matches!(outcomes[2].action, SweepAction::Skipped));

    assert_eq!(store.lifeline_count(), 1);
    assert_eq!(store.request(1).status, RequestStatus::Approved);
    assert_eq!(store.request(2).status, RequestStatus::Submitted);
    assert_eq!(store.request(3).status, RequestStatus::Submitted);
}

#[tokio::test]
async fn one_failing_request_does_not_abort_the_batch() {
    let store = MemStore::new();
    let notifier = RecordingNotifier::new();
    store.insert_request(submitted_request(1, 48), approvals(1, 2));
    store.insert_request(submitted_request(2, 48), approvals(2, 2));
    store.fail_provision_for.lock().unwrap().push(1);

    let workflow = workflow_over(store.clone(), notifier.clone());
    let outcomes = workflow.sweep().await.expect("sweep should succeed");

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(outcomes[0].action, SweepAction::Failed { .. }));
    assert!(matches!(
        outcomes[1].action,
        SweepAction::Provisioned { .. }
    ));

    // The failed request is untouched and eligible for the next pass.
    assert_eq!(store.request(1).status, RequestStatus::Submitted);
    assert!(!store.request(1).group_created);
    assert_eq!(store.request(2).status, RequestStatus::Approved);
    assert_eq!(store.lifeline_count(), 1);
}

#[tokio::test]
async fn repeated_sweeps_are_safe() {
    let store = MemStore::new();
    let notifier = RecordingNotifier::new();
    store.insert_request(submitted_request(1, 48), approvals(1, 2));

    let workflow = workflow_over(store.clone(), notifier.clone());

    let first = workflow.sweep().await.expect("first sweep");
    assert_eq!(first.len(), 1);
    assert!(matches!(first[0].action, SweepAction::Provisioned { .. }));

    // The approved request has left the submitted pool, so a re-run sees
    // nothing to do and provisions nothing new.
    let second = workflow.sweep().await.expect("second sweep");
    assert!(second.is_empty());
    assert_eq!(store.lifeline_count(), 1);
    assert_eq!(notifier.welcomes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn sweep_after_manual_approval_provisions_nothing() {
    let store = MemStore::new();
    let notifier = RecordingNotifier::new();
    store.insert_request(submitted_request(1, 48), approvals(1, 2));

    let workflow = workflow_over(store.clone(), notifier.clone());
    workflow.approve(1).await.expect("manual approve");

    let outcomes = workflow.sweep().await.expect("sweep should succeed");
    assert!(outcomes.is_empty());
    assert_eq!(store.lifeline_count(), 1);
}
