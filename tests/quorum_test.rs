//! Quorum-rule tests for formation request evaluation.

mod common;

use chrono::Utc;
use lifeline::models::formation_request::RequestStatus;
use lifeline::models::vote::VoteValue;
use lifeline::workflow::decision::{Decision, evaluate};

use common::{submitted_request, vote};

#[test]
fn quorum_after_review_window_approves() {
    let request = submitted_request(1, 25);
    let votes = vec![
        vote(1, 1, 10, VoteValue::Approve),
        vote(2, 1, 11, VoteValue::Approve),
    ];
    assert_eq!(evaluate(&request, &votes, Utc::now()), Decision::Approve);
}

#[test]
fn young_request_is_pending_even_with_quorum() {
    let request = submitted_request(1, 1);
    let votes = vec![
        vote(1, 1, 10, VoteValue::Approve),
        vote(2, 1, 11, VoteValue::Approve),
    ];
    assert_eq!(
        evaluate(&request, &votes, Utc::now()),
        Decision::Pending("needs more review time".to_string())
    );
}

#[test]
fn objection_blocks_regardless_of_approvals() {
    let request = submitted_request(1, 48);
    let votes = vec![
        vote(1, 1, 10, VoteValue::Approve),
        vote(2, 1, 11, VoteValue::Approve),
        vote(3, 1, 12, VoteValue::Approve),
        vote(4, 1, 13, VoteValue::Object),
    ];
    assert_eq!(
        evaluate(&request, &votes, Utc::now()),
        Decision::Pending("has 1 objections".to_string())
    );
}

#[test]
fn objections_never_reject() {
    // Objections only ever block; even a wall of them leaves the request
    // pending, never rejected.
    let request = submitted_request(1, 48);
    let votes = vec![
        vote(1, 1, 10, VoteValue::Object),
        vote(2, 1, 11, VoteValue::Object),
        vote(3, 1, 12, VoteValue::Object),
        vote(4, 1, 13, VoteValue::Object),
        vote(5, 1, 14, VoteValue::Object),
    ];
    assert!(matches!(
        evaluate(&request, &votes, Utc::now()),
        Decision::Pending(_)
    ));
}

#[test]
fn single_approval_needs_one_more() {
    let request = submitted_request(1, 48);
    let votes = vec![vote(1, 1, 10, VoteValue::Approve)];
    assert_eq!(
        evaluate(&request, &votes, Utc::now()),
        Decision::Pending("need 1 more approvals".to_string())
    );
}

#[test]
fn discussion_blocks_approval() {
    let request = submitted_request(1, 48);
    let votes = vec![
        vote(1, 1, 10, VoteValue::Approve),
        vote(2, 1, 11, VoteValue::Approve),
        vote(3, 1, 12, VoteValue::Discuss),
    ];
    assert_eq!(
        evaluate(&request, &votes, Utc::now()),
        Decision::Pending("has 1 discussions pending".to_string())
    );
}

#[test]
fn passes_never_affect_the_outcome() {
    let request = submitted_request(1, 48);
    let quorum_plus_passes = vec![
        vote(1, 1, 10, VoteValue::Approve),
        vote(2, 1, 11, VoteValue::Approve),
        vote(3, 1, 12, VoteValue::Pass),
        vote(4, 1, 13, VoteValue::Pass),
        vote(5, 1, 14, VoteValue::Pass),
    ];
    assert_eq!(
        evaluate(&request, &quorum_plus_passes, Utc::now()),
        Decision::Approve
    );

    let passes_only = vec![
        vote(1, 1, 10, VoteValue::Pass),
        vote(2, 1, 11, VoteValue::Pass),
    ];
    assert_eq!(
        evaluate(&request, &passes_only, Utc::now()),
        Decision::Pending("need 2 more approvals".to_string())
    );
}

#[test]
fn unmet_criteria_are_enumerated_together() {
    let request = submitted_request(1, 48);
    let votes = vec![
        vote(1, 1, 10, VoteValue::Approve),
        vote(2, 1, 11, VoteValue::Object),
        vote(3, 1, 12, VoteValue::Discuss),
    ];
    assert_eq!(
        evaluate(&request, &votes, Utc::now()),
        Decision::Pending(
            "need 1 more approvals, has 1 objections, has 1 discussions pending".to_string()
        )
    );
}

#[test]
fn no_votes_yet_reports_missing_approvals() {
    let request = submitted_request(1, 48);
    assert_eq!(
        evaluate(&request, &[], Utc::now()),
        Decision::Pending("need 2 more approvals".to_string())
    );
}

#[test]
fn non_submitted_request_is_not_eligible() {
    for status in [
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::Archived,
    ] {
        let mut request = submitted_request(1, 48);
        request.status = status;
        let votes = vec![
            vote(1, 1, 10, VoteValue::Approve),
            vote(2, 1, 11, VoteValue::Approve),
        ];
        assert_eq!(
            evaluate(&request, &votes, Utc::now()),
            Decision::NotEligible("not in submitted status".to_string())
        );
    }
}
