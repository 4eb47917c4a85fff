use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::formation_request::{FormationRequest, RequestStatus};
use crate::models::vote::{Vote, VoteValue};

/// Minimum age of a request before it can be approved. A fast unanimous
/// vote must not short-circuit deliberation.
pub const REVIEW_WINDOW_HOURS: i64 = 24;

/// Approvals needed for quorum.
pub const REQUIRED_APPROVALS: i64 = 2;

/// What should happen to a formation request right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Pending(String),
    NotEligible(String),
}

/// Vote counts by value. Passes are tallied for the record but never
/// affect the decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub approvals: i64,
    pub objections: i64,
    pub discussions: i64,
    pub passes: i64,
}

pub fn tally(votes: &[Vote]) -> VoteTally {
    let mut counts = VoteTally::default();
    for vote in votes {
        match vote.value {
            VoteValue::Approve => counts.approvals += 1,
            VoteValue::Object => counts.objections += 1,
            VoteValue::Discuss => counts.discussions += 1,
            VoteValue::Pass => counts.passes += 1,
        }
    }
    counts
}

/// Apply the quorum rule to a request and its votes.
///
/// Approve iff the request is at least 24 hours old, has two or more
/// approvals, and has no objections and no open discussions. A single
/// objection or discussion blocks approval regardless of approval count;
/// neither ever triggers rejection, which is always a manual action.
///
/// Pure function of its inputs — safe to call repeatedly from the sweep.
pub fn evaluate(request: &FormationRequest, votes: &[Vote], now: DateTime<Utc>) -> Decision {
    if request.status != RequestStatus::Submitted {
        return Decision::NotEligible("not in submitted status".to_string());
    }

    let counts = tally(votes);
    let age_ok = now - request.created_at >= Duration::hours(REVIEW_WINDOW_HOURS);

    if age_ok
        && counts.approvals >= REQUIRED_APPROVALS
        && counts.objections == 0
        && counts.discussions == 0
    {
        return Decision::Approve;
    }

    if !age_ok {
        return Decision::Pending("needs more review time".to_string());
    }

    let mut unmet = Vec::new();
    if counts.approvals < REQUIRED_APPROVALS {
        unmet.push(format!(
            "need {} more approvals",
            REQUIRED_APPROVALS - counts.approvals
        ));
    }
    if counts.objections > 0 {
        unmet.push(format!("has {} objections", counts.objections));
    }
    if counts.discussions > 0 {
        unmet.push(format!("has {} discussions pending", counts.discussions));
    }
    Decision::Pending(unmet.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn request_created_at(created_at: DateTime<Utc>) -> FormationRequest {
        FormationRequest {
            id: 1,
            title: "Tuesday Study".to_string(),
            description: String::new(),
            leader_name: "Pat".to_string(),
            leader_email: "pat@parish.test".to_string(),
            meeting_day: String::new(),
            meeting_time: String::new(),
            frequency: String::new(),
            group_type: String::new(),
            life_stage: String::new(),
            status: RequestStatus::Submitted,
            group_created: false,
            rejection_reason: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn vote_of(value: VoteValue) -> Vote {
        let now = Utc::now();
        Vote {
            id: 0,
            request_id: 1,
            voter_id: 0,
            value,
            comment: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn tally_counts_each_value() {
        let votes = vec![
            vote_of(VoteValue::Approve),
            vote_of(VoteValue::Approve),
            vote_of(VoteValue::Object),
            vote_of(VoteValue::Discuss),
            vote_of(VoteValue::Pass),
        ];
        let counts = tally(&votes);
        assert_eq!(counts.approvals, 2);
        assert_eq!(counts.objections, 1);
        assert_eq!(counts.discussions, 1);
        assert_eq!(counts.passes, 1);
    }

    #[test]
    fn review_window_boundary_is_inclusive() {
        let created = Utc::now();
        let request = request_created_at(created);
        let votes = vec![vote_of(VoteValue::Approve), vote_of(VoteValue::Approve)];

        let just_before = created + Duration::hours(24) - Duration::seconds(1);
        assert_eq!(
            evaluate(&request, &votes, just_before),
            Decision::Pending("needs more review time".to_string())
        );

        let exactly = created + Duration::hours(24);
        assert_eq!(evaluate(&request, &votes, exactly), Decision::Approve);
    }

    #[test]
    fn young_request_reports_review_time_even_with_blockers() {
        let created = Utc::now();
        let request = request_created_at(created);
        let votes = vec![vote_of(VoteValue::Object)];
        assert_eq!(
            evaluate(&request, &votes, created + Duration::hours(1)),
            Decision::Pending("needs more review time".to_string())
        );
    }
}
