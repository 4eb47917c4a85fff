use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A support-team member's position on a formation request.
///
/// `Pass` is a recorded abstention; it never affects the outcome. `Object`
/// and `Discuss` block approval but never reject — rejection is always an
/// explicit manual action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteValue {
    Approve,
    Pass,
    Object,
    Discuss,
}

impl VoteValue {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteValue::Approve => "approve",
            VoteValue::Pass => "pass",
            VoteValue::Object => "object",
            VoteValue::Discuss => "discuss",
        }
    }

    pub fn parse(s: &str) -> Option<VoteValue> {
        match s {
            "approve" => Some(VoteValue::Approve),
            "pass" => Some(VoteValue::Pass),
            "object" => Some(VoteValue::Object),
            "discuss" => Some(VoteValue::Discuss),
            _ => None,
        }
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One vote on one request. Unique per (request, voter); re-voting updates
/// the existing row.
#[derive(Debug, Clone, Serialize)]
pub struct Vote {
    pub id: i64,
    pub request_id: i64,
    pub voter_id: i64,
    pub value: VoteValue,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Vote as shown in the request detail view.
#[derive(Debug, Clone, Serialize)]
pub struct VoteListItem {
    pub id: i64,
    pub voter_id: i64,
    pub voter_name: String,
    pub value: VoteValue,
    pub comment: String,
    pub updated_at: DateTime<Utc>,
}

/// JSON payload for casting (or revising) a vote.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteForm {
    pub voter_id: i64,
    pub value: String,
    #[serde(default)]
    pub comment: String,
}
