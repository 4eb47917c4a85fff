use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a formation request. `Submitted` is the initial
/// state; the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Submitted,
    Approved,
    Rejected,
    Archived,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Submitted => "submitted",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<RequestStatus> {
        match s {
            "submitted" => Some(RequestStatus::Submitted),
            "approved" => Some(RequestStatus::Approved),
            "rejected" => Some(RequestStatus::Rejected),
            "archived" => Some(RequestStatus::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposal to start a new LifeLine, reviewed by the support team.
///
/// `created_at` opens the mandatory review window; `group_created` flips
/// exactly once, when provisioning commits, and guards against re-running
/// approval on the same request.
#[derive(Debug, Clone, Serialize)]
pub struct FormationRequest {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub leader_name: String,
    pub leader_email: String,
    pub meeting_day: String,
    pub meeting_time: String,
    pub frequency: String,
    pub group_type: String,
    pub life_stage: String,
    pub status: RequestStatus,
    pub group_created: bool,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// JSON payload for submitting a formation request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFormationRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub leader_name: String,
    pub leader_email: String,
    #[serde(default)]
    pub meeting_day: String,
    #[serde(default)]
    pub meeting_time: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub group_type: String,
    #[serde(default)]
    pub life_stage: String,
}

/// Review comment on a request, with the author's name joined in.
#[derive(Debug, Clone, Serialize)]
pub struct RequestComment {
    pub id: i64,
    pub request_id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// JSON payload for adding a review comment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub author_id: i64,
    pub body: String,
}
