use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Publication status of a LifeLine. Provisioned groups start in `Draft`
/// and are published by the parish team once the leader is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifelineStatus {
    Draft,
    Active,
    Archived,
}

impl LifelineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LifelineStatus::Draft => "draft",
            LifelineStatus::Active => "active",
            LifelineStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<LifelineStatus> {
        match s {
            "draft" => Some(LifelineStatus::Draft),
            "active" => Some(LifelineStatus::Active),
            "archived" => Some(LifelineStatus::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for LifelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parish small group. `formation_request_id` links back to the request
/// that spawned it, when the group came through the approval workflow.
#[derive(Debug, Clone, Serialize)]
pub struct Lifeline {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: LifelineStatus,
    pub leader_id: i64,
    pub formation_request_id: Option<i64>,
    pub meeting_day: String,
    pub meeting_time: String,
    pub frequency: String,
    pub group_type: String,
    pub life_stage: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// JSON payload for creating a LifeLine directly (outside the approval
/// workflow, e.g. migrating an existing group).
#[derive(Debug, Clone, Deserialize)]
pub struct NewLifeline {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub leader_id: i64,
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

/// JSON payload for editing a LifeLine's details.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLifeline {
    pub title: String,
    #[serde(default)]
    pub description: String,
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
