use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    SupportTeam,
    GroupLeader,
    Member,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::SupportTeam => "support_team",
            UserRole::GroupLeader => "group_leader",
            UserRole::Member => "member",
        }
    }

    pub fn parse(s: &str) -> Option<UserRole> {
        match s {
            "admin" => Some(UserRole::Admin),
            "support_team" => Some(UserRole::SupportTeam),
            "group_leader" => Some(UserRole::GroupLeader),
            "member" => Some(UserRole::Member),
            _ => None,
        }
    }

    /// Roles allowed to vote on formation requests.
    pub fn can_vote(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SupportTeam)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account. The password hash never leaves the queries layer.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// JSON payload for creating a user. The password is hashed before storage
/// and never echoed back.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}
