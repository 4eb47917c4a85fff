use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    New,
    Contacted,
    Joined,
    Closed,
}

impl InquiryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InquiryStatus::New => "new",
            InquiryStatus::Contacted => "contacted",
            InquiryStatus::Joined => "joined",
            InquiryStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<InquiryStatus> {
        match s {
            "new" => Some(InquiryStatus::New),
            "contacted" => Some(InquiryStatus::Contacted),
            "joined" => Some(InquiryStatus::Joined),
            "closed" => Some(InquiryStatus::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Someone asking to join a LifeLine.
#[derive(Debug, Clone, Serialize)]
pub struct Inquiry {
    pub id: i64,
    pub lifeline_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInquiry {
    pub lifeline_id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}
