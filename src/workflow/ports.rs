use async_trait::async_trait;
use std::fmt;

use crate::models::formation_request::FormationRequest;
use crate::models::vote::Vote;

#[derive(Debug)]
pub enum StoreError {
    /// The conditional provisioning claim found the request already claimed.
    Conflict,
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict => write!(f, "request already claimed"),
            StoreError::Backend(e) => write!(f, "{e}"),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// A formation request together with its loaded votes.
#[derive(Debug, Clone)]
pub struct RequestWithVotes {
    pub request: FormationRequest,
    pub votes: Vec<Vote>,
}

/// References produced by a successful provisioning transaction.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionRecord {
    pub leader_id: i64,
    /// True when the leader account was created by this transaction rather
    /// than reused.
    pub leader_created: bool,
    pub lifeline_id: i64,
}

/// Persistence contract for the approval workflow.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn load_request(&self, request_id: i64) -> Result<Option<RequestWithVotes>, StoreError>;

    /// All requests still eligible for the sweep: submitted and not
    /// provisioned.
    async fn list_open_requests(&self) -> Result<Vec<RequestWithVotes>, StoreError>;

    /// Atomically claim the request (status to approved and `group_created`
    /// to true, iff it was false), find or create the leader account keyed
    /// by the proposed leader's email, and insert the draft lifeline.
    /// All three writes commit together or not at all. Returns
    /// `Err(Conflict)` when another caller won the claim.
    async fn provision(
        &self,
        request: &FormationRequest,
        leader_password_hash: &str,
    ) -> Result<ProvisionRecord, StoreError>;

    /// Move a submitted request to rejected, recording the reason. Returns
    /// false when the request is no longer in submitted status.
    async fn mark_rejected(&self, request_id: i64, reason: Option<&str>)
    -> Result<bool, StoreError>;
}
