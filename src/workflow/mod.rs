pub mod decision;
pub mod pg;
pub mod ports;
pub mod scheduler;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::auth::{credential, password};
use crate::models::formation_request::{FormationRequest, RequestStatus};
use crate::notify::Notifier;
use ports::{RequestWithVotes, StoreError, WorkflowStore};

pub use decision::Decision;

/// Upper bound on a single notification send. The transition commits
/// before any send starts, so a slow mail relay can only delay the
/// response, never the state change.
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub enum WorkflowError {
    NotFound,
    /// The request is not in a state the operation accepts; re-check state.
    NotEligible(String),
    /// Provisioning already happened, here or in a concurrent caller.
    /// Success-adjacent: the request is approved and the group exists.
    AlreadyProvisioned,
    /// The requested status change is not defined from the current status.
    InvalidTransition { from: RequestStatus },
    Persistence(String),
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::NotFound => write!(f, "formation request not found"),
            WorkflowError::NotEligible(reason) => write!(f, "not eligible: {reason}"),
            WorkflowError::AlreadyProvisioned => write!(f, "request already provisioned"),
            WorkflowError::InvalidTransition { from } => {
                write!(f, "invalid transition from {from} status")
            }
            WorkflowError::Persistence(e) => write!(f, "persistence failure: {e}"),
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => WorkflowError::AlreadyProvisioned,
            StoreError::Backend(msg) => WorkflowError::Persistence(msg),
        }
    }
}

/// Outcome of a successful provisioning run. The plaintext temporary
/// credential is deliberately absent: it is emailed to the leader and
/// otherwise discarded.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProvisionResult {
    pub request_id: i64,
    pub leader_id: i64,
    pub leader_created: bool,
    pub lifeline_id: i64,
}

/// What the sweep did with one request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SweepAction {
    Provisioned { leader_id: i64, lifeline_id: i64 },
    AlreadyProvisioned,
    Skipped,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub request_id: i64,
    pub decision: Decision,
    #[serde(flatten)]
    pub action: SweepAction,
}

/// The formation-request approval workflow: quorum evaluation, atomic
/// provisioning, manual rejection, and the periodic sweep over everything
/// still under review.
pub struct FormationWorkflow {
    store: Arc<dyn WorkflowStore>,
    notifier: Arc<dyn Notifier>,
}

impl FormationWorkflow {
    pub fn new(store: Arc<dyn WorkflowStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Decide what should happen to a request right now. Read-only.
    pub async fn evaluate(&self, request_id: i64) -> Result<Decision, WorkflowError> {
        let loaded = self
            .store
            .load_request(request_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;
        Ok(decision::evaluate(&loaded.request, &loaded.votes, Utc::now()))
    }

    /// Provision the leader account and draft lifeline for a request.
    ///
    /// Idempotent: a request that was already provisioned, or that loses
    /// the conditional claim to a concurrent caller, reports
    /// `AlreadyProvisioned` with no additional writes.
    pub async fn approve(&self, request_id: i64) -> Result<ProvisionResult, WorkflowError> {
        let RequestWithVotes { request, .. } = self
            .store
            .load_request(request_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;
        self.provision(&request).await
    }

    async fn provision(&self, request: &FormationRequest) -> Result<ProvisionResult, WorkflowError> {
        if request.group_created {
            return Err(WorkflowError::AlreadyProvisioned);
        }

        // Hashed up front so the account row can be written inside the same
        // transaction that claims the request.
        let temp_credential = credential::generate();
        let hash = password::hash_password(&temp_credential)
            .map_err(|e| WorkflowError::Persistence(format!("credential hash: {e}")))?;

        let record = self.store.provision(request, &hash).await?;

        let result = ProvisionResult {
            request_id: request.id,
            leader_id: record.leader_id,
            leader_created: record.leader_created,
            lifeline_id: record.lifeline_id,
        };

        // Committed. An existing account keeps its password, so the
        // credential is only disclosed for accounts created just now.
        let credential = record.leader_created.then_some(temp_credential.as_str());
        let send = self.notifier.send_welcome(
            &request.leader_email,
            &request.leader_name,
            credential,
            &request.title,
        );
        match tokio::time::timeout(NOTIFY_TIMEOUT, send).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!(
                "Welcome notification for request {} failed: {}",
                request.id,
                e
            ),
            Err(_) => log::warn!("Welcome notification for request {} timed out", request.id),
        }

        Ok(result)
    }

    /// Manually reject a submitted request, recording the optional reason.
    pub async fn reject(
        &self,
        request_id: i64,
        reason: Option<&str>,
    ) -> Result<(), WorkflowError> {
        let RequestWithVotes { request, .. } = self
            .store
            .load_request(request_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;
        if request.status != RequestStatus::Submitted {
            return Err(WorkflowError::InvalidTransition {
                from: request.status,
            });
        }

        if !self.store.mark_rejected(request_id, reason).await? {
            // Lost a race between the status check and the update; re-read
            // so the error names the status that actually won.
            let from = self
                .store
                .load_request(request_id)
                .await?
                .map(|loaded| loaded.request.status)
                .unwrap_or(request.status);
            return Err(WorkflowError::InvalidTransition { from });
        }

        let send = self.notifier.send_rejection(
            &request.leader_email,
            &request.leader_name,
            &request.title,
            reason,
        );
        match tokio::time::timeout(NOTIFY_TIMEOUT, send).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!(
                "Rejection notification for request {} failed: {}",
                request.id,
                e
            ),
            Err(_) => log::warn!(
                "Rejection notification for request {} timed out",
                request.id
            ),
        }

        Ok(())
    }

    /// Evaluate every open request, provisioning the ones that pass quorum.
    ///
    /// One request's failure never aborts the rest of the batch; each
    /// request gets its own outcome. Safe to run concurrently with itself
    /// and with manual approve/reject — the conditional claim ensures a
    /// request is only ever provisioned once.
    pub async fn sweep(&self) -> Result<Vec<SweepOutcome>, WorkflowError> {
        let open = self.store.list_open_requests().await?;
        let now = Utc::now();

        let mut outcomes = Vec::with_capacity(open.len());
        for RequestWithVotes { request, votes } in open {
            let decision = decision::evaluate(&request, &votes, now);
            let action = match &decision {
                Decision::Approve => match self.provision(&request).await {
                    Ok(result) => SweepAction::Provisioned {
                        leader_id: result.leader_id,
                        lifeline_id: result.lifeline_id,
                    },
                    Err(WorkflowError::AlreadyProvisioned) => SweepAction::AlreadyProvisioned,
                    Err(e) => {
                        log::error!("Sweep: provisioning request {} failed: {}", request.id, e);
                        SweepAction::Failed {
                            error: e.to_string(),
                        }
                    }
                },
                _ => SweepAction::Skipped,
            };
            outcomes.push(SweepOutcome {
                request_id: request.id,
                decision,
                action,
            });
        }
        Ok(outcomes)
    }
}
