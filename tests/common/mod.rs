//! Shared test infrastructure for workflow tests.
//!
//! The approval workflow is written against the `WorkflowStore` and
//! `Notifier` ports, so these tests run against in-memory fakes instead of
//! a live database or mail relay.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use lifeline::models::formation_request::{FormationRequest, RequestStatus};
use lifeline::models::user::UserRole;
use lifeline::models::vote::{Vote, VoteValue};
use lifeline::notify::{Notifier, NotifyError};
use lifeline::workflow::FormationWorkflow;
use lifeline::workflow::ports::{ProvisionRecord, RequestWithVotes, StoreError, WorkflowStore};

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct StoredLifeline {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub leader_id: i64,
    pub formation_request_id: i64,
}

#[derive(Default)]
struct MemState {
    requests: HashMap<i64, FormationRequest>,
    votes: HashMap<i64, Vec<Vote>>,
    users: Vec<StoredUser>,
    lifelines: Vec<StoredLifeline>,
    next_id: i64,
}

/// In-memory `WorkflowStore`. A single mutex over the whole state makes
/// `provision` atomic, mirroring the transactional claim in the real store.
pub struct MemStore {
    state: Mutex<MemState>,
    /// Request ids whose provisioning should fail with a backend error.
    pub fail_provision_for: Mutex<Vec<i64>>,
}

impl MemStore {
    pub fn new() -> Arc<MemStore> {
        Arc::new(MemStore {
            state: Mutex::new(MemState {
                next_id: 1000,
                ..MemState::default()
            }),
            fail_provision_for: Mutex::new(Vec::new()),
        })
    }

    pub fn insert_request(&self, request: FormationRequest, votes: Vec<Vote>) {
        let mut state = self.state.lock().unwrap();
        state.votes.insert(request.id, votes);
        state.requests.insert(request.id, request);
    }

    pub fn insert_user(&self, email: &str, display_name: &str, role: UserRole) -> i64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.users.push(StoredUser {
            id,
            email: email.to_string(),
            display_name: display_name.to_string(),
            password_hash: String::new(),
            role,
        });
        id
    }

    pub fn request(&self, id: i64) -> FormationRequest {
        self.state.lock().unwrap().requests[&id].clone()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    pub fn lifeline_count(&self) -> usize {
        self.state.lock().unwrap().lifelines.len()
    }

    pub fn lifeline_for_request(&self, request_id: i64) -> Option<StoredLifeline> {
        self.state
            .lock()
            .unwrap()
            .lifelines
            .iter()
            .find(|l| l.formation_request_id == request_id)
            .cloned()
    }

    pub fn user_by_email(&self, email: &str) -> Option<StoredUser> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }
}

#[async_trait]
impl WorkflowStore for MemStore {
    async fn load_request(&self, request_id: i64) -> Result<Option<RequestWithVotes>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.requests.get(&request_id).map(|request| RequestWithVotes {
            request: request.clone(),
            votes: state.votes.get(&request_id).cloned().unwrap_or_default(),
        }))
    }

    async fn list_open_requests(&self) -> Result<Vec<RequestWithVotes>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut open: Vec<_> = state
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Submitted && !r.group_created)
            .map(|request| RequestWithVotes {
                request: request.clone(),
                votes: state.votes.get(&request.id).cloned().unwrap_or_default(),
            })
            .collect();
        open.sort_by_key(|l| l.request.id);
        Ok(open)
    }

    async fn provision(
        &self,
        request: &FormationRequest,
        leader_password_hash: &str,
    ) -> Result<ProvisionRecord, StoreError> {
        if self
            .fail_provision_for
            .lock()
            .unwrap()
            .contains(&request.id)
        {
            return Err(StoreError::Backend(
                "injected provisioning failure".to_string(),
            ));
        }

        let mut state = self.state.lock().unwrap();

        {
            let stored = state
                .requests
                .get_mut(&request.id)
                .ok_or_else(|| StoreError::Backend("request vanished".to_string()))?;
            if stored.group_created {
                return Err(StoreError::Conflict);
            }
            stored.group_created = true;
            stored.status = RequestStatus::Approved;
        }

        let existing = state
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(&request.leader_email))
            .map(|u| u.id);
        let (leader_id, leader_created) = match existing {
            Some(id) => (id, false),
            None => {
                state.next_id += 1;
                let id = state.next_id;
                state.users.push(StoredUser {
                    id,
                    email: request.leader_email.clone(),
                    display_name: request.leader_name.clone(),
                    password_hash: leader_password_hash.to_string(),
                    role: UserRole::GroupLeader,
                });
                (id, true)
            }
        };

        state.next_id += 1;
        let lifeline_id = state.next_id;
        state.lifelines.push(StoredLifeline {
            id: lifeline_id,
            title: request.title.clone(),
            status: "draft".to_string(),
            leader_id,
            formation_request_id: request.id,
        });

        Ok(ProvisionRecord {
            leader_id,
            leader_created,
            lifeline_id,
        })
    }

    async fn mark_rejected(
        &self,
        request_id: i64,
        reason: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        match state.requests.get_mut(&request_id) {
            Some(request) if request.status == RequestStatus::Submitted => {
                request.status = RequestStatus::Rejected;
                request.rejection_reason = reason.map(str::to_string);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(StoreError::Backend("request vanished".to_string())),
        }
    }
}

// ============================================================================
// RECORDING NOTIFIER
// ============================================================================

#[derive(Debug, Clone)]
pub struct SentWelcome {
    pub email: String,
    pub display_name: String,
    pub temp_credential: Option<String>,
    pub group_title: String,
}

#[derive(Debug, Clone)]
pub struct SentRejection {
    pub email: String,
    pub display_name: String,
    pub group_title: String,
    pub reason: Option<String>,
}

/// Notifier that records every send. With `fail` set, sends are still
/// recorded but report failure, for testing the swallow-and-log policy.
#[derive(Default)]
pub struct RecordingNotifier {
    pub welcomes: Mutex<Vec<SentWelcome>>,
    pub rejections: Mutex<Vec<SentRejection>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<RecordingNotifier> {
        Arc::new(RecordingNotifier::default())
    }

    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_welcome(
        &self,
        email: &str,
        display_name: &str,
        temp_credential: Option<&str>,
        group_title: &str,
    ) -> Result<(), NotifyError> {
        self.welcomes.lock().unwrap().push(SentWelcome {
            email: email.to_string(),
            display_name: display_name.to_string(),
            temp_credential: temp_credential.map(str::to_string),
            group_title: group_title.to_string(),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::SendFailed(
                "injected notifier failure".to_string(),
            ));
        }
        Ok(())
    }

    async fn send_rejection(
        &self,
        email: &str,
        display_name: &str,
        group_title: &str,
        reason: Option<&str>,
    ) -> Result<(), NotifyError> {
        self.rejections.lock().unwrap().push(SentRejection {
            email: email.to_string(),
            display_name: display_name.to_string(),
            group_title: group_title.to_string(),
            reason: reason.map(str::to_string),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::SendFailed(
                "injected notifier failure".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// A submitted request created `age_hours` ago.
pub fn submitted_request(id: i64, age_hours: i64) -> FormationRequest {
    let created = Utc::now() - Duration::hours(age_hours);
    FormationRequest {
        id,
        title: format!("Group {id}"),
        description: "A small group".to_string(),
        leader_name: "Pat Leader".to_string(),
        leader_email: format!("leader{id}@parish.test"),
        meeting_day: "Tuesday".to_string(),
        meeting_time: "19:00".to_string(),
        frequency: "weekly".to_string(),
        group_type: "study".to_string(),
        life_stage: "adults".to_string(),
        status: RequestStatus::Submitted,
        group_created: false,
        rejection_reason: None,
        created_at: created,
        updated_at: created,
    }
}

pub fn vote(id: i64, request_id: i64, voter_id: i64, value: VoteValue) -> Vote {
    let now = Utc::now();
    Vote {
        id,
        request_id,
        voter_id,
        value,
        comment: String::new(),
        created_at: now,
        updated_at: now,
    }
}

pub fn approvals(request_id: i64, count: i64) -> Vec<Vote> {
    (0..count)
        .map(|i| vote(i + 1, request_id, 100 + i, VoteValue::Approve))
        .collect()
}

pub fn workflow_over(
    store: Arc<MemStore>,
    notifier: Arc<RecordingNotifier>,
) -> FormationWorkflow {
    FormationWorkflow::new(store, notifier)
}
