use async_trait::async_trait;
use sqlx::PgPool;

use super::ports::{ProvisionRecord, RequestWithVotes, StoreError, WorkflowStore};
use crate::models::formation_request::{self, FormationRequest, RequestStatus};
use crate::models::lifeline::LifelineStatus;
use crate::models::user::UserRole;
use crate::models::vote;

/// PostgreSQL-backed workflow store.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl WorkflowStore for PgStore {
    async fn load_request(&self, request_id: i64) -> Result<Option<RequestWithVotes>, StoreError> {
        let request = formation_request::find_by_id(&self.pool, request_id)
            .await
            .map_err(backend)?;
        let Some(request) = request else {
            return Ok(None);
        };
        let votes = vote::find_for_request(&self.pool, request_id)
            .await
            .map_err(backend)?;
        Ok(Some(RequestWithVotes { request, votes }))
    }

    async fn list_open_requests(&self) -> Result<Vec<RequestWithVotes>, StoreError> {
        let requests = formation_request::find_open(&self.pool)
            .await
            .map_err(backend)?;
        let mut loaded = Vec::with_capacity(requests.len());
        for request in requests {
            let votes = vote::find_for_request(&self.pool, request.id)
                .await
                .map_err(backend)?;
            loaded.push(RequestWithVotes { request, votes });
        }
        Ok(loaded)
    }

    async fn provision(
        &self,
        request: &FormationRequest,
        leader_password_hash: &str,
    ) -> Result<ProvisionRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Conditional claim: exactly one caller gets to flip group_created.
        // A loser here means a concurrent approve (manual or sweep) won.
        let claimed = sqlx::query(
            "UPDATE formation_requests \
             SET status = $1, group_created = TRUE, updated_at = NOW() \
             WHERE id = $2 AND group_created = FALSE",
        )
        .bind(RequestStatus::Approved.as_str())
        .bind(request.id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Err(StoreError::Conflict);
        }

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(&request.leader_email)
            .fetch_optional(&mut *tx)
            .await?;

        let (leader_id, leader_created) = match existing {
            Some((id,)) => (id, false),
            None => {
                let (id,): (i64,) = sqlx::query_as(
                    "INSERT INTO users (email, display_name, password_hash, role) \
                     VALUES ($1, $2, $3, $4) RETURNING id",
                )
                .bind(&request.leader_email)
                .bind(&request.leader_name)
                .bind(leader_password_hash)
                .bind(UserRole::GroupLeader.as_str())
                .fetch_one(&mut *tx)
                .await?;
                (id, true)
            }
        };

        let (lifeline_id,): (i64,) = sqlx::query_as(
            "INSERT INTO lifelines \
                (title, description, status, leader_id, formation_request_id, \
                 meeting_day, meeting_time, frequency, group_type, life_stage) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(LifelineStatus::Draft.as_str())
        .bind(leader_id)
        .bind(request.id)
        .bind(&request.meeting_day)
        .bind(&request.meeting_time)
        .bind(&request.frequency)
        .bind(&request.group_type)
        .bind(&request.life_stage)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

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
        let result = sqlx::query(
            "UPDATE formation_requests \
             SET status = $1, rejection_reason = $2, updated_at = NOW() \
             WHERE id = $3 AND status = $4",
        )
        .bind(RequestStatus::Rejected.as_str())
        .bind(reason)
        .bind(request_id)
        .bind(RequestStatus::Submitted.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
