use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::types::*;
use crate::errors::AppError;

/// Cast a vote, or revise the voter's existing one. Returns the vote id.
pub async fn upsert(
    pool: &PgPool,
    request_id: i64,
    voter_id: i64,
    value: VoteValue,
    comment: &str,
) -> Result<i64, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO formation_votes (request_id, voter_id, value, comment) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (request_id, voter_id) \
         DO UPDATE SET value = EXCLUDED.value, comment = EXCLUDED.comment, updated_at = NOW() \
         RETURNING id",
    )
    .bind(request_id)
    .bind(voter_id)
    .bind(value.as_str())
    .bind(comment)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// All votes on a request, for the decision logic.
pub async fn find_for_request(pool: &PgPool, request_id: i64) -> Result<Vec<Vote>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        request_id: i64,
        voter_id: i64,
        value: String,
        comment: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, request_id, voter_id, value, comment, created_at, updated_at \
         FROM formation_votes WHERE request_id = $1 ORDER BY created_at",
    )
    .bind(request_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            let value = VoteValue::parse(&r.value)
                .ok_or_else(|| AppError::Data(format!("unknown vote value '{}'", r.value)))?;
            Ok(Vote {
                id: r.id,
                request_id: r.request_id,
                voter_id: r.voter_id,
                value,
                comment: r.comment,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
        })
        .collect()
}

/// Votes on a request with voter names joined in, for the detail view.
pub async fn list_for_request(
    pool: &PgPool,
    request_id: i64,
) -> Result<Vec<VoteListItem>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        voter_id: i64,
        voter_name: String,
        value: String,
        comment: String,
        updated_at: DateTime<Utc>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT v.id, v.voter_id, COALESCE(u.display_name, '') AS voter_name, \
                v.value, v.comment, v.updated_at \
         FROM formation_votes v \
         LEFT JOIN users u ON u.id = v.voter_id \
         WHERE v.request_id = $1 \
         ORDER BY v.created_at",
    )
    .bind(request_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            let value = VoteValue::parse(&r.value)
                .ok_or_else(|| AppError::Data(format!("unknown vote value '{}'", r.value)))?;
            Ok(VoteListItem {
                id: r.id,
                voter_id: r.voter_id,
                voter_name: r.voter_name,
                value,
                comment: r.comment,
                updated_at: r.updated_at,
            })
        })
        .collect()
}
