use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::types::*;
use crate::errors::AppError;

const SELECT_REQUEST: &str = "SELECT id, title, description, leader_name, leader_email, \
        meeting_day, meeting_time, frequency, group_type, life_stage, \
        status, group_created, rejection_reason, created_at, updated_at \
 FROM formation_requests";

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: i64,
    title: String,
    description: String,
    leader_name: String,
    leader_email: String,
    meeting_day: String,
    meeting_time: String,
    frequency: String,
    group_type: String,
    life_stage: String,
    status: String,
    group_created: bool,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn from_row(row: RequestRow) -> Result<FormationRequest, AppError> {
    let status = RequestStatus::parse(&row.status).ok_or_else(|| {
        AppError::Data(format!("unknown formation request status '{}'", row.status))
    })?;
    Ok(FormationRequest {
        id: row.id,
        title: row.title,
        description: row.description,
        leader_name: row.leader_name,
        leader_email: row.leader_email,
        meeting_day: row.meeting_day,
        meeting_time: row.meeting_time,
        frequency: row.frequency,
        group_type: row.group_type,
        life_stage: row.life_stage,
        status,
        group_created: row.group_created,
        rejection_reason: row.rejection_reason,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<FormationRequest>, AppError> {
    let row = sqlx::query_as::<_, RequestRow>(&format!("{SELECT_REQUEST} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(from_row).transpose()
}

/// List requests, newest first, optionally filtered by status.
pub async fn list(
    pool: &PgPool,
    status: Option<RequestStatus>,
    page: i64,
    per_page: i64,
) -> Result<(Vec<FormationRequest>, i64), AppError> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;
    let status = status.map(|s| s.as_str());

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM formation_requests WHERE $1::TEXT IS NULL OR status = $1",
    )
    .bind(status)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, RequestRow>(&format!(
        "{SELECT_REQUEST} WHERE $1::TEXT IS NULL OR status = $1 \
         ORDER BY created_at DESC LIMIT $2 OFFSET $3"
    ))
    .bind(status)
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let items = rows.into_iter().map(from_row).collect::<Result<Vec<_>, _>>()?;
    Ok((items, total))
}

/// All requests still in the review pipeline: submitted and not provisioned.
pub async fn find_open(pool: &PgPool) -> Result<Vec<FormationRequest>, AppError> {
    let rows = sqlx::query_as::<_, RequestRow>(&format!(
        "{SELECT_REQUEST} WHERE status = $1 AND group_created = FALSE ORDER BY created_at"
    ))
    .bind(RequestStatus::Submitted.as_str())
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(from_row).collect()
}

pub async fn create(pool: &PgPool, new: &NewFormationRequest) -> Result<i64, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO formation_requests \
            (title, description, leader_name, leader_email, \
             meeting_day, meeting_time, frequency, group_type, life_stage) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
    )
    .bind(new.title.trim())
    .bind(new.description.trim())
    .bind(new.leader_name.trim())
    .bind(new.leader_email.trim())
    .bind(new.meeting_day.trim())
    .bind(new.meeting_time.trim())
    .bind(new.frequency.trim())
    .bind(new.group_type.trim())
    .bind(new.life_stage.trim())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Archive a request. Only submitted or rejected requests may be archived;
/// returns false when the current status doesn't allow it.
pub async fn archive(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE formation_requests SET status = $1, updated_at = NOW() \
         WHERE id = $2 AND status IN ($3, $4)",
    )
    .bind(RequestStatus::Archived.as_str())
    .bind(id)
    .bind(RequestStatus::Submitted.as_str())
    .bind(RequestStatus::Rejected.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn add_comment(
    pool: &PgPool,
    request_id: i64,
    author_id: i64,
    body: &str,
) -> Result<i64, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO formation_comments (request_id, author_id, body) \
         VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(request_id)
    .bind(author_id)
    .bind(body)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn list_comments(pool: &PgPool, request_id: i64) -> Result<Vec<RequestComment>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        request_id: i64,
        author_id: i64,
        author_name: String,
        body: String,
        created_at: DateTime<Utc>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT c.id, c.request_id, c.author_id, \
                COALESCE(u.display_name, '') AS author_name, \
                c.body, c.created_at \
         FROM formation_comments c \
         LEFT JOIN users u ON u.id = c.author_id \
         WHERE c.request_id = $1 \
         ORDER BY c.created_at",
    )
    .bind(request_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| RequestComment {
            id: r.id,
            request_id: r.request_id,
            author_id: r.author_id,
            author_name: r.author_name,
            body: r.body,
            created_at: r.created_at,
        })
        .collect())
}
