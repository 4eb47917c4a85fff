use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::types::*;
use crate::errors::AppError;

const SELECT_LIFELINE: &str = "SELECT id, title, description, status, leader_id, \
        formation_request_id, meeting_day, meeting_time, frequency, \
        group_type, life_stage, created_at, updated_at \
 FROM lifelines";

#[derive(sqlx::FromRow)]
struct LifelineRow {
    id: i64,
    title: String,
    description: String,
    status: String,
    leader_id: i64,
    formation_request_id: Option<i64>,
    meeting_day: String,
    meeting_time: String,
    frequency: String,
    group_type: String,
    life_stage: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn from_row(row: LifelineRow) -> Result<Lifeline, AppError> {
    let status = LifelineStatus::parse(&row.status)
        .ok_or_else(|| AppError::Data(format!("unknown lifeline status '{}'", row.status)))?;
    Ok(Lifeline {
        id: row.id,
        title: row.title,
        description: row.description,
        status,
        leader_id: row.leader_id,
        formation_request_id: row.formation_request_id,
        meeting_day: row.meeting_day,
        meeting_time: row.meeting_time,
        frequency: row.frequency,
        group_type: row.group_type,
        life_stage: row.life_stage,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Lifeline>, AppError> {
    let row = sqlx::query_as::<_, LifelineRow>(&format!("{SELECT_LIFELINE} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(from_row).transpose()
}

pub async fn list(
    pool: &PgPool,
    status: Option<LifelineStatus>,
    page: i64,
    per_page: i64,
) -> Result<(Vec<Lifeline>, i64), AppError> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;
    let status = status.map(|s| s.as_str());

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM lifelines WHERE $1::TEXT IS NULL OR status = $1")
            .bind(status)
            .fetch_one(pool)
            .await?;

    let rows = sqlx::query_as::<_, LifelineRow>(&format!(
        "{SELECT_LIFELINE} WHERE $1::TEXT IS NULL OR status = $1 \
         ORDER BY title, id LIMIT $2 OFFSET $3"
    ))
    .bind(status)
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let items = rows.into_iter().map(from_row).collect::<Result<Vec<_>, _>>()?;
    Ok((items, total))
}

/// Create a LifeLine directly in draft status, outside the approval flow.
pub async fn create(pool: &PgPool, new: &NewLifeline) -> Result<i64, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO lifelines \
            (title, description, status, leader_id, \
             meeting_day, meeting_time, frequency, group_type, life_stage) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
    )
    .bind(new.title.trim())
    .bind(new.description.trim())
    .bind(LifelineStatus::Draft.as_str())
    .bind(new.leader_id)
    .bind(new.meeting_day.trim())
    .bind(new.meeting_time.trim())
    .bind(new.frequency.trim())
    .bind(new.group_type.trim())
    .bind(new.life_stage.trim())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn update(pool: &PgPool, id: i64, update: &UpdateLifeline) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE lifelines SET title = $1, description = $2, meeting_day = $3, \
                meeting_time = $4, frequency = $5, group_type = $6, \
                life_stage = $7, updated_at = NOW() \
         WHERE id = $8",
    )
    .bind(update.title.trim())
    .bind(update.description.trim())
    .bind(update.meeting_day.trim())
    .bind(update.meeting_time.trim())
    .bind(update.frequency.trim())
    .bind(update.group_type.trim())
    .bind(update.life_stage.trim())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Publish a draft LifeLine. Returns false when it isn't in draft.
pub async fn publish(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE lifelines SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3",
    )
    .bind(LifelineStatus::Active.as_str())
    .bind(id)
    .bind(LifelineStatus::Draft.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Archive a draft or active LifeLine. Returns false when already archived.
pub async fn archive(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE lifelines SET status = $1, updated_at = NOW() \
         WHERE id = $2 AND status IN ($3, $4)",
    )
    .bind(LifelineStatus::Archived.as_str())
    .bind(id)
    .bind(LifelineStatus::Draft.as_str())
    .bind(LifelineStatus::Active.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
