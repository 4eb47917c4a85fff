use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::types::*;
use crate::errors::AppError;

const SELECT_INQUIRY: &str = "SELECT id, lifeline_id, name, email, phone, message, status, \
        created_at, updated_at \
 FROM inquiries";

#[derive(sqlx::FromRow)]
struct InquiryRow {
    id: i64,
    lifeline_id: i64,
    name: String,
    email: String,
    phone: String,
    message: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn from_row(row: InquiryRow) -> Result<Inquiry, AppError> {
    let status = InquiryStatus::parse(&row.status)
        .ok_or_else(|| AppError::Data(format!("unknown inquiry status '{}'", row.status)))?;
    Ok(Inquiry {
        id: row.id,
        lifeline_id: row.lifeline_id,
        name: row.name,
        email: row.email,
        phone: row.phone,
        message: row.message,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub async fn create(pool: &PgPool, new: &NewInquiry) -> Result<i64, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO inquiries (lifeline_id, name, email, phone, message) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(new.lifeline_id)
    .bind(new.name.trim())
    .bind(new.email.trim())
    .bind(new.phone.trim())
    .bind(new.message.trim())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// List inquiries, newest first, optionally scoped to a LifeLine and/or status.
pub async fn list(
    pool: &PgPool,
    lifeline_id: Option<i64>,
    status: Option<InquiryStatus>,
    page: i64,
    per_page: i64,
) -> Result<(Vec<Inquiry>, i64), AppError> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;
    let status = status.map(|s| s.as_str());

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM inquiries \
         WHERE ($1::BIGINT IS NULL OR lifeline_id = $1) \
           AND ($2::TEXT IS NULL OR status = $2)",
    )
    .bind(lifeline_id)
    .bind(status)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, InquiryRow>(&format!(
        "{SELECT_INQUIRY} \
         WHERE ($1::BIGINT IS NULL OR lifeline_id = $1) \
           AND ($2::TEXT IS NULL OR status = $2) \
         ORDER BY created_at DESC LIMIT $3 OFFSET $4"
    ))
    .bind(lifeline_id)
    .bind(status)
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let items = rows.into_iter().map(from_row).collect::<Result<Vec<_>, _>>()?;
    Ok((items, total))
}

pub async fn update_status(
    pool: &PgPool,
    id: i64,
    status: InquiryStatus,
) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE inquiries SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
