use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::types::*;
use crate::errors::AppError;

const SELECT_TICKET: &str = "SELECT id, subject, body, requester_name, requester_email, status, \
        assigned_to, created_at, updated_at \
 FROM support_tickets";

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: i64,
    subject: String,
    body: String,
    requester_name: String,
    requester_email: String,
    status: String,
    assigned_to: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn from_row(row: TicketRow) -> Result<Ticket, AppError> {
    let status = TicketStatus::parse(&row.status)
        .ok_or_else(|| AppError::Data(format!("unknown ticket status '{}'", row.status)))?;
    Ok(Ticket {
        id: row.id,
        subject: row.subject,
        body: row.body,
        requester_name: row.requester_name,
        requester_email: row.requester_email,
        status,
        assigned_to: row.assigned_to,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Ticket>, AppError> {
    let row = sqlx::query_as::<_, TicketRow>(&format!("{SELECT_TICKET} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(from_row).transpose()
}

pub async fn create(pool: &PgPool, new: &NewTicket) -> Result<i64, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO support_tickets (subject, body, requester_name, requester_email) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(new.subject.trim())
    .bind(new.body.trim())
    .bind(new.requester_name.trim())
    .bind(new.requester_email.trim())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn list(
    pool: &PgPool,
    status: Option<TicketStatus>,
    page: i64,
    per_page: i64,
) -> Result<(Vec<Ticket>, i64), AppError> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;
    let status = status.map(|s| s.as_str());

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM support_tickets WHERE $1::TEXT IS NULL OR status = $1",
    )
    .bind(status)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, TicketRow>(&format!(
        "{SELECT_TICKET} WHERE $1::TEXT IS NULL OR status = $1 \
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

/// Update a ticket's status and assignee together; passing no assignee
/// clears the assignment.
pub async fn update_status(
    pool: &PgPool,
    id: i64,
    status: TicketStatus,
    assigned_to: Option<i64>,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE support_tickets SET status = $1, assigned_to = $2, updated_at = NOW() \
         WHERE id = $3",
    )
    .bind(status.as_str())
    .bind(assigned_to)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
