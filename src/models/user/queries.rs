use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::types::*;
use crate::errors::AppError;

const SELECT_USER: &str = "SELECT id, email, display_name, role, is_active, created_at, updated_at \
 FROM users";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    display_name: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn from_row(row: UserRow) -> Result<User, AppError> {
    let role = UserRole::parse(&row.role)
        .ok_or_else(|| AppError::Data(format!("unknown user role '{}'", row.role)))?;
    Ok(User {
        id: row.id,
        email: row.email,
        display_name: row.display_name,
        role,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(from_row).transpose()
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await?;
    row.map(from_row).transpose()
}

pub async fn list(pool: &PgPool, page: i64, per_page: i64) -> Result<(Vec<User>, i64), AppError> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, UserRow>(&format!(
        "{SELECT_USER} ORDER BY display_name, id LIMIT $1 OFFSET $2"
    ))
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let items = rows.into_iter().map(from_row).collect::<Result<Vec<_>, _>>()?;
    Ok((items, total))
}

/// Create a user. The caller hashes the password first.
pub async fn create(
    pool: &PgPool,
    email: &str,
    display_name: &str,
    password_hash: &str,
    role: UserRole,
) -> Result<i64, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (email, display_name, password_hash, role) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(email)
    .bind(display_name)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn update_role(pool: &PgPool, id: i64, role: UserRole) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2")
        .bind(role.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_active(pool: &PgPool, id: i64, active: bool) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE users SET is_active = $1, updated_at = NOW() WHERE id = $2")
        .bind(active)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
