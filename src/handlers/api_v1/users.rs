use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use super::{PaginatedResponse, paging};
use crate::auth::password;
use crate::errors::AppError;
use crate::models::user::{self, NewUser, UserRole};

/// GET /api/v1/users
pub async fn list(
    pool: web::Data<PgPool>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let (page, per_page) = paging(&query);
    let (items, total) = user::list(&pool, page, per_page).await?;
    Ok(HttpResponse::Ok().json(PaginatedResponse {
        items,
        page,
        per_page,
        total,
    }))
}

/// POST /api/v1/users — create an account. The password is hashed before
/// storage and never echoed back.
pub async fn create(
    pool: web::Data<PgPool>,
    payload: web::Json<NewUser>,
) -> Result<HttpResponse, AppError> {
    let new = payload.into_inner();
    if !new.email.contains('@') {
        return Err(AppError::Validation(
            "email is not a valid email address".to_string(),
        ));
    }
    if new.display_name.trim().is_empty() {
        return Err(AppError::Validation("display_name is required".to_string()));
    }
    if new.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    let role = match &new.role {
        Some(r) => UserRole::parse(r)
            .ok_or_else(|| AppError::Validation(format!("unknown role '{r}'")))?,
        None => UserRole::Member,
    };

    let hashed = password::hash_password(&new.password)
        .map_err(|e| AppError::Hash(e.to_string()))?;

    match user::create(
        &pool,
        new.email.trim(),
        new.display_name.trim(),
        &hashed,
        role,
    )
    .await
    {
        Ok(id) => Ok(HttpResponse::Created().json(json!({ "id": id }))),
        Err(AppError::Db(e))
            if e.as_database_error()
                .map(|d| d.is_unique_violation())
                .unwrap_or(false) =>
        {
            Err(AppError::Validation(
                "a user with that email already exists".to_string(),
            ))
        }
        Err(e) => Err(e),
    }
}

/// GET /api/v1/users/{id}
pub async fn detail(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let found = user::find_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(found))
}

#[derive(Deserialize)]
pub struct RoleForm {
    pub role: String,
}

/// POST /api/v1/users/{id}/role
pub async fn update_role(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    payload: web::Json<RoleForm>,
) -> Result<HttpResponse, AppError> {
    let role = UserRole::parse(&payload.role)
        .ok_or_else(|| AppError::Validation(format!("unknown role '{}'", payload.role)))?;
    if !user::update_role(&pool, path.into_inner(), role).await? {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::Ok().json(json!({ "role": role })))
}

#[derive(Deserialize)]
pub struct ActiveForm {
    pub active: bool,
}

/// POST /api/v1/users/{id}/active — activate or deactivate an account.
pub async fn set_active(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    payload: web::Json<ActiveForm>,
) -> Result<HttpResponse, AppError> {
    if !user::set_active(&pool, path.into_inner(), payload.active).await? {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::Ok().json(json!({ "active": payload.active })))
}
