use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::PgPool;

use super::{PaginatedResponse, paging};
use crate::errors::AppError;
use crate::models::lifeline::{self, LifelineStatus, NewLifeline, UpdateLifeline};
use crate::models::user;

/// GET /api/v1/lifelines — list with optional status filter.
pub async fn list(
    pool: web::Data<PgPool>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let status = match query.get("status") {
        Some(s) => Some(
            LifelineStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown status '{s}'")))?,
        ),
        None => None,
    };
    let (page, per_page) = paging(&query);

    let (items, total) = lifeline::list(&pool, status, page, per_page).await?;
    Ok(HttpResponse::Ok().json(PaginatedResponse {
        items,
        page,
        per_page,
        total,
    }))
}

/// POST /api/v1/lifelines — create a draft group directly.
pub async fn create(
    pool: web::Data<PgPool>,
    payload: web::Json<NewLifeline>,
) -> Result<HttpResponse, AppError> {
    let new = payload.into_inner();
    if new.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    user::find_by_id(&pool, new.leader_id)
        .await?
        .ok_or_else(|| AppError::Validation("leader does not exist".to_string()))?;

    let id = lifeline::create(&pool, &new).await?;
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// GET /api/v1/lifelines/{id}
pub async fn detail(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let found = lifeline::find_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(found))
}

/// PUT /api/v1/lifelines/{id} — edit details.
pub async fn update(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    payload: web::Json<UpdateLifeline>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let edit = payload.into_inner();
    if edit.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    if !lifeline::update(&pool, id, &edit).await? {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::Ok().json(json!({ "status": "updated" })))
}

/// POST /api/v1/lifelines/{id}/publish — draft to active.
pub async fn publish(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    lifeline::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !lifeline::publish(&pool, id).await? {
        return Err(AppError::Validation(
            "only draft lifelines can be published".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(json!({ "status": "active" })))
}

/// POST /api/v1/lifelines/{id}/archive
pub async fn archive(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    lifeline::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !lifeline::archive(&pool, id).await? {
        return Err(AppError::Validation(
            "lifeline is already archived".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(json!({ "status": "archived" })))
}
