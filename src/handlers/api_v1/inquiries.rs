use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use super::{PaginatedResponse, paging};
use crate::errors::AppError;
use crate::models::inquiry::{self, InquiryStatus, NewInquiry};
use crate::models::lifeline;

/// GET /api/v1/inquiries — list with optional lifeline_id and status filters.
pub async fn list(
    pool: web::Data<PgPool>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let lifeline_id = query.get("lifeline_id").and_then(|s| s.parse::<i64>().ok());
    let status = match query.get("status") {
        Some(s) => Some(
            InquiryStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown status '{s}'")))?,
        ),
        None => None,
    };
    let (page, per_page) = paging(&query);

    let (items, total) = inquiry::list(&pool, lifeline_id, status, page, per_page).await?;
    Ok(HttpResponse::Ok().json(PaginatedResponse {
        items,
        page,
        per_page,
        total,
    }))
}

/// POST /api/v1/inquiries — record a membership inquiry.
pub async fn create(
    pool: web::Data<PgPool>,
    payload: web::Json<NewInquiry>,
) -> Result<HttpResponse, AppError> {
    let new = payload.into_inner();
    if new.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if !new.email.contains('@') {
        return Err(AppError::Validation(
            "email is not a valid email address".to_string(),
        ));
    }
    lifeline::find_by_id(&pool, new.lifeline_id)
        .await?
        .ok_or_else(|| AppError::Validation("lifeline does not exist".to_string()))?;

    let id = inquiry::create(&pool, &new).await?;
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

#[derive(Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// POST /api/v1/inquiries/{id}/status
pub async fn update_status(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    payload: web::Json<StatusForm>,
) -> Result<HttpResponse, AppError> {
    let status = InquiryStatus::parse(&payload.status)
        .ok_or_else(|| AppError::Validation(format!("unknown status '{}'", payload.status)))?;
    if !inquiry::update_status(&pool, path.into_inner(), status).await? {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::Ok().json(json!({ "status": status })))
}
