use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use super::{PaginatedResponse, paging};
use crate::errors::AppError;
use crate::models::ticket::{self, NewTicket, TicketStatus};
use crate::models::user;

/// GET /api/v1/tickets — list with optional status filter.
pub async fn list(
    pool: web::Data<PgPool>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let status = match query.get("status") {
        Some(s) => Some(
            TicketStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown status '{s}'")))?,
        ),
        None => None,
    };
    let (page, per_page) = paging(&query);

    let (items, total) = ticket::list(&pool, status, page, per_page).await?;
    Ok(HttpResponse::Ok().json(PaginatedResponse {
        items,
        page,
        per_page,
        total,
    }))
}

/// POST /api/v1/tickets — open a support ticket.
pub async fn create(
    pool: web::Data<PgPool>,
    payload: web::Json<NewTicket>,
) -> Result<HttpResponse, AppError> {
    let new = payload.into_inner();
    if new.subject.trim().is_empty() {
        return Err(AppError::Validation("subject is required".to_string()));
    }
    if !new.requester_email.contains('@') {
        return Err(AppError::Validation(
            "requester_email is not a valid email address".to_string(),
        ));
    }

    let id = ticket::create(&pool, &new).await?;
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// GET /api/v1/tickets/{id}
pub async fn detail(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let found = ticket::find_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(found))
}

#[derive(Deserialize)]
pub struct TicketStatusForm {
    pub status: String,
    #[serde(default)]
    pub assigned_to: Option<i64>,
}

/// POST /api/v1/tickets/{id}/status — change status and assignment.
pub async fn update_status(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    payload: web::Json<TicketStatusForm>,
) -> Result<HttpResponse, AppError> {
    let form = payload.into_inner();
    let status = TicketStatus::parse(&form.status)
        .ok_or_else(|| AppError::Validation(format!("unknown status '{}'", form.status)))?;

    if let Some(assignee) = form.assigned_to {
        user::find_by_id(&pool, assignee)
            .await?
            .ok_or_else(|| AppError::Validation("assignee does not exist".to_string()))?;
    }

    if !ticket::update_status(&pool, path.into_inner(), status, form.assigned_to).await? {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::Ok().json(json!({ "status": status })))
}
