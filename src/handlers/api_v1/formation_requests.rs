use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use super::{PaginatedResponse, paging};
use crate::errors::AppError;
use crate::models::formation_request::{self, NewComment, NewFormationRequest, RequestStatus};
use crate::models::user;
use crate::models::vote::{self, VoteForm, VoteValue};
use crate::workflow::FormationWorkflow;

/// GET /api/v1/formation-requests — list with optional status filter.
pub async fn list(
    pool: web::Data<PgPool>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let status = match query.get("status") {
        Some(s) => Some(
            RequestStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown status '{s}'")))?,
        ),
        None => None,
    };
    let (page, per_page) = paging(&query);

    let (items, total) = formation_request::list(&pool, status, page, per_page).await?;
    Ok(HttpResponse::Ok().json(PaginatedResponse {
        items,
        page,
        per_page,
        total,
    }))
}

/// POST /api/v1/formation-requests — submit a new request.
pub async fn create(
    pool: web::Data<PgPool>,
    payload: web::Json<NewFormationRequest>,
) -> Result<HttpResponse, AppError> {
    let new = payload.into_inner();
    if new.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    if new.leader_name.trim().is_empty() {
        return Err(AppError::Validation("leader_name is required".to_string()));
    }
    if !new.leader_email.contains('@') {
        return Err(AppError::Validation(
            "leader_email is not a valid email address".to_string(),
        ));
    }

    let id = formation_request::create(&pool, &new).await?;
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// GET /api/v1/formation-requests/{id} — request with votes and comments.
pub async fn detail(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let request = formation_request::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let votes = vote::list_for_request(&pool, id).await?;
    let comments = formation_request::list_comments(&pool, id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "request": request,
        "votes": votes,
        "comments": comments,
    })))
}

/// POST /api/v1/formation-requests/{id}/votes — cast or revise a vote.
pub async fn cast_vote(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    payload: web::Json<VoteForm>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let form = payload.into_inner();

    let request = formation_request::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if request.status != RequestStatus::Submitted {
        return Err(AppError::Validation(
            "votes can only be cast on submitted requests".to_string(),
        ));
    }

    let value = VoteValue::parse(&form.value)
        .ok_or_else(|| AppError::Validation(format!("unknown vote value '{}'", form.value)))?;

    let voter = user::find_by_id(&pool, form.voter_id)
        .await?
        .ok_or_else(|| AppError::Validation("voter does not exist".to_string()))?;
    if !voter.role.can_vote() {
        return Err(AppError::Validation(
            "only support team members may vote".to_string(),
        ));
    }
    if voter.email.eq_ignore_ascii_case(&request.leader_email) {
        return Err(AppError::Validation(
            "the proposed leader may not vote on their own request".to_string(),
        ));
    }

    let vote_id = vote::upsert(&pool, id, form.voter_id, value, form.comment.trim()).await?;
    Ok(HttpResponse::Ok().json(json!({ "id": vote_id })))
}

/// POST /api/v1/formation-requests/{id}/comments — add a review comment.
pub async fn add_comment(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    payload: web::Json<NewComment>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let new = payload.into_inner();

    if new.body.trim().is_empty() {
        return Err(AppError::Validation("comment body is required".to_string()));
    }
    let request = formation_request::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let author = user::find_by_id(&pool, new.author_id)
        .await?
        .ok_or_else(|| AppError::Validation("author does not exist".to_string()))?;
    if !author.role.can_vote() {
        return Err(AppError::Validation(
            "only support team members may comment".to_string(),
        ));
    }
    if author.email.eq_ignore_ascii_case(&request.leader_email) {
        return Err(AppError::Validation(
            "the proposed leader may not comment on their own request".to_string(),
        ));
    }

    let comment_id =
        formation_request::add_comment(&pool, id, new.author_id, new.body.trim()).await?;
    Ok(HttpResponse::Created().json(json!({ "id": comment_id })))
}

/// GET /api/v1/formation-requests/{id}/decision — evaluate without mutating.
pub async fn decision(
    workflow: web::Data<FormationWorkflow>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let decision = workflow.evaluate(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(decision))
}

/// POST /api/v1/formation-requests/{id}/approve — manual approval.
pub async fn approve(
    workflow: web::Data<FormationWorkflow>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let result = workflow.approve(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[derive(Deserialize)]
pub struct RejectForm {
    pub reason: Option<String>,
}

/// POST /api/v1/formation-requests/{id}/reject — manual rejection.
pub async fn reject(
    workflow: web::Data<FormationWorkflow>,
    path: web::Path<i64>,
    payload: Option<web::Json<RejectForm>>,
) -> Result<HttpResponse, AppError> {
    let reason = payload.and_then(|p| p.into_inner().reason);
    workflow
        .reject(path.into_inner(), reason.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "rejected" })))
}

/// POST /api/v1/formation-requests/{id}/archive
pub async fn archive(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    formation_request::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !formation_request::archive(&pool, id).await? {
        return Err(AppError::Validation(
            "only submitted or rejected requests can be archived".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(json!({ "status": "archived" })))
}

/// POST /api/v1/formation-requests/sweep — run the batch evaluation now.
pub async fn sweep(workflow: web::Data<FormationWorkflow>) -> Result<HttpResponse, AppError> {
    let outcomes = workflow.sweep().await?;
    Ok(HttpResponse::Ok().json(outcomes))
}
