use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

use crate::workflow::WorkflowError;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    /// A stored value that should be a known enum wasn't.
    Data(String),
    Hash(String),
    Validation(String),
    Workflow(WorkflowError),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Data(e) => write!(f, "Data error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Validation(e) => write!(f, "Validation error: {e}"),
            AppError::Workflow(e) => write!(f, "Workflow error: {e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => {
                HttpResponse::NotFound().json(json!({ "error": "not found" }))
            }
            AppError::Validation(msg) => {
                HttpResponse::UnprocessableEntity().json(json!({ "error": msg }))
            }
            AppError::Workflow(e) => match e {
                WorkflowError::NotFound => {
                    HttpResponse::NotFound().json(json!({ "error": "not found" }))
                }
                WorkflowError::NotEligible(_)
                | WorkflowError::AlreadyProvisioned
                | WorkflowError::InvalidTransition { .. } => {
                    HttpResponse::Conflict().json(json!({ "error": e.to_string() }))
                }
                WorkflowError::Persistence(_) => {
                    log::error!("{self}");
                    HttpResponse::InternalServerError()
                        .json(json!({ "error": "internal server error" }))
                }
            },
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "internal server error" }))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<WorkflowError> for AppError {
    fn from(e: WorkflowError) -> Self {
        AppError::Workflow(e)
    }
}
