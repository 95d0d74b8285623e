use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    response::{ActionOutcome, ApiResponse, Meta},
    validation::FieldErrors,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    /// User-correctable form errors, keyed by field name.
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Form action that could not run, reported as `{success: false, message}`.
    #[error("Action failed: {0}")]
    Action(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Authorization sends the client elsewhere instead of failing.
    #[error("Redirect to {0}")]
    Redirect(String),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(FieldErrors::single(field, message))
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Redirect(target) => return Redirect::to(target).into_response(),
            AppError::Validation(errors) => {
                let body = ApiResponse::success(
                    "Bad Request",
                    ActionOutcome::rejected(errors.clone()),
                    Some(Meta::empty()),
                );
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }
            AppError::Action(message) => {
                let body = ApiResponse::success(
                    "Bad Request",
                    ActionOutcome::failed(message.clone()),
                    Some(Meta::empty()),
                );
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::OrmError(err) => {
                tracing::error!(error = %err, "database error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
