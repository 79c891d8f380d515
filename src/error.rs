use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use derive_more::Display;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::leave::status::LeaveStatus;

/// A single field-level validation message, rendered next to the form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    #[schema(example = "end_date")]
    pub field: String,
    #[schema(example = "This field is required")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::new(field, "This field is required")
    }
}

/// Body returned for every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "validation failed")]
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "start_date {} cannot be after end_date {}", start, end)]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[display(fmt = "validation failed")]
    Validation { errors: Vec<FieldError> },

    #[display(fmt = "protocol number {} is already assigned", protocol_number)]
    DuplicateProtocol { protocol_number: String },

    #[display(fmt = "cannot move leave application from {} to {}", from, to)]
    IllegalTransition { from: LeaveStatus, to: LeaveStatus },

    #[display(fmt = "{}", message)]
    Conflict { message: String },

    #[display(fmt = "{} is still referenced and cannot be deleted", entity)]
    Protected { entity: &'static str },

    #[display(fmt = "{}", reason)]
    Forbidden { reason: &'static str },

    #[display(fmt = "{} not found", entity)]
    NotFound { entity: &'static str },

    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl AppError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Maps a write failure onto the uniqueness / foreign key errors the
    /// schema raises, leaving everything else as a database error.
    pub fn from_write(e: sqlx::Error, conflict: &str, entity: &'static str) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::Conflict {
                    message: conflict.to_string(),
                };
            }
            if db_err.is_foreign_key_violation() {
                return AppError::field(entity, format!("unknown {entity} reference"));
            }
        }
        AppError::Database(e)
    }

    /// Maps a delete failure: a restricting foreign key means the row is protected.
    pub fn from_delete(e: sqlx::Error, entity: &'static str) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_foreign_key_violation() {
                return AppError::Protected { entity };
            }
        }
        AppError::Database(e)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRange { .. } | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::DuplicateProtocol { .. }
            | AppError::IllegalTransition { .. }
            | AppError::Conflict { .. }
            | AppError::Protected { .. } => StatusCode::CONFLICT,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation { errors } => ErrorResponse {
                message: self.to_string(),
                errors: errors.clone(),
            },
            AppError::InvalidRange { .. } => ErrorResponse {
                message: self.to_string(),
                errors: vec![FieldError::new("end_date", "End date must not precede start date")],
            },
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                ErrorResponse {
                    message: "Something went wrong, Contact with system admin".to_string(),
                    errors: Vec::new(),
                }
            }
            _ => ErrorResponse {
                message: self.to_string(),
                errors: Vec::new(),
            },
        };

        HttpResponse::build(self.status_code()).json(json!(body))
    }
}
