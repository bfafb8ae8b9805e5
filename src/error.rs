use std::io::Cursor;

use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::{Request, Response};
use serde::Serialize;

use crate::auth::AuthError;
use crate::store::StoreError;

/// JSON error responder for the user management routes.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => {
                log::debug!("not found: {}", msg);
                (Status::NotFound, "NotFound", msg)
            }
            ApiError::BadRequest(msg) => {
                log::debug!("bad request: {}", msg);
                (Status::BadRequest, "BadRequest", msg)
            }
            ApiError::Conflict(msg) => {
                log::debug!("conflict: {}", msg);
                (Status::Conflict, "Conflict", msg)
            }
            ApiError::Unauthorized(msg) => {
                log::debug!("unauthorized: {}", msg);
                (Status::Unauthorized, "Unauthorized", msg)
            }
            ApiError::Forbidden(msg) => {
                log::debug!("forbidden: {}", msg);
                (Status::Forbidden, "Forbidden", msg)
            }
            ApiError::InternalError(msg) => {
                log::error!("internal error: {}", msg);
                (Status::InternalServerError, "InternalError", msg)
            }
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        let json = serde_json::to_string(&error_response).unwrap_or_else(|_| {
            r#"{"error":"SerializationError","message":"Failed to serialize error"}"#.to_string()
        });

        Response::build()
            .status(status)
            .header(rocket::http::ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Identity not found".to_string()),
            StoreError::Duplicate => {
                ApiError::Conflict("Email or username already in use".to_string())
            }
            StoreError::Database(err) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err.status() {
            s if s == Status::NotFound => ApiError::NotFound(err.to_string()),
            s if s == Status::BadRequest => ApiError::BadRequest(err.to_string()),
            s if s == Status::Conflict => ApiError::Conflict(err.to_string()),
            s if s == Status::Unauthorized => ApiError::Unauthorized(err.to_string()),
            s if s == Status::Forbidden => ApiError::Forbidden(err.to_string()),
            _ => ApiError::InternalError(err.to_string()),
        }
    }
}
