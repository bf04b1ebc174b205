//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rollcall_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The request carried no usable principal headers.
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  /// The request body, query string or path could not be parsed.
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let core = match self {
      ApiError::Unauthorized(m) => {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": m }))).into_response();
      }
      ApiError::BadRequest(m) => {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response();
      }
      ApiError::Core(e) => e,
    };

    let (status, message) = match &core {
      CoreError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
      CoreError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      CoreError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      CoreError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      CoreError::BatchRejected { failures } => {
        let body = json!({ "error": core.to_string(), "errors": failures });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
      }
      CoreError::Storage(e) => {
        tracing::error!(error = %e, "storage failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}
