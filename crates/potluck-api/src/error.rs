//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// No credentials, or credentials that do not verify.
  #[error("authentication required")]
  Unauthenticated,

  /// Authenticated, but neither the owner nor an administrator.
  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<potluck_core::Error> for ApiError {
  fn from(e: potluck_core::Error) -> Self {
    use potluck_core::Error as E;
    match e {
      E::InvalidArgument(m) => Self::InvalidArgument(m),
      E::Conflict(m) => Self::Conflict(m),
      denied @ E::Unauthorized { .. } => Self::Forbidden(denied.to_string()),
      E::Store(inner) => Self::Store(inner),
      other if other.is_not_found() => Self::NotFound(other.to_string()),
      other => Self::Internal(other.to_string()),
    }
  }
}

/// Malformed bodies, missing fields, and wrongly typed fields are all
/// invalid arguments.
impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::InvalidArgument(rejection.body_text()) }
}

/// Ids in the path that do not parse as integers.
impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::InvalidArgument(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::InvalidArgument(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::Forbidden(m) => {
        tracing::warn!(reason = %m, "request forbidden");
        (StatusCode::FORBIDDEN, m.clone())
      }
      ApiError::Internal(_) | ApiError::Store(_) => {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"potluck\""),
      );
    }
    res
  }
}
