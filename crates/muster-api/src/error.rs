//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error leaves the server as JSON `{"code": "...", "message": "..."}`
//! with a stable machine-readable code, so clients never have to parse
//! message text.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// The stable code string clients dispatch on.
  pub fn code(&self) -> &'static str {
    match self {
      ApiError::Unauthorized => "UNAUTHORIZED",
      ApiError::NotFound(_) => "NOT_FOUND",
      ApiError::Forbidden(_) => "FORBIDDEN",
      ApiError::Conflict(_) => "CONFLICT",
      ApiError::BadRequest(_) => "BAD_REQUEST",
      ApiError::Internal(_) => "INTERNAL",
    }
  }

  fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<muster_core::Error> for ApiError {
  fn from(e: muster_core::Error) -> Self {
    match e {
      muster_core::Error::NotFound(m) => ApiError::NotFound(m),
      muster_core::Error::Forbidden(m) => ApiError::Forbidden(m),
      muster_core::Error::Conflict(m) => ApiError::Conflict(m),
      muster_core::Error::BadRequest(m) => ApiError::BadRequest(m),
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let body = json!({ "code": self.code(), "message": self.to_string() });
    let mut res = (self.status(), Json(body)).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"muster\""),
      );
    }
    res
  }
}
