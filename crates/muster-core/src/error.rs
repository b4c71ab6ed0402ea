//! Error types for `muster-core`.
//!
//! The taxonomy is the workflow's contract with its callers: a row outside
//! the caller's organization is reported as [`Error::NotFound`], never as
//! `Forbidden`, so that existence is not leaked across tenants.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The referenced record does not exist, or exists outside the caller's
  /// organization scope.
  #[error("not found: {0}")]
  NotFound(String),

  /// The caller lacks the authorization tier required for this operation.
  #[error("forbidden: {0}")]
  Forbidden(String),

  /// A creation collided with an existing unique identifier.
  #[error("conflict: {0}")]
  Conflict(String),

  /// Structurally valid input describing a disallowed state.
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// A store failure surfaced unchanged; the enclosing transaction has
  /// already been aborted by the backend.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error. Used by workflow functions, which are generic
  /// over the store's error type.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
