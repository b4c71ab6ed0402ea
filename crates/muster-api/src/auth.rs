//! HTTP Basic-auth extractor.
//!
//! Credentials resolve to an [`AccessContext`] — the org, role, and person
//! linkage the workflow layer authorizes against. Nothing downstream ever
//! trusts identity fields from a request payload.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use muster_core::{
  access::{AccessContext, OrgContext, OrgRole},
  store::SessionStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// One account accepted by this server instance.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub user_id:       Uuid,
  /// The person record this account maps to, if any.
  pub person_id:     Option<Uuid>,
  pub org_id:        Uuid,
  pub role:          OrgRole,
}

/// The set of accounts accepted as valid for this server instance.
#[derive(Clone, Default)]
pub struct AuthRegistry {
  users: Vec<AuthUser>,
}

impl AuthRegistry {
  pub fn new(users: Vec<AuthUser>) -> Self { Self { users } }

  /// Verify a Basic authorization header against the registry and resolve
  /// the caller's context. All failure modes collapse to `Unauthorized`.
  pub fn verify(&self, headers: &HeaderMap) -> Result<AccessContext, ApiError> {
    let header_val = headers
      .get(axum::http::header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthorized)?;

    let encoded = header_val
      .strip_prefix("Basic ")
      .ok_or(ApiError::Unauthorized)?;

    let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
    let creds =
      std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

    let (username, password) =
      creds.split_once(':').ok_or(ApiError::Unauthorized)?;

    let user = self
      .users
      .iter()
      .find(|u| u.username == username)
      .ok_or(ApiError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
      .map_err(|_| ApiError::Unauthorized)?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed_hash)
      .map_err(|_| ApiError::Unauthorized)?;

    Ok(AccessContext {
      user_id:   user.user_id,
      person_id: user.person_id,
      org:       OrgContext { org_id: user.org_id, role: user.role },
    })
  }
}

/// Extractor: present in a handler means the request was authenticated;
/// the wrapped context says as whom.
pub struct Auth(pub AccessContext);

impl<S> FromRequestParts<AppState<S>> for Auth
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    state.auth.verify(&parts.headers).map(Auth)
  }
}

#[cfg(test)]
mod tests {
  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::http::header;
  use rand_core::OsRng;

  use super::*;

  fn registry(password: &str) -> AuthRegistry {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AuthRegistry::new(vec![AuthUser {
      username:      "user".to_string(),
      password_hash: hash,
      user_id:       Uuid::new_v4(),
      person_id:     None,
      org_id:        Uuid::new_v4(),
      role:          OrgRole::Admin,
    }])
  }

  fn headers_with(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, value.parse().unwrap());
    headers
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  #[test]
  fn correct_credentials_resolve_a_context() {
    let registry = registry("secret");
    let ctx =
      registry.verify(&headers_with(&basic("user", "secret"))).unwrap();
    assert_eq!(ctx.org.role, OrgRole::Admin);
  }

  #[test]
  fn wrong_password_is_unauthorized() {
    let registry = registry("secret");
    assert!(matches!(
      registry.verify(&headers_with(&basic("user", "wrong"))),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn unknown_user_is_unauthorized() {
    let registry = registry("secret");
    assert!(matches!(
      registry.verify(&headers_with(&basic("ghost", "secret"))),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn missing_header_is_unauthorized() {
    let registry = registry("secret");
    assert!(matches!(
      registry.verify(&HeaderMap::new()),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn invalid_base64_is_unauthorized() {
    let registry = registry("secret");
    assert!(matches!(
      registry.verify(&headers_with("Basic !!!not-base64!!!")),
      Err(ApiError::Unauthorized)
    ));
  }
}
