//! JSON REST API for Muster.
//!
//! Exposes an axum [`Router`] backed by any
//! [`muster_core::store::SessionStore`]. Requests authenticate with HTTP
//! Basic auth against an [`AuthRegistry`]; the resolved
//! [`AccessContext`](muster_core::access::AccessContext) is what the
//! workflow layer authorizes against. TLS and listener concerns are the
//! caller's responsibility.

pub mod auth;
pub mod catalog;
pub mod checks;
pub mod error;
pub mod people;
pub mod roster;
pub mod sessions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use muster_core::store::SessionStore;

pub use auth::{AuthRegistry, AuthUser};
pub use error::ApiError;

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SessionStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthRegistry>,
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Sessions
    .route(
      "/sessions",
      get(sessions::list::<S>).post(sessions::create::<S>),
    )
    .route(
      "/sessions/{id}",
      get(sessions::get_one::<S>)
        .put(sessions::update::<S>)
        .delete(sessions::delete::<S>),
    )
    .route("/sessions/{id}/review", post(sessions::save_review::<S>))
    .route("/sessions/{id}/changes", get(sessions::changes::<S>))
    // Roster
    .route(
      "/sessions/{id}/assessors",
      post(roster::add_assessor::<S>)
        .delete(roster::remove_assessor::<S>)
        .put(roster::sync_assessors::<S>),
    )
    .route(
      "/sessions/{id}/assessees",
      post(roster::add_assessee::<S>)
        .delete(roster::remove_assessee::<S>)
        .put(roster::sync_assessees::<S>),
    )
    .route(
      "/sessions/{id}/skills",
      post(roster::add_skill::<S>)
        .delete(roster::remove_skill::<S>)
        .put(roster::sync_skills::<S>),
    )
    // Checks
    .route(
      "/sessions/{id}/checks",
      get(checks::list::<S>)
        .post(checks::create::<S>)
        .put(checks::save_batch::<S>),
    )
    .route(
      "/sessions/{id}/checks/{cid}",
      put(checks::update_one::<S>).delete(checks::delete_one::<S>),
    )
    .route("/checks", post(checks::create_independent::<S>))
    // People
    .route("/people", get(people::list::<S>).post(people::create::<S>))
    .route(
      "/people/{id}",
      get(people::get_one::<S>).put(people::update::<S>),
    )
    // Catalogue
    .route(
      "/skills",
      get(catalog::list_skills::<S>).post(catalog::create_skill::<S>),
    )
    .route(
      "/packages",
      get(catalog::list_packages::<S>).post(catalog::create_package::<S>),
    )
    .route("/packages/{id}/changes", get(catalog::package_changes::<S>))
    .route("/groups", post(catalog::create_group::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
