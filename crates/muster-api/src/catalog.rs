//! Handlers for the skill catalogue: `/skills`, `/packages`, `/groups`.
//!
//! Reads are member-tier; writes are admin-tier (enforced in the workflow
//! layer).

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use muster_core::{
  catalog::{Skill, SkillGroup, SkillPackage},
  changelog::ChangeEntry,
  store::SessionStore,
  workflow::catalog,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Auth, error::ApiError};

// ─── Skills ───────────────────────────────────────────────────────────────────

/// `GET /skills`
pub async fn list_skills<S>(
  State(state): State<AppState<S>>,
  Auth(_ctx): Auth,
) -> Result<Json<Vec<Skill>>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let skills = catalog::list_skills(state.store.as_ref()).await?;
  Ok(Json(skills))
}

#[derive(Debug, Deserialize)]
pub struct SkillBody {
  pub group_id: Option<Uuid>,
  pub name:     String,
  #[serde(default)]
  pub seq:      i64,
}

/// `POST /skills`
pub async fn create_skill<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Json(body): Json<SkillBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let created =
    catalog::create_skill(state.store.as_ref(), &ctx, catalog::NewSkill {
      group_id: body.group_id,
      name:     body.name,
      seq:      body.seq,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Packages ─────────────────────────────────────────────────────────────────

/// `GET /packages`
pub async fn list_packages<S>(
  State(state): State<AppState<S>>,
  Auth(_ctx): Auth,
) -> Result<Json<Vec<SkillPackage>>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let packages = catalog::list_packages(state.store.as_ref()).await?;
  Ok(Json(packages))
}

#[derive(Debug, Deserialize)]
pub struct PackageBody {
  pub name: String,
  #[serde(default)]
  pub seq:  i64,
}

/// `POST /packages`
pub async fn create_package<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Json(body): Json<PackageBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let created =
    catalog::create_package(state.store.as_ref(), &ctx, catalog::NewPackage {
      name: body.name,
      seq:  body.seq,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /packages/:id/changes` — admin read of a package's audit trail.
pub async fn package_changes<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChangeEntry>>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entries =
    catalog::list_package_changes(state.store.as_ref(), &ctx, id).await?;
  Ok(Json(entries))
}

// ─── Groups ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GroupBody {
  pub package_id: Uuid,
  pub name:       String,
  #[serde(default)]
  pub seq:        i64,
}

/// `POST /groups`
pub async fn create_group<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Json(body): Json<GroupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let created =
    catalog::create_group(state.store.as_ref(), &ctx, catalog::NewGroup {
      package_id: body.package_id,
      name:       body.name,
      seq:        body.seq,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(created)))
}
