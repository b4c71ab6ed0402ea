//! Handlers for the three roster collections of a session.
//!
//! Each collection gets the same verb set:
//!
//! | Method   | Path | Body |
//! |----------|------|------|
//! | `POST`   | `/sessions/:id/assessors` (& assessees, skills) | `{person_id}` / `{skill_id}` |
//! | `DELETE` | same | same |
//! | `PUT`    | same | `{additions: [...], removals: [...]}` — bulk sync |

use axum::{
  Json,
  extract::{Path, State},
};
use muster_core::{
  access::AccessContext,
  session::{RosterRole, SessionDetail, SyncOutcome},
  store::SessionStore,
  workflow::roster,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Auth, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct PersonBody {
  pub person_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SkillBody {
  pub skill_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SyncBody {
  #[serde(default)]
  pub additions: Vec<Uuid>,
  #[serde(default)]
  pub removals:  Vec<Uuid>,
}

async fn add<S>(
  state: &AppState<S>,
  ctx: &AccessContext,
  session_id: Uuid,
  role: RosterRole,
  target_id: Uuid,
) -> Result<Json<SessionDetail>, ApiError>
where
  S: SessionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let detail =
    roster::add_member(state.store.as_ref(), ctx, session_id, role, target_id)
      .await?;
  Ok(Json(detail))
}

async fn remove<S>(
  state: &AppState<S>,
  ctx: &AccessContext,
  session_id: Uuid,
  role: RosterRole,
  target_id: Uuid,
) -> Result<Json<SessionDetail>, ApiError>
where
  S: SessionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let detail = roster::remove_member(
    state.store.as_ref(),
    ctx,
    session_id,
    role,
    target_id,
  )
  .await?;
  Ok(Json(detail))
}

async fn sync<S>(
  state: &AppState<S>,
  ctx: &AccessContext,
  session_id: Uuid,
  role: RosterRole,
  body: SyncBody,
) -> Result<Json<SyncOutcome>, ApiError>
where
  S: SessionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let outcome = roster::sync_members(
    state.store.as_ref(),
    ctx,
    session_id,
    role,
    body.additions,
    body.removals,
  )
  .await?;
  Ok(Json(outcome))
}

macro_rules! person_routes {
  ($add:ident, $remove:ident, $sync:ident, $role:expr) => {
    pub async fn $add<S>(
      State(state): State<AppState<S>>,
      Auth(ctx): Auth,
      Path(id): Path<Uuid>,
      Json(body): Json<PersonBody>,
    ) -> Result<Json<SessionDetail>, ApiError>
    where
      S: SessionStore + Clone + Send + Sync + 'static,
      S::Error: std::error::Error + Send + Sync + 'static,
    {
      add(&state, &ctx, id, $role, body.person_id).await
    }

    pub async fn $remove<S>(
      State(state): State<AppState<S>>,
      Auth(ctx): Auth,
      Path(id): Path<Uuid>,
      Json(body): Json<PersonBody>,
    ) -> Result<Json<SessionDetail>, ApiError>
    where
      S: SessionStore + Clone + Send + Sync + 'static,
      S::Error: std::error::Error + Send + Sync + 'static,
    {
      remove(&state, &ctx, id, $role, body.person_id).await
    }

    pub async fn $sync<S>(
      State(state): State<AppState<S>>,
      Auth(ctx): Auth,
      Path(id): Path<Uuid>,
      Json(body): Json<SyncBody>,
    ) -> Result<Json<SyncOutcome>, ApiError>
    where
      S: SessionStore + Clone + Send + Sync + 'static,
      S::Error: std::error::Error + Send + Sync + 'static,
    {
      sync(&state, &ctx, id, $role, body).await
    }
  };
}

person_routes!(
  add_assessor,
  remove_assessor,
  sync_assessors,
  RosterRole::Assessor
);
person_routes!(
  add_assessee,
  remove_assessee,
  sync_assessees,
  RosterRole::Assessee
);

/// `POST /sessions/:id/skills`
pub async fn add_skill<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
  Json(body): Json<SkillBody>,
) -> Result<Json<SessionDetail>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  add(&state, &ctx, id, RosterRole::Skill, body.skill_id).await
}

/// `DELETE /sessions/:id/skills`
pub async fn remove_skill<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
  Json(body): Json<SkillBody>,
) -> Result<Json<SessionDetail>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  remove(&state, &ctx, id, RosterRole::Skill, body.skill_id).await
}

/// `PUT /sessions/:id/skills`
pub async fn sync_skills<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
  Json(body): Json<SyncBody>,
) -> Result<Json<SyncOutcome>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  sync(&state, &ctx, id, RosterRole::Skill, body).await
}
