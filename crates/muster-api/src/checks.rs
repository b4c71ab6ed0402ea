//! Handlers for check recording.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/sessions/:id/checks` | session tier |
//! | `POST`   | `/sessions/:id/checks` | one check |
//! | `PUT`    | `/sessions/:id/checks` | batch upsert |
//! | `PUT`    | `/sessions/:id/checks/:cid` | one check |
//! | `DELETE` | `/sessions/:id/checks/:cid` | |
//! | `POST`   | `/checks` | independent (session-less) check |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use muster_core::{
  check::{
    CheckFields, CompetenceLevel, NewCheck, NewIndependentCheck, SaveCheck,
    SkillCheck,
  },
  store::SessionStore,
  workflow::check,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Auth, error::ApiError};

// ─── Session checks ───────────────────────────────────────────────────────────

/// `GET /sessions/:id/checks`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<SkillCheck>>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let checks = check::list_checks(state.store.as_ref(), &ctx, id).await?;
  Ok(Json(checks))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub skill_id:    Uuid,
  pub assessee_id: Uuid,
  pub result:      CompetenceLevel,
  pub notes:       Option<String>,
}

/// `POST /sessions/:id/checks`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let created = check::create_check(state.store.as_ref(), &ctx, id, NewCheck {
    skill_id:    body.skill_id,
    assessee_id: body.assessee_id,
    result:      body.result,
    notes:       body.notes,
  })
  .await?;
  Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct SaveItem {
  pub check_id:    Option<Uuid>,
  pub skill_id:    Uuid,
  pub assessee_id: Uuid,
  pub result:      CompetenceLevel,
  pub notes:       Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveBody {
  pub checks: Vec<SaveItem>,
}

/// `PUT /sessions/:id/checks` — batch upsert for live-session entry.
pub async fn save_batch<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
  Json(body): Json<SaveBody>,
) -> Result<Json<Vec<SkillCheck>>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let inputs = body
    .checks
    .into_iter()
    .map(|item| SaveCheck {
      check_id:    item.check_id,
      skill_id:    item.skill_id,
      assessee_id: item.assessee_id,
      result:      item.result,
      notes:       item.notes,
    })
    .collect();

  let saved = check::save_checks(state.store.as_ref(), &ctx, id, inputs).await?;
  Ok(Json(saved))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub result: CompetenceLevel,
  pub notes:  Option<String>,
}

/// `PUT /sessions/:id/checks/:cid`
pub async fn update_one<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path((id, check_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<SkillCheck>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let updated =
    check::update_check(state.store.as_ref(), &ctx, id, check_id, CheckFields {
      result: body.result,
      notes:  body.notes,
    })
    .await?;
  Ok(Json(updated))
}

/// `DELETE /sessions/:id/checks/:cid`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path((id, check_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  check::delete_check(state.store.as_ref(), &ctx, id, check_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Independent checks ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IndependentBody {
  pub skill_id:    Uuid,
  pub assessee_id: Uuid,
  pub result:      CompetenceLevel,
  pub notes:       Option<String>,
  pub date:        NaiveDate,
}

/// `POST /checks` — record a check outside any session.
pub async fn create_independent<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Json(body): Json<IndependentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let created = check::create_independent_check(
    state.store.as_ref(),
    &ctx,
    NewIndependentCheck {
      skill_id:    body.skill_id,
      assessee_id: body.assessee_id,
      result:      body.result,
      notes:       body.notes,
      date:        body.date,
    },
  )
  .await?;
  Ok((StatusCode::CREATED, Json(created)))
}
