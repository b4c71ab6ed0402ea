//! Handlers for `/sessions` endpoints: lifecycle, review, change log.
//!
//! | Method   | Path | Tier |
//! |----------|------|------|
//! | `GET`    | `/sessions` | member; optional `?status=draft,include` |
//! | `POST`   | `/sessions` | admin |
//! | `GET`    | `/sessions/:id` | member (scope-hidden) |
//! | `PUT`    | `/sessions/:id` | admin |
//! | `DELETE` | `/sessions/:id` | admin |
//! | `POST`   | `/sessions/:id/review` | session |
//! | `GET`    | `/sessions/:id/changes` | session |

use std::str::FromStr;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use muster_core::{
  changelog::ChangeEntry,
  session::{
    NewSession, Session, SessionDetail, SessionFields, SessionStatus,
  },
  store::SessionStore,
  workflow::{review, session},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Auth, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Comma-separated status filter, e.g. `draft,include`. Absent = all.
  pub status: Option<String>,
}

fn parse_statuses(
  param: Option<String>,
) -> Result<Vec<SessionStatus>, ApiError> {
  param
    .map(|s| {
      s.split(',')
        .map(|part| SessionStatus::from_str(part.trim()))
        .collect::<Result<Vec<_>, _>>()
    })
    .transpose()
    .map_err(ApiError::BadRequest)
    .map(Option::unwrap_or_default)
}

/// `GET /sessions[?status=<status>,...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Session>>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let statuses = parse_statuses(params.status)?;
  let sessions =
    session::list_sessions(state.store.as_ref(), &ctx, statuses).await?;
  Ok(Json(sessions))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub session_id: Option<Uuid>,
  pub name:       String,
  pub notes:      Option<String>,
  pub date:       NaiveDate,
}

/// `POST /sessions`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let created = session::create_session(state.store.as_ref(), &ctx, NewSession {
    session_id: body.session_id,
    name:       body.name,
    notes:      body.notes,
    date:       body.date,
  })
  .await?;
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /sessions/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
) -> Result<Json<SessionDetail>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let detail = session::get_session(state.store.as_ref(), &ctx, id).await?;
  Ok(Json(detail))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub name:  String,
  pub notes: Option<String>,
  pub date:  NaiveDate,
}

/// `PUT /sessions/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Session>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let updated =
    session::update_session(state.store.as_ref(), &ctx, id, SessionFields {
      name:  body.name,
      notes: body.notes,
      date:  body.date,
    })
    .await?;
  Ok(Json(updated))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /sessions/:id` — responds with the deleted session.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = session::delete_session(state.store.as_ref(), &ctx, id).await?;
  Ok(Json(deleted))
}

// ─── Review ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
  pub status:             SessionStatus,
  #[serde(default)]
  pub included_check_ids: Vec<Uuid>,
  #[serde(default)]
  pub excluded_check_ids: Vec<Uuid>,
}

/// `POST /sessions/:id/review`
pub async fn save_review<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
  Json(body): Json<ReviewBody>,
) -> Result<Json<Session>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let reviewed = review::save_review(
    state.store.as_ref(),
    &ctx,
    id,
    body.status,
    body.included_check_ids,
    body.excluded_check_ids,
  )
  .await?;
  Ok(Json(reviewed))
}

// ─── Change log ───────────────────────────────────────────────────────────────

/// `GET /sessions/:id/changes`
pub async fn changes<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChangeEntry>>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entries = review::list_changes(state.store.as_ref(), &ctx, id).await?;
  Ok(Json(entries))
}
