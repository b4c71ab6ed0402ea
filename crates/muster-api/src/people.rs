//! Handlers for `/people` endpoints.
//!
//! | Method | Path | Tier |
//! |--------|------|------|
//! | `GET`  | `/people` | member |
//! | `POST` | `/people` | admin |
//! | `GET`  | `/people/:id` | member (scope-hidden) |
//! | `PUT`  | `/people/:id` | admin |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use muster_core::{
  person::{NewPerson, Person, PersonFields, PersonStatus},
  store::SessionStore,
  workflow::person,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Auth, error::ApiError};

/// `GET /people`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let people = person::list_people(state.store.as_ref(), &ctx).await?;
  Ok(Json(people))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:    String,
  pub email:   String,
  pub user_id: Option<Uuid>,
}

/// `POST /people`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let created = person::create_person(state.store.as_ref(), &ctx, NewPerson {
    name:    body.name,
    email:   body.email,
    user_id: body.user_id,
  })
  .await?;
  Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /people/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let found = person::get_person(state.store.as_ref(), &ctx, id).await?;
  Ok(Json(found))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub name:    String,
  pub email:   String,
  pub status:  PersonStatus,
  pub user_id: Option<Uuid>,
}

/// `PUT /people/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Auth(ctx): Auth,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Person>, ApiError>
where
  S: SessionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let updated =
    person::update_person(state.store.as_ref(), &ctx, id, PersonFields {
      name:    body.name,
      email:   body.email,
      status:  body.status,
      user_id: body.user_id,
    })
    .await?;
  Ok(Json(updated))
}
