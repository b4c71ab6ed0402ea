//! Session lifecycle: create, update, delete, and reads.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::AccessContext,
  changelog::{ChangeEntry, EventKind},
  diff::diff_objects,
  session::{
    NewSession, Session, SessionDetail, SessionFields, SessionStatus,
  },
  store::SessionStore,
};

use super::session_in_scope;

/// Create a session in `Draft`, with a `Create` change entry diffing the
/// new row against the empty-default baseline.
pub async fn create_session<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  input: NewSession,
) -> Result<Session> {
  ctx.require_admin()?;

  if input.name.trim().is_empty() {
    return Err(Error::BadRequest("session name must not be blank".into()));
  }

  let session_id = input.session_id.unwrap_or_else(Uuid::new_v4);

  let session = Session {
    session_id,
    org_id: ctx.org.org_id,
    name: input.name,
    notes: input.notes,
    date: input.date,
    status: SessionStatus::Draft,
    created_at: Utc::now(),
  };

  let changes = diff_objects(&Session::empty_baseline(), &session.field_map());
  let entry = ChangeEntry::session(session_id, ctx.user_id, EventKind::Create)
    .with_metadata(json!({ "session_id": session_id }))
    .with_changes(changes);

  // The store reports an id collision rather than failing on the
  // primary key, so a racing duplicate create still maps to Conflict.
  let inserted = store
    .insert_session(session.clone(), entry)
    .await
    .map_err(Error::store)?;
  if !inserted {
    return Err(Error::Conflict(format!("session {session_id} already exists")));
  }

  Ok(session)
}

/// Diff-gated update: if the proposed fields equal the stored ones, the
/// stored session is returned with zero writes.
pub async fn update_session<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
  fields: SessionFields,
) -> Result<Session> {
  ctx.require_admin()?;
  let current = session_in_scope(store, ctx, session_id).await?;

  let candidate = Session {
    name: fields.name,
    notes: fields.notes,
    date: fields.date,
    ..current.clone()
  };

  let changes = diff_objects(&current.field_map(), &candidate.field_map());
  if changes.is_empty() {
    return Ok(current);
  }

  if candidate.name.trim().is_empty() {
    return Err(Error::BadRequest("session name must not be blank".into()));
  }

  let entry = ChangeEntry::session(session_id, ctx.user_id, EventKind::Update)
    .with_metadata(json!({ "session_id": session_id }))
    .with_changes(changes);

  store
    .update_session(candidate.clone(), entry)
    .await
    .map_err(Error::store)?;

  Ok(candidate)
}

/// Delete a session and return its prior state. The `Delete` entry is
/// written in the same transaction and outlives the row.
pub async fn delete_session<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
) -> Result<Session> {
  ctx.require_admin()?;
  let prior = session_in_scope(store, ctx, session_id).await?;

  let entry = ChangeEntry::session(session_id, ctx.user_id, EventKind::Delete)
    .with_metadata(json!({ "session_id": session_id }));

  store
    .delete_session(session_id, entry)
    .await
    .map_err(Error::store)?;

  Ok(prior)
}

/// Session detail: the row plus its current roster.
pub async fn get_session<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
) -> Result<SessionDetail> {
  let session = session_in_scope(store, ctx, session_id).await?;
  let roster = store.roster(session_id).await.map_err(Error::store)?;
  Ok(SessionDetail { session, roster })
}

/// Sessions of the caller's organization, optionally filtered by status
/// membership, ordered by date descending.
pub async fn list_sessions<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  statuses: Vec<SessionStatus>,
) -> Result<Vec<Session>> {
  store
    .list_sessions(ctx.org.org_id, statuses)
    .await
    .map_err(Error::store)
}
