//! The review/publish engine.
//!
//! Review is invoked repeatedly as an admin iterates over a checklist, so
//! it is diff-gated end to end: re-submitting an unchanged review touches
//! no rows and appends nothing to the log.

use serde_json::json;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::AccessContext,
  changelog::{ChangeEntry, EventKind},
  check::CheckStatus,
  diff::diff_objects,
  session::{Session, SessionStatus},
  store::SessionStore,
};

use super::require_session_access;

/// Finalise (or re-finalise) a session: set its status and reclassify the
/// named checks. Everything commits as one store transaction.
pub async fn save_review<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
  status: SessionStatus,
  included_check_ids: Vec<Uuid>,
  excluded_check_ids: Vec<Uuid>,
) -> Result<Session> {
  let session = require_session_access(store, ctx, session_id).await?;

  // Once a session has left Draft it never returns there.
  if status == SessionStatus::Draft && session.status != SessionStatus::Draft {
    return Err(Error::BadRequest(
      "a reviewed session cannot return to draft".to_string(),
    ));
  }

  let candidate = Session { status, ..session.clone() };
  let session_changes =
    diff_objects(&session.field_map(), &candidate.field_map());

  let checks = store.list_checks(session_id).await.map_err(Error::store)?;

  let to_include: Vec<Uuid> = checks
    .iter()
    .filter(|c| {
      c.status != CheckStatus::Include
        && included_check_ids.contains(&c.check_id)
    })
    .map(|c| c.check_id)
    .collect();

  let to_exclude: Vec<Uuid> = checks
    .iter()
    .filter(|c| {
      c.status != CheckStatus::Exclude
        && excluded_check_ids.contains(&c.check_id)
    })
    .map(|c| c.check_id)
    .collect();

  if session_changes.is_empty() && to_include.is_empty() && to_exclude.is_empty()
  {
    return Ok(session);
  }

  // Reclassification is logged at the session level, not per check.
  let status_change = if session_changes.is_empty() {
    None
  } else {
    let entry =
      ChangeEntry::session(session_id, ctx.user_id, EventKind::Update)
        .with_metadata(json!({ "session_id": session_id }))
        .with_changes(session_changes);
    Some((status, entry))
  };

  store
    .apply_review(session_id, status_change, to_include, to_exclude)
    .await
    .map_err(Error::store)?;

  Ok(candidate)
}

/// Session-scoped read of the audit trail.
pub async fn list_changes<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
) -> Result<Vec<ChangeEntry>> {
  require_session_access(store, ctx, session_id).await?;
  store.session_changes(session_id).await.map_err(Error::store)
}
