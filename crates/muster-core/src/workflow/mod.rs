//! The session workflow: lifecycle, roster, check recording, and review.
//!
//! Every function takes the store and an explicit [`AccessContext`]; no
//! ambient request state exists. Authorization, scope hiding, diff
//! computation, and derived fields live here; persistence and transaction
//! boundaries live behind [`SessionStore`].

pub mod catalog;
pub mod check;
pub mod person;
pub mod review;
pub mod roster;
pub mod session;

use uuid::Uuid;

use crate::{
  Error, Result,
  access::AccessContext,
  session::Session,
  store::SessionStore,
};

/// Load a session visible to the caller's organization.
///
/// A session that does not exist and a session owned by another
/// organization are indistinguishable to the caller: both are `NotFound`.
pub(crate) async fn session_in_scope<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
) -> Result<Session> {
  let session = store
    .get_session(session_id)
    .await
    .map_err(Error::store)?
    .filter(|s| s.org_id == ctx.org.org_id);

  session.ok_or_else(|| Error::NotFound(format!("session {session_id}")))
}

/// Session-scoped tier: org admin, or an assessor on this session.
pub(crate) async fn require_session_access<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
) -> Result<Session> {
  let session = session_in_scope(store, ctx, session_id).await?;

  if ctx.is_admin() {
    return Ok(session);
  }

  let roster = store.roster(session_id).await.map_err(Error::store)?;
  let is_assessor = ctx
    .person_id
    .is_some_and(|person| roster.assessors.contains(&person));

  if is_assessor {
    Ok(session)
  } else {
    Err(Error::Forbidden(
      "caller is not an assessor on this session".to_string(),
    ))
  }
}
