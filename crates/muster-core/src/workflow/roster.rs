//! Roster management: single connect/disconnect and bulk diff-based sync.
//!
//! The bulk endpoints exist because callers work with "desired final
//! membership" sets rather than incremental deltas; filtering before
//! writing is what keeps the change log meaningful under that model —
//! requested-but-no-op ids generate no entry.

use std::collections::HashSet;

use serde_json::json;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::AccessContext,
  changelog::ChangeEntry,
  session::{RosterRole, SessionDetail, SyncOutcome},
  store::SessionStore,
};

use super::require_session_access;

/// Check that a roster target exists and is visible to the caller.
async fn require_target<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  role: RosterRole,
  target_id: Uuid,
) -> Result<()> {
  let found = match role {
    RosterRole::Assessor | RosterRole::Assessee => store
      .get_person(target_id)
      .await
      .map_err(Error::store)?
      .is_some_and(|p| p.org_id == ctx.org.org_id),
    RosterRole::Skill => {
      store.get_skill(target_id).await.map_err(Error::store)?.is_some()
    }
  };

  if found {
    Ok(())
  } else {
    Err(Error::NotFound(format!(
      "{} {target_id}",
      role.metadata_key().trim_end_matches("_id")
    )))
  }
}

fn member_entry(
  ctx: &AccessContext,
  session_id: Uuid,
  role: RosterRole,
  target_id: Uuid,
  removal: bool,
) -> ChangeEntry {
  let event = if removal { role.remove_event() } else { role.add_event() };
  ChangeEntry::session(session_id, ctx.user_id, event)
    .with_metadata(json!({ role.metadata_key(): target_id }))
}

/// Connect one member. Idempotent: an already-present target returns the
/// current state without a write or a log entry.
pub async fn add_member<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
  role: RosterRole,
  target_id: Uuid,
) -> Result<SessionDetail> {
  let session = require_session_access(store, ctx, session_id).await?;
  require_target(store, ctx, role, target_id).await?;

  let roster = store.roster(session_id).await.map_err(Error::store)?;
  if roster.members(role).contains(&target_id) {
    return Ok(SessionDetail { session, roster });
  }

  let entry = member_entry(ctx, session_id, role, target_id, false);
  store
    .add_member(session_id, role, target_id, entry)
    .await
    .map_err(Error::store)?;

  let roster = store.roster(session_id).await.map_err(Error::store)?;
  Ok(SessionDetail { session, roster })
}

/// Disconnect one member. Idempotent: an absent target is a no-op.
pub async fn remove_member<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
  role: RosterRole,
  target_id: Uuid,
) -> Result<SessionDetail> {
  let session = require_session_access(store, ctx, session_id).await?;

  let roster = store.roster(session_id).await.map_err(Error::store)?;
  if !roster.members(role).contains(&target_id) {
    return Ok(SessionDetail { session, roster });
  }

  let entry = member_entry(ctx, session_id, role, target_id, true);
  store
    .remove_member(session_id, role, target_id, entry)
    .await
    .map_err(Error::store)?;

  let roster = store.roster(session_id).await.map_err(Error::store)?;
  Ok(SessionDetail { session, roster })
}

/// Bulk synchronisation. Additions already present and removals not
/// present are filtered out before anything is written; the returned
/// counts and the change entries reflect only the net-effective delta.
pub async fn sync_members<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
  role: RosterRole,
  additions: Vec<Uuid>,
  removals: Vec<Uuid>,
) -> Result<SyncOutcome> {
  require_session_access(store, ctx, session_id).await?;

  let roster = store.roster(session_id).await.map_err(Error::store)?;
  let current: HashSet<Uuid> = roster.members(role).iter().copied().collect();

  let mut seen = HashSet::new();
  let effective_adds: Vec<Uuid> = additions
    .into_iter()
    .filter(|id| !current.contains(id) && seen.insert(*id))
    .collect();

  let mut seen = HashSet::new();
  let effective_removes: Vec<Uuid> = removals
    .into_iter()
    .filter(|id| current.contains(id) && seen.insert(*id))
    .collect();

  for id in &effective_adds {
    require_target(store, ctx, role, *id).await?;
  }

  let outcome = SyncOutcome {
    added:   effective_adds.len(),
    removed: effective_removes.len(),
  };

  if effective_adds.is_empty() && effective_removes.is_empty() {
    return Ok(outcome);
  }

  let entries: Vec<ChangeEntry> = effective_adds
    .iter()
    .map(|id| member_entry(ctx, session_id, role, *id, false))
    .chain(
      effective_removes
        .iter()
        .map(|id| member_entry(ctx, session_id, role, *id, true)),
    )
    .collect();

  store
    .sync_members(session_id, role, effective_adds, effective_removes, entries)
    .await
    .map_err(Error::store)?;

  Ok(outcome)
}
