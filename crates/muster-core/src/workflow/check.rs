//! Check recording: create, update, batch upsert, delete, and the
//! independent (session-less) path.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::AccessContext,
  changelog::{ChangeEntry, EventKind},
  check::{
    CheckFields, CheckStatus, NewCheck, NewIndependentCheck, SaveCheck,
    SkillCheck,
  },
  diff::diff_objects,
  session::Session,
  store::SessionStore,
};

use super::require_session_access;

async fn require_assessee<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  person_id: Uuid,
) -> Result<()> {
  let found = store
    .get_person(person_id)
    .await
    .map_err(Error::store)?
    .is_some_and(|p| p.org_id == ctx.org.org_id);
  if found {
    Ok(())
  } else {
    Err(Error::NotFound(format!("person {person_id}")))
  }
}

async fn require_skill<S: SessionStore>(
  store: &S,
  skill_id: Uuid,
) -> Result<()> {
  if store.get_skill(skill_id).await.map_err(Error::store)?.is_some() {
    Ok(())
  } else {
    Err(Error::NotFound(format!("skill {skill_id}")))
  }
}

fn check_metadata(check: &SkillCheck) -> serde_json::Value {
  json!({
    "check_id":    check.check_id,
    "skill_id":    check.skill_id,
    "assessee_id": check.assessee_id,
    "assessor_id": check.assessor_id,
  })
}

/// Load a check scoped to a session. A check in another session (or none)
/// is reported as not found.
async fn check_in_session<S: SessionStore>(
  store: &S,
  session_id: Uuid,
  check_id: Uuid,
) -> Result<SkillCheck> {
  store
    .get_check(check_id)
    .await
    .map_err(Error::store)?
    .filter(|c| c.session_id == Some(session_id))
    .ok_or_else(|| Error::NotFound(format!("check {check_id}")))
}

fn build_check(
  session: &Session,
  assessor_id: Uuid,
  check_id: Uuid,
  input: &SaveCheck,
) -> SkillCheck {
  SkillCheck {
    check_id,
    session_id: Some(session.session_id),
    skill_id: input.skill_id,
    assessee_id: input.assessee_id,
    assessor_id,
    result: input.result,
    passed: input.result.passed(),
    notes: input.notes.clone(),
    // The date comes from the session, not the caller.
    date: session.date,
    status: CheckStatus::Draft,
    recorded_at: Utc::now(),
  }
}

fn create_entry(ctx: &AccessContext, check: &SkillCheck) -> ChangeEntry {
  let changes =
    diff_objects(&SkillCheck::empty_baseline(), &check.field_map());
  // session_id is always Some on this path.
  ChangeEntry::session(
    check.session_id.unwrap_or_default(),
    ctx.user_id,
    EventKind::CreateCheck,
  )
  .with_metadata(check_metadata(check))
  .with_changes(changes)
}

/// Record one check inside a session. The caller becomes the assessor;
/// `passed` is derived; the row and its `CreateCheck` entry commit
/// together.
pub async fn create_check<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
  input: NewCheck,
) -> Result<SkillCheck> {
  let session = require_session_access(store, ctx, session_id).await?;
  let assessor_id = ctx.require_person()?;
  require_skill(store, input.skill_id).await?;
  require_assessee(store, ctx, input.assessee_id).await?;

  let check = build_check(
    &session,
    assessor_id,
    Uuid::new_v4(),
    &SaveCheck {
      check_id:    None,
      skill_id:    input.skill_id,
      assessee_id: input.assessee_id,
      result:      input.result,
      notes:       input.notes,
    },
  );

  let entry = create_entry(ctx, &check);
  store
    .insert_check(check.clone(), Some(entry))
    .await
    .map_err(Error::store)?;

  Ok(check)
}

/// Re-save an existing `Draft` check. Only result/notes change;
/// authorship and the timestamp are re-stamped to the editing caller.
/// Diff-gated: equal fields mean zero writes and no re-stamp. A check
/// that has been through review is frozen.
pub async fn update_check<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
  check_id: Uuid,
  fields: CheckFields,
) -> Result<SkillCheck> {
  require_session_access(store, ctx, session_id).await?;
  let current = check_in_session(store, session_id, check_id).await?;

  // A reviewed check is frozen; only another review pass can touch it.
  if current.status != CheckStatus::Draft {
    return Err(Error::BadRequest(
      "a reviewed check can only change through review".to_string(),
    ));
  }

  let candidate = SkillCheck {
    result: fields.result,
    passed: fields.result.passed(),
    notes: fields.notes,
    ..current.clone()
  };

  let changes = diff_objects(&current.field_map(), &candidate.field_map());
  if changes.is_empty() {
    return Ok(current);
  }

  let assessor_id = ctx.require_person()?;
  let candidate = SkillCheck {
    assessor_id,
    recorded_at: Utc::now(),
    ..candidate
  };

  let entry = ChangeEntry::session(session_id, ctx.user_id, EventKind::UpdateCheck)
    .with_metadata(check_metadata(&candidate))
    .with_changes(changes);

  store
    .update_check(candidate.clone(), Some(entry))
    .await
    .map_err(Error::store)?;

  Ok(candidate)
}

/// Batch upsert by `check_id` for live-session entry. Creates behave like
/// [`create_check`]; updates like [`update_check`], including the diff
/// gate. One change entry per effective write.
pub async fn save_checks<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
  inputs: Vec<SaveCheck>,
) -> Result<Vec<SkillCheck>> {
  let session = require_session_access(store, ctx, session_id).await?;
  let assessor_id = ctx.require_person()?;

  let mut saved = Vec::with_capacity(inputs.len());

  for input in inputs {
    let existing = match input.check_id {
      Some(id) => store
        .get_check(id)
        .await
        .map_err(Error::store)?
        .filter(|c| c.session_id == Some(session_id)),
      None => None,
    };

    match existing {
      Some(current) => {
        if current.status != CheckStatus::Draft {
          return Err(Error::BadRequest(
            "a reviewed check can only change through review".to_string(),
          ));
        }

        let candidate = SkillCheck {
          result: input.result,
          passed: input.result.passed(),
          notes: input.notes.clone(),
          ..current.clone()
        };

        let changes =
          diff_objects(&current.field_map(), &candidate.field_map());
        if changes.is_empty() {
          saved.push(current);
          continue;
        }

        let candidate = SkillCheck {
          assessor_id,
          recorded_at: Utc::now(),
          ..candidate
        };
        let entry = ChangeEntry::session(
          session_id,
          ctx.user_id,
          EventKind::UpdateCheck,
        )
        .with_metadata(check_metadata(&candidate))
        .with_changes(changes);

        store
          .update_check(candidate.clone(), Some(entry))
          .await
          .map_err(Error::store)?;
        saved.push(candidate);
      }
      None => {
        require_skill(store, input.skill_id).await?;
        require_assessee(store, ctx, input.assessee_id).await?;

        let check_id = input.check_id.unwrap_or_else(Uuid::new_v4);
        let check = build_check(&session, assessor_id, check_id, &input);
        let entry = create_entry(ctx, &check);

        store
          .insert_check(check.clone(), Some(entry))
          .await
          .map_err(Error::store)?;
        saved.push(check);
      }
    }
  }

  Ok(saved)
}

/// Delete a check. The row is loaded first so the `DeleteCheck` entry can
/// capture who was assessed by whom after the row is gone.
pub async fn delete_check<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
  check_id: Uuid,
) -> Result<()> {
  require_session_access(store, ctx, session_id).await?;
  let check = check_in_session(store, session_id, check_id).await?;

  let entry =
    ChangeEntry::session(session_id, ctx.user_id, EventKind::DeleteCheck)
      .with_metadata(check_metadata(&check));

  store.delete_check(check_id, entry).await.map_err(Error::store)
}

/// All checks of a session, session-scoped tier.
pub async fn list_checks<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  session_id: Uuid,
) -> Result<Vec<SkillCheck>> {
  require_session_access(store, ctx, session_id).await?;
  store.list_checks(session_id).await.map_err(Error::store)
}

/// Record a check with no session linkage. There is no review step
/// outside a session, so the check is `Include` from creation; there is
/// also no session scope for a change entry.
pub async fn create_independent_check<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  input: NewIndependentCheck,
) -> Result<SkillCheck> {
  let assessor_id = ctx.require_person()?;
  require_skill(store, input.skill_id).await?;
  require_assessee(store, ctx, input.assessee_id).await?;

  let check = SkillCheck {
    check_id: Uuid::new_v4(),
    session_id: None,
    skill_id: input.skill_id,
    assessee_id: input.assessee_id,
    assessor_id,
    result: input.result,
    passed: input.result.passed(),
    notes: input.notes,
    date: input.date,
    status: CheckStatus::Include,
    recorded_at: Utc::now(),
  };

  store
    .insert_check(check.clone(), None)
    .await
    .map_err(Error::store)?;

  Ok(check)
}
