//! Integration tests for `SqliteStore` and the workflow layer against an
//! in-memory database.

use chrono::NaiveDate;
use muster_core::{
  Error,
  access::{AccessContext, OrgContext, OrgRole},
  changelog::{ChangeEntry, EventKind},
  check::{
    CheckFields, CheckStatus, CompetenceLevel, NewCheck, NewIndependentCheck,
    SaveCheck,
  },
  person::NewPerson,
  session::{NewSession, RosterRole, SessionStatus},
  store::SessionStore,
  workflow::{catalog, check, person, review, roster, session},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn ctx(org_id: Uuid, role: OrgRole, person_id: Option<Uuid>) -> AccessContext {
  AccessContext {
    user_id: Uuid::new_v4(),
    person_id,
    org: OrgContext { org_id, role },
  }
}

fn date(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// One org with an admin (linked to a person), two further people, and a
/// skill.
struct Fixture {
  admin:    AccessContext,
  assessor: Uuid,
  assessee: Uuid,
  skill:    Uuid,
}

async fn fixture(s: &SqliteStore) -> Fixture {
  let org = Uuid::new_v4();
  let bootstrap = ctx(org, OrgRole::Admin, None);

  let admin_person = person::create_person(
    s,
    &bootstrap,
    NewPerson {
      name:    "Avery Admin".into(),
      email:   "avery@example.com".into(),
      user_id: Some(bootstrap.user_id),
    },
  )
  .await
  .unwrap();

  let assessor = person::create_person(
    s,
    &bootstrap,
    NewPerson {
      name:    "Robin Assessor".into(),
      email:   "robin@example.com".into(),
      user_id: None,
    },
  )
  .await
  .unwrap();

  let assessee = person::create_person(
    s,
    &bootstrap,
    NewPerson {
      name:    "Sam Assessee".into(),
      email:   "sam@example.com".into(),
      user_id: None,
    },
  )
  .await
  .unwrap();

  let skill = catalog::create_skill(
    s,
    &bootstrap,
    catalog::NewSkill {
      group_id: None,
      name:     "Knots".into(),
      seq:      1,
    },
  )
  .await
  .unwrap();

  Fixture {
    admin:    AccessContext {
      person_id: Some(admin_person.person_id),
      ..bootstrap
    },
    assessor: assessor.person_id,
    assessee: assessee.person_id,
    skill:    skill.skill_id,
  }
}

async fn draft_session(s: &SqliteStore, f: &Fixture) -> Uuid {
  session::create_session(
    s,
    &f.admin,
    NewSession {
      session_id: None,
      name:       "Morning Drill".into(),
      notes:      None,
      date:       date("2025-01-10"),
    },
  )
  .await
  .unwrap()
  .session_id
}

// ─── Session lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_session_starts_draft_and_is_listed() {
  let s = store().await;
  let f = fixture(&s).await;

  let created = session::create_session(
    &s,
    &f.admin,
    NewSession {
      session_id: None,
      name:       "Morning Drill".into(),
      notes:      None,
      date:       date("2025-01-10"),
    },
  )
  .await
  .unwrap();
  assert_eq!(created.status, SessionStatus::Draft);

  let drafts =
    session::list_sessions(&s, &f.admin, vec![SessionStatus::Draft])
      .await
      .unwrap();
  assert!(drafts.iter().any(|x| x.session_id == created.session_id));

  let reviewed =
    session::list_sessions(&s, &f.admin, vec![SessionStatus::Include])
      .await
      .unwrap();
  assert!(reviewed.is_empty());
}

#[tokio::test]
async fn create_session_logs_a_create_entry_with_baseline_diff() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let entries = s.session_changes(id).await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].event, EventKind::Create);
  // name and date differ from the empty baseline; status does not.
  let fields: Vec<&str> =
    entries[0].changes.iter().map(|c| c.field.as_str()).collect();
  assert!(fields.contains(&"name"));
  assert!(fields.contains(&"date"));
  assert!(!fields.contains(&"status"));
}

#[tokio::test]
async fn create_session_with_taken_id_conflicts() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let err = session::create_session(
    &s,
    &f.admin,
    NewSession {
      session_id: Some(id),
      name:       "Second".into(),
      notes:      None,
      date:       date("2025-02-01"),
    },
  )
  .await
  .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));

  // The losing create wrote nothing: the original row and its single
  // Create entry are all that exist.
  let kept = s.get_session(id).await.unwrap().unwrap();
  assert_eq!(kept.name, "Morning Drill");
  assert_eq!(s.session_changes(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_session_requires_admin() {
  let s = store().await;
  let f = fixture(&s).await;
  let member = ctx(f.admin.org.org_id, OrgRole::Member, None);

  let err = session::create_session(
    &s,
    &member,
    NewSession {
      session_id: None,
      name:       "Nope".into(),
      notes:      None,
      date:       date("2025-01-10"),
    },
  )
  .await
  .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn update_session_with_unchanged_fields_writes_nothing() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let unchanged = session::update_session(
    &s,
    &f.admin,
    id,
    muster_core::session::SessionFields {
      name:  "Morning Drill".into(),
      notes: None,
      date:  date("2025-01-10"),
    },
  )
  .await
  .unwrap();
  assert_eq!(unchanged.name, "Morning Drill");

  // Only the Create entry exists; the no-op update appended nothing.
  let entries = s.session_changes(id).await.unwrap();
  assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn update_session_writes_field_diff() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let updated = session::update_session(
    &s,
    &f.admin,
    id,
    muster_core::session::SessionFields {
      name:  "Evening Drill".into(),
      notes: None,
      date:  date("2025-01-10"),
    },
  )
  .await
  .unwrap();
  assert_eq!(updated.name, "Evening Drill");

  let entries = s.session_changes(id).await.unwrap();
  assert_eq!(entries.len(), 2);
  let update = &entries[1];
  assert_eq!(update.event, EventKind::Update);
  assert_eq!(update.changes.len(), 1);
  assert_eq!(update.changes[0].field, "name");
  assert_eq!(update.changes[0].before, serde_json::json!("Morning Drill"));
  assert_eq!(update.changes[0].after, serde_json::json!("Evening Drill"));
}

#[tokio::test]
async fn delete_session_returns_prior_state_and_log_survives() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let prior = session::delete_session(&s, &f.admin, id).await.unwrap();
  assert_eq!(prior.name, "Morning Drill");

  assert!(s.get_session(id).await.unwrap().is_none());

  // The ledger outlives the row.
  let entries = s.session_changes(id).await.unwrap();
  assert_eq!(entries.len(), 2);
  assert_eq!(entries[1].event, EventKind::Delete);
}

#[tokio::test]
async fn sessions_outside_the_org_are_not_found() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let outsider = ctx(Uuid::new_v4(), OrgRole::Admin, None);
  let err = session::get_session(&s, &outsider, id).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)), "expected NotFound, got {err:?}");
}

// ─── Roster ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn roster_counts_after_single_adds() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  roster::add_member(&s, &f.admin, id, RosterRole::Assessee, f.assessee)
    .await
    .unwrap();
  roster::add_member(&s, &f.admin, id, RosterRole::Assessor, f.assessor)
    .await
    .unwrap();
  let detail =
    roster::add_member(&s, &f.admin, id, RosterRole::Skill, f.skill)
      .await
      .unwrap();

  assert_eq!(detail.roster.assessees.len(), 1);
  assert_eq!(detail.roster.assessors.len(), 1);
  assert_eq!(detail.roster.skills.len(), 1);
}

#[tokio::test]
async fn duplicate_add_is_a_noop_without_a_log_entry() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  roster::add_member(&s, &f.admin, id, RosterRole::Assessee, f.assessee)
    .await
    .unwrap();
  let before = s.session_changes(id).await.unwrap().len();

  let detail =
    roster::add_member(&s, &f.admin, id, RosterRole::Assessee, f.assessee)
      .await
      .unwrap();
  assert_eq!(detail.roster.assessees.len(), 1);
  assert_eq!(s.session_changes(id).await.unwrap().len(), before);
}

#[tokio::test]
async fn adding_an_unknown_person_is_not_found() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let err =
    roster::add_member(&s, &f.admin, id, RosterRole::Assessee, Uuid::new_v4())
      .await
      .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn remove_member_logs_and_absent_removal_is_noop() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  roster::add_member(&s, &f.admin, id, RosterRole::Skill, f.skill)
    .await
    .unwrap();
  let detail =
    roster::remove_member(&s, &f.admin, id, RosterRole::Skill, f.skill)
      .await
      .unwrap();
  assert!(detail.roster.skills.is_empty());

  let entries = s.session_changes(id).await.unwrap();
  assert_eq!(entries.last().unwrap().event, EventKind::RemoveSkill);
  let count = entries.len();

  // Removing again changes nothing.
  roster::remove_member(&s, &f.admin, id, RosterRole::Skill, f.skill)
    .await
    .unwrap();
  assert_eq!(s.session_changes(id).await.unwrap().len(), count);
}

#[tokio::test]
async fn sync_is_idempotent_with_effective_counts() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let first = roster::sync_members(
    &s,
    &f.admin,
    id,
    RosterRole::Assessee,
    vec![f.assessee, f.assessor],
    vec![],
  )
  .await
  .unwrap();
  assert_eq!(first.added, 2);
  assert_eq!(first.removed, 0);

  let second = roster::sync_members(
    &s,
    &f.admin,
    id,
    RosterRole::Assessee,
    vec![f.assessee, f.assessor],
    vec![],
  )
  .await
  .unwrap();
  assert_eq!(second.added, 0);
  assert_eq!(second.removed, 0);

  // One AddAssessee entry per net-effective addition, none duplicated.
  let adds = s
    .session_changes(id)
    .await
    .unwrap()
    .into_iter()
    .filter(|e| e.event == EventKind::AddAssessee)
    .count();
  assert_eq!(adds, 2);
}

#[tokio::test]
async fn sync_counts_only_present_removals() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  roster::add_member(&s, &f.admin, id, RosterRole::Assessee, f.assessee)
    .await
    .unwrap();

  let outcome = roster::sync_members(
    &s,
    &f.admin,
    id,
    RosterRole::Assessee,
    vec![],
    vec![f.assessee, f.assessor], // assessor was never a member
  )
  .await
  .unwrap();
  assert_eq!(outcome.added, 0);
  assert_eq!(outcome.removed, 1);
}

// ─── Access tiers ────────────────────────────────────────────────────────────

#[tokio::test]
async fn assessors_get_session_scoped_access_and_others_do_not() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  roster::add_member(&s, &f.admin, id, RosterRole::Assessor, f.assessor)
    .await
    .unwrap();

  let assessor_ctx =
    ctx(f.admin.org.org_id, OrgRole::Member, Some(f.assessor));
  let stranger_ctx =
    ctx(f.admin.org.org_id, OrgRole::Member, Some(f.assessee));

  assert!(
    check::list_checks(&s, &assessor_ctx, id).await.is_ok(),
    "assessor should pass the session-scoped tier"
  );
  assert!(matches!(
    check::list_checks(&s, &stranger_ctx, id).await,
    Err(Error::Forbidden(_))
  ));
}

// ─── Checks ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_check_derives_fields_from_session_and_caller() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let check = check::create_check(
    &s,
    &f.admin,
    id,
    NewCheck {
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::Competent,
      notes:       None,
    },
  )
  .await
  .unwrap();

  assert!(check.passed);
  assert_eq!(check.status, CheckStatus::Draft);
  assert_eq!(check.date, date("2025-01-10"));
  assert_eq!(check.assessor_id, f.admin.person_id.unwrap());

  let entries = s.session_changes(id).await.unwrap();
  assert_eq!(entries.last().unwrap().event, EventKind::CreateCheck);
}

#[tokio::test]
async fn failing_levels_do_not_pass() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  for (level, expected) in [
    (CompetenceLevel::NotTaught, false),
    (CompetenceLevel::NotCompetent, false),
    (CompetenceLevel::Competent, true),
    (CompetenceLevel::HighlyConfident, true),
  ] {
    let check = check::create_check(
      &s,
      &f.admin,
      id,
      NewCheck {
        skill_id:    f.skill,
        assessee_id: f.assessee,
        result:      level,
        notes:       None,
      },
    )
    .await
    .unwrap();
    assert_eq!(check.passed, expected, "level {level:?}");
  }
}

#[tokio::test]
async fn update_check_restamps_author_and_logs_diff() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let created = check::create_check(
    &s,
    &f.admin,
    id,
    NewCheck {
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::NotCompetent,
      notes:       None,
    },
  )
  .await
  .unwrap();

  // A different admin edits the check; authorship moves to them.
  let editor = AccessContext {
    user_id: Uuid::new_v4(),
    person_id: Some(f.assessor),
    org: f.admin.org,
  };

  let updated = check::update_check(
    &s,
    &editor,
    id,
    created.check_id,
    CheckFields {
      result: CompetenceLevel::Competent,
      notes:  Some("retest passed".into()),
    },
  )
  .await
  .unwrap();

  assert!(updated.passed);
  assert_eq!(updated.assessor_id, f.assessor);

  let entries = s.session_changes(id).await.unwrap();
  let last = entries.last().unwrap();
  assert_eq!(last.event, EventKind::UpdateCheck);
  assert_eq!(last.changes.len(), 2); // result and notes
}

#[tokio::test]
async fn update_check_with_same_fields_writes_nothing() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let created = check::create_check(
    &s,
    &f.admin,
    id,
    NewCheck {
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::Competent,
      notes:       Some("solid".into()),
    },
  )
  .await
  .unwrap();
  let before = s.session_changes(id).await.unwrap().len();

  let unchanged = check::update_check(
    &s,
    &f.admin,
    id,
    created.check_id,
    CheckFields {
      result: CompetenceLevel::Competent,
      notes:  Some("solid".into()),
    },
  )
  .await
  .unwrap();

  // Not re-stamped and not logged.
  assert_eq!(unchanged.recorded_at, created.recorded_at);
  assert_eq!(s.session_changes(id).await.unwrap().len(), before);
}

#[tokio::test]
async fn save_checks_upserts_by_id_with_audit_entries() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let existing = check::create_check(
    &s,
    &f.admin,
    id,
    NewCheck {
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::NotTaught,
      notes:       None,
    },
  )
  .await
  .unwrap();

  let saved = check::save_checks(
    &s,
    &f.admin,
    id,
    vec![
      SaveCheck {
        check_id:    Some(existing.check_id),
        skill_id:    f.skill,
        assessee_id: f.assessee,
        result:      CompetenceLevel::Competent,
        notes:       None,
      },
      SaveCheck {
        check_id:    None,
        skill_id:    f.skill,
        assessee_id: f.assessor,
        result:      CompetenceLevel::HighlyConfident,
        notes:       Some("demonstrated twice".into()),
      },
    ],
  )
  .await
  .unwrap();

  assert_eq!(saved.len(), 2);
  assert_eq!(saved[0].check_id, existing.check_id);
  assert!(saved[0].passed);
  assert_eq!(saved[1].status, CheckStatus::Draft);
  assert_eq!(saved[1].date, date("2025-01-10"));

  let events: Vec<EventKind> = s
    .session_changes(id)
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.event)
    .collect();
  assert_eq!(
    &events[1..],
    &[EventKind::CreateCheck, EventKind::UpdateCheck, EventKind::CreateCheck]
  );
}

#[tokio::test]
async fn delete_check_captures_participants_in_the_log() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let created = check::create_check(
    &s,
    &f.admin,
    id,
    NewCheck {
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::Competent,
      notes:       None,
    },
  )
  .await
  .unwrap();

  check::delete_check(&s, &f.admin, id, created.check_id)
    .await
    .unwrap();
  assert!(s.get_check(created.check_id).await.unwrap().is_none());

  let entries = s.session_changes(id).await.unwrap();
  let last = entries.last().unwrap();
  assert_eq!(last.event, EventKind::DeleteCheck);
  assert_eq!(
    last.metadata.get("assessee_id").unwrap().as_str().unwrap(),
    f.assessee.to_string()
  );
  assert_eq!(
    last.metadata.get("assessor_id").unwrap().as_str().unwrap(),
    f.admin.person_id.unwrap().to_string()
  );
}

#[tokio::test]
async fn independent_check_skips_the_draft_phase() {
  let s = store().await;
  let f = fixture(&s).await;

  let check = check::create_independent_check(
    &s,
    &f.admin,
    NewIndependentCheck {
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::HighlyConfident,
      notes:       None,
      date:        date("2025-03-05"),
    },
  )
  .await
  .unwrap();

  assert!(check.session_id.is_none());
  assert_eq!(check.status, CheckStatus::Include);
  assert_eq!(check.date, date("2025-03-05"));
}

#[tokio::test]
async fn independent_check_requires_a_person_record() {
  let s = store().await;
  let f = fixture(&s).await;
  let no_person = ctx(f.admin.org.org_id, OrgRole::Member, None);

  let err = check::create_independent_check(
    &s,
    &no_person,
    NewIndependentCheck {
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::Competent,
      notes:       None,
      date:        date("2025-03-05"),
    },
  )
  .await
  .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

// ─── Review ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn review_publishes_session_and_reclassifies_checks() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let kept = check::create_check(
    &s,
    &f.admin,
    id,
    NewCheck {
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::Competent,
      notes:       None,
    },
  )
  .await
  .unwrap();
  let dropped = check::create_check(
    &s,
    &f.admin,
    id,
    NewCheck {
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::NotTaught,
      notes:       None,
    },
  )
  .await
  .unwrap();

  let reviewed = review::save_review(
    &s,
    &f.admin,
    id,
    SessionStatus::Include,
    vec![kept.check_id],
    vec![dropped.check_id],
  )
  .await
  .unwrap();
  assert_eq!(reviewed.status, SessionStatus::Include);

  let checks = s.list_checks(id).await.unwrap();
  let by_id = |cid| checks.iter().find(|c| c.check_id == cid).unwrap();
  assert_eq!(by_id(kept.check_id).status, CheckStatus::Include);
  assert_eq!(by_id(dropped.check_id).status, CheckStatus::Exclude);
}

#[tokio::test]
async fn resubmitting_an_identical_review_writes_nothing() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let check = check::create_check(
    &s,
    &f.admin,
    id,
    NewCheck {
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::Competent,
      notes:       None,
    },
  )
  .await
  .unwrap();

  review::save_review(
    &s,
    &f.admin,
    id,
    SessionStatus::Include,
    vec![check.check_id],
    vec![],
  )
  .await
  .unwrap();
  let entries_after_first = s.session_changes(id).await.unwrap().len();

  let second = review::save_review(
    &s,
    &f.admin,
    id,
    SessionStatus::Include,
    vec![check.check_id],
    vec![],
  )
  .await
  .unwrap();
  assert_eq!(second.status, SessionStatus::Include);
  assert_eq!(s.session_changes(id).await.unwrap().len(), entries_after_first);
}

#[tokio::test]
async fn review_logs_the_status_transition() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  review::save_review(&s, &f.admin, id, SessionStatus::Exclude, vec![], vec![])
    .await
    .unwrap();

  let entries = s.session_changes(id).await.unwrap();
  let last = entries.last().unwrap();
  assert_eq!(last.event, EventKind::Update);
  assert_eq!(last.changes.len(), 1);
  assert_eq!(last.changes[0].field, "status");
  assert_eq!(last.changes[0].before, serde_json::json!("draft"));
  assert_eq!(last.changes[0].after, serde_json::json!("exclude"));
}

#[tokio::test]
async fn reviewed_sessions_can_move_between_include_and_exclude() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  review::save_review(&s, &f.admin, id, SessionStatus::Include, vec![], vec![])
    .await
    .unwrap();
  let flipped =
    review::save_review(&s, &f.admin, id, SessionStatus::Exclude, vec![], vec![])
      .await
      .unwrap();
  assert_eq!(flipped.status, SessionStatus::Exclude);
}

#[tokio::test]
async fn reviewed_sessions_cannot_return_to_draft() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  review::save_review(&s, &f.admin, id, SessionStatus::Include, vec![], vec![])
    .await
    .unwrap();

  let err =
    review::save_review(&s, &f.admin, id, SessionStatus::Draft, vec![], vec![])
      .await
      .unwrap_err();
  assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn reviewed_checks_reject_edits_outside_review() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  let created = check::create_check(
    &s,
    &f.admin,
    id,
    NewCheck {
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::Competent,
      notes:       None,
    },
  )
  .await
  .unwrap();

  review::save_review(
    &s,
    &f.admin,
    id,
    SessionStatus::Include,
    vec![created.check_id],
    vec![],
  )
  .await
  .unwrap();

  let err = check::update_check(
    &s,
    &f.admin,
    id,
    created.check_id,
    CheckFields { result: CompetenceLevel::NotCompetent, notes: None },
  )
  .await
  .unwrap_err();
  assert!(matches!(err, Error::BadRequest(_)));

  let err = check::save_checks(
    &s,
    &f.admin,
    id,
    vec![SaveCheck {
      check_id:    Some(created.check_id),
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::NotCompetent,
      notes:       None,
    }],
  )
  .await
  .unwrap_err();
  assert!(matches!(err, Error::BadRequest(_)));

  // The reviewed row is untouched.
  let current = s.get_check(created.check_id).await.unwrap().unwrap();
  assert_eq!(current.result, CompetenceLevel::Competent);
  assert_eq!(current.status, CheckStatus::Include);
  assert!(current.passed);
}

// ─── Change log ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_write_persists_no_change_entry() {
  let s = store().await;
  let f = fixture(&s).await;

  // No such session: the member insert violates a foreign key, and the
  // entry written in the same transaction must roll back with it.
  let missing = Uuid::new_v4();
  let entry = ChangeEntry::session(
    missing,
    f.admin.user_id,
    EventKind::AddAssessor,
  );
  s.add_member(missing, RosterRole::Assessor, f.assessor, entry)
    .await
    .unwrap_err();

  assert!(s.session_changes(missing).await.unwrap().is_empty());
}

// ─── People ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn person_update_is_diff_gated() {
  let s = store().await;
  let f = fixture(&s).await;

  let created = person::create_person(
    &s,
    &f.admin,
    NewPerson {
      name:    "Kit".into(),
      email:   "kit@example.com".into(),
      user_id: None,
    },
  )
  .await
  .unwrap();

  let unchanged = person::update_person(
    &s,
    &f.admin,
    created.person_id,
    muster_core::person::PersonFields {
      name:    "Kit".into(),
      email:   "kit@example.com".into(),
      status:  muster_core::person::PersonStatus::Active,
      user_id: None,
    },
  )
  .await
  .unwrap();
  assert_eq!(unchanged.name, "Kit");

  let renamed = person::update_person(
    &s,
    &f.admin,
    created.person_id,
    muster_core::person::PersonFields {
      name:    "Kit Carson".into(),
      email:   "kit@example.com".into(),
      status:  muster_core::person::PersonStatus::Active,
      user_id: None,
    },
  )
  .await
  .unwrap();
  assert_eq!(renamed.name, "Kit Carson");

  let fetched =
    person::get_person(&s, &f.admin, created.person_id).await.unwrap();
  assert_eq!(fetched.name, "Kit Carson");
}

#[tokio::test]
async fn people_outside_the_org_are_not_found() {
  let s = store().await;
  let f = fixture(&s).await;
  let outsider = ctx(Uuid::new_v4(), OrgRole::Admin, None);

  let err =
    person::get_person(&s, &outsider, f.assessee).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

// ─── Catalogue ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn catalogue_mutations_are_logged_per_package() {
  let s = store().await;
  let f = fixture(&s).await;

  let package = catalog::create_package(
    &s,
    &f.admin,
    catalog::NewPackage { name: "Seamanship".into(), seq: 1 },
  )
  .await
  .unwrap();
  let group = catalog::create_group(
    &s,
    &f.admin,
    catalog::NewGroup {
      package_id: package.package_id,
      name:       "Ropework".into(),
      seq:        1,
    },
  )
  .await
  .unwrap();
  catalog::create_skill(
    &s,
    &f.admin,
    catalog::NewSkill {
      group_id: Some(group.group_id),
      name:     "Bowline".into(),
      seq:      1,
    },
  )
  .await
  .unwrap();

  let entries =
    catalog::list_package_changes(&s, &f.admin, package.package_id)
      .await
      .unwrap();
  let events: Vec<EventKind> = entries.iter().map(|e| e.event).collect();
  assert_eq!(
    events,
    vec![EventKind::Create, EventKind::Create, EventKind::AddSkill]
  );
}

// ─── End-to-end scenario ─────────────────────────────────────────────────────

#[tokio::test]
async fn full_session_lifecycle() {
  let s = store().await;
  let f = fixture(&s).await;
  let id = draft_session(&s, &f).await;

  roster::add_member(&s, &f.admin, id, RosterRole::Assessee, f.assessee)
    .await
    .unwrap();
  roster::add_member(&s, &f.admin, id, RosterRole::Assessor, f.assessor)
    .await
    .unwrap();
  roster::add_member(&s, &f.admin, id, RosterRole::Skill, f.skill)
    .await
    .unwrap();

  let detail = session::get_session(&s, &f.admin, id).await.unwrap();
  assert_eq!(detail.roster.assessees.len(), 1);
  assert_eq!(detail.roster.assessors.len(), 1);
  assert_eq!(detail.roster.skills.len(), 1);

  let check = check::create_check(
    &s,
    &f.admin,
    id,
    NewCheck {
      skill_id:    f.skill,
      assessee_id: f.assessee,
      result:      CompetenceLevel::Competent,
      notes:       None,
    },
  )
  .await
  .unwrap();
  assert!(check.passed);
  assert_eq!(check.status, CheckStatus::Draft);

  let reviewed = review::save_review(
    &s,
    &f.admin,
    id,
    SessionStatus::Include,
    vec![check.check_id],
    vec![],
  )
  .await
  .unwrap();
  assert_eq!(reviewed.status, SessionStatus::Include);

  // Every mutation above left exactly one entry:
  // Create, 3 roster adds, CreateCheck, review Update.
  let entries = s.session_changes(id).await.unwrap();
  assert_eq!(entries.len(), 6);
}
