//! The `SessionStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `muster-store-sqlite`). The workflow layer depends on this abstraction,
//! not on any concrete backend.
//!
//! Atomicity contract: every method that takes one or more
//! [`ChangeEntry`] values must persist the mutation and the entries in a
//! single transaction — a failed entry write aborts the whole operation,
//! guaranteeing log completeness relative to committed state.

use std::future::Future;

use uuid::Uuid;

use crate::{
  catalog::{Skill, SkillGroup, SkillPackage},
  changelog::ChangeEntry,
  check::SkillCheck,
  person::Person,
  session::{Roster, RosterRole, Session, SessionStatus},
};

/// Abstraction over a Muster storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SessionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  fn insert_person(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found; organization
  /// scoping is the workflow's concern.
  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  fn list_people(
    &self,
    org_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Overwrite a person's editable fields. The row is addressed by
  /// `person.person_id`.
  fn update_person(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Catalogue ─────────────────────────────────────────────────────────

  fn insert_package(
    &self,
    package: SkillPackage,
    entry: ChangeEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_packages(
    &self,
  ) -> impl Future<Output = Result<Vec<SkillPackage>, Self::Error>> + Send + '_;

  fn get_package(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<SkillPackage>, Self::Error>> + Send + '_;

  fn insert_group(
    &self,
    group: SkillGroup,
    entry: ChangeEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_group(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<SkillGroup>, Self::Error>> + Send + '_;

  fn insert_skill(
    &self,
    skill: Skill,
    entry: Option<ChangeEntry>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_skill(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Skill>, Self::Error>> + Send + '_;

  /// All skills, ordered by `seq` then name.
  fn list_skills(
    &self,
  ) -> impl Future<Output = Result<Vec<Skill>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Returns `false` (and writes nothing, entry included) when a session
  /// with the same id already exists.
  fn insert_session(
    &self,
    session: Session,
    entry: ChangeEntry,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Sessions of one organization, optionally filtered to a status set,
  /// ordered by date descending.
  fn list_sessions(
    &self,
    org_id: Uuid,
    statuses: Vec<SessionStatus>,
  ) -> impl Future<Output = Result<Vec<Session>, Self::Error>> + Send + '_;

  /// Overwrite a session's editable fields (name, notes, date).
  fn update_session(
    &self,
    session: Session,
    entry: ChangeEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a session, its roster rows, and its checks. The change entry
  /// outlives the session (the log has no foreign key into sessions).
  fn delete_session(
    &self,
    id: Uuid,
    entry: ChangeEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Roster ────────────────────────────────────────────────────────────

  fn roster(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Roster, Self::Error>> + Send + '_;

  fn add_member(
    &self,
    session_id: Uuid,
    role: RosterRole,
    member_id: Uuid,
    entry: ChangeEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn remove_member(
    &self,
    session_id: Uuid,
    role: RosterRole,
    member_id: Uuid,
    entry: ChangeEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Apply a pre-filtered connect/disconnect batch. The caller supplies
  /// one entry per effective addition/removal; everything lands in one
  /// transaction.
  fn sync_members(
    &self,
    session_id: Uuid,
    role: RosterRole,
    additions: Vec<Uuid>,
    removals: Vec<Uuid>,
    entries: Vec<ChangeEntry>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Checks ────────────────────────────────────────────────────────────

  fn insert_check(
    &self,
    check: SkillCheck,
    entry: Option<ChangeEntry>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Overwrite a check's mutable fields (result, passed, notes, assessor,
  /// recorded_at). The row is addressed by `check.check_id`.
  fn update_check(
    &self,
    check: SkillCheck,
    entry: Option<ChangeEntry>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_check(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<SkillCheck>, Self::Error>> + Send + '_;

  /// All checks of a session, ordered by `recorded_at`.
  fn list_checks(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SkillCheck>, Self::Error>> + Send + '_;

  fn delete_check(
    &self,
    check_id: Uuid,
    entry: ChangeEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Commit a review in one transaction: the optional session-status
  /// write with its entry, plus batch reclassification of the given
  /// checks to `Include` and `Exclude` respectively. Check ids that are
  /// not scoped to `session_id` match no rows and are ignored.
  fn apply_review(
    &self,
    session_id: Uuid,
    status_change: Option<(SessionStatus, ChangeEntry)>,
    include: Vec<Uuid>,
    exclude: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Change log ────────────────────────────────────────────────────────

  /// Session-scoped entries in recorded order.
  fn session_changes(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ChangeEntry>, Self::Error>> + Send + '_;

  /// Package-scoped entries in recorded order.
  fn package_changes(
    &self,
    package_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ChangeEntry>, Self::Error>> + Send + '_;
}
