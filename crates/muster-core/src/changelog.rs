//! The append-only change log.
//!
//! Every mutating operation appends exactly one entry (bulk roster sync:
//! one per net-effective change) in the same transaction as the mutation
//! it describes. No update or delete path exists for entries anywhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::diff::FieldChange;

/// Closed vocabulary of auditable events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  Create,
  Update,
  Delete,
  AddAssessor,
  RemoveAssessor,
  AddAssessee,
  RemoveAssessee,
  AddSkill,
  RemoveSkill,
  CreateCheck,
  UpdateCheck,
  DeleteCheck,
}

impl EventKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Create => "create",
      Self::Update => "update",
      Self::Delete => "delete",
      Self::AddAssessor => "add_assessor",
      Self::RemoveAssessor => "remove_assessor",
      Self::AddAssessee => "add_assessee",
      Self::RemoveAssessee => "remove_assessee",
      Self::AddSkill => "add_skill",
      Self::RemoveSkill => "remove_skill",
      Self::CreateCheck => "create_check",
      Self::UpdateCheck => "update_check",
      Self::DeleteCheck => "delete_check",
    }
  }
}

impl std::str::FromStr for EventKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "create" => Ok(Self::Create),
      "update" => Ok(Self::Update),
      "delete" => Ok(Self::Delete),
      "add_assessor" => Ok(Self::AddAssessor),
      "remove_assessor" => Ok(Self::RemoveAssessor),
      "add_assessee" => Ok(Self::AddAssessee),
      "remove_assessee" => Ok(Self::RemoveAssessee),
      "add_skill" => Ok(Self::AddSkill),
      "remove_skill" => Ok(Self::RemoveSkill),
      "create_check" => Ok(Self::CreateCheck),
      "update_check" => Ok(Self::UpdateCheck),
      "delete_check" => Ok(Self::DeleteCheck),
      other => Err(format!("unknown event kind: {other:?}")),
    }
  }
}

/// One audit entry. Scoped to a session or to a catalogue package, never
/// both. `recorded_at` is stamped at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEntry {
  pub entry_id:    Uuid,
  pub session_id:  Option<Uuid>,
  pub package_id:  Option<Uuid>,
  /// The acting user account.
  pub actor_id:    Uuid,
  pub event:       EventKind,
  /// Structured ids involved in the operation, e.g. `{"person_id": ...}`.
  pub metadata:    Value,
  /// Field-level before/after delta, when the operation has one.
  pub changes:     Vec<FieldChange>,
  pub recorded_at: DateTime<Utc>,
}

impl ChangeEntry {
  /// A session-scoped entry with empty metadata and no delta.
  pub fn session(session_id: Uuid, actor_id: Uuid, event: EventKind) -> Self {
    Self {
      entry_id: Uuid::new_v4(),
      session_id: Some(session_id),
      package_id: None,
      actor_id,
      event,
      metadata: Value::Object(serde_json::Map::new()),
      changes: Vec::new(),
      recorded_at: Utc::now(),
    }
  }

  /// A catalogue-package-scoped entry.
  pub fn package(package_id: Uuid, actor_id: Uuid, event: EventKind) -> Self {
    Self {
      entry_id: Uuid::new_v4(),
      session_id: None,
      package_id: Some(package_id),
      actor_id,
      event,
      metadata: Value::Object(serde_json::Map::new()),
      changes: Vec::new(),
      recorded_at: Utc::now(),
    }
  }

  pub fn with_metadata(mut self, metadata: Value) -> Self {
    self.metadata = metadata;
    self
  }

  pub fn with_changes(mut self, changes: Vec<FieldChange>) -> Self {
    self.changes = changes;
    self
  }
}
