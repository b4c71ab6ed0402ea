//! Skill-check sessions and their rosters.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::changelog::EventKind;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Review state of a session. Starts at `Draft` and is only advanced by an
/// explicit review action; once a session has left `Draft` it never
/// returns there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
  Draft,
  Include,
  Exclude,
}

impl SessionStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Draft => "draft",
      Self::Include => "include",
      Self::Exclude => "exclude",
    }
  }
}

impl FromStr for SessionStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "draft" => Ok(Self::Draft),
      "include" => Ok(Self::Include),
      "exclude" => Ok(Self::Exclude),
      other => Err(format!("unknown session status: {other:?}")),
    }
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// One assessment event: a named, dated gathering with a roster of
/// assessors, assessees, and skills.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub session_id: Uuid,
  pub org_id:     Uuid,
  pub name:       String,
  pub notes:      Option<String>,
  pub date:       NaiveDate,
  pub status:     SessionStatus,
  pub created_at: DateTime<Utc>,
}

impl Session {
  /// The diffable field view; keys match the update-input shape.
  pub fn field_map(&self) -> Map<String, Value> {
    let v = json!({
      "name":   self.name,
      "notes":  self.notes,
      "date":   self.date,
      "status": self.status,
    });
    match v {
      Value::Object(m) => m,
      _ => unreachable!(),
    }
  }

  /// The empty-default baseline a freshly created session is diffed
  /// against for its `Create` change entry.
  pub fn empty_baseline() -> Map<String, Value> {
    let v = json!({
      "name":   "",
      "notes":  null,
      "date":   null,
      "status": SessionStatus::Draft,
    });
    match v {
      Value::Object(m) => m,
      _ => unreachable!(),
    }
  }
}

/// Input to session creation. A caller-chosen `session_id` collides with
/// an existing row as `Conflict`; omitted, one is generated.
#[derive(Debug, Clone)]
pub struct NewSession {
  pub session_id: Option<Uuid>,
  pub name:       String,
  pub notes:      Option<String>,
  pub date:       NaiveDate,
}

/// Admin-editable fields of a session. Status is excluded: it only moves
/// through review.
#[derive(Debug, Clone)]
pub struct SessionFields {
  pub name:  String,
  pub notes: Option<String>,
  pub date:  NaiveDate,
}

// ─── Roster ──────────────────────────────────────────────────────────────────

/// One of the three many-to-many sets attached to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterRole {
  Assessor,
  Assessee,
  Skill,
}

impl RosterRole {
  pub fn add_event(self) -> EventKind {
    match self {
      Self::Assessor => EventKind::AddAssessor,
      Self::Assessee => EventKind::AddAssessee,
      Self::Skill => EventKind::AddSkill,
    }
  }

  pub fn remove_event(self) -> EventKind {
    match self {
      Self::Assessor => EventKind::RemoveAssessor,
      Self::Assessee => EventKind::RemoveAssessee,
      Self::Skill => EventKind::RemoveSkill,
    }
  }

  /// The metadata key naming the target id in change entries.
  pub fn metadata_key(self) -> &'static str {
    match self {
      Self::Assessor | Self::Assessee => "person_id",
      Self::Skill => "skill_id",
    }
  }
}

/// The current membership sets of a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
  pub assessors: Vec<Uuid>,
  pub assessees: Vec<Uuid>,
  pub skills:    Vec<Uuid>,
}

impl Roster {
  pub fn members(&self, role: RosterRole) -> &[Uuid] {
    match role {
      RosterRole::Assessor => &self.assessors,
      RosterRole::Assessee => &self.assessees,
      RosterRole::Skill => &self.skills,
    }
  }
}

/// A session together with its roster — the read model returned by
/// session-detail queries and roster mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
  pub session: Session,
  pub roster:  Roster,
}

/// Net-effective result of a bulk roster synchronisation. Requested ids
/// that were already present (or already absent) are not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
  pub added:   usize,
  pub removed: usize,
}
