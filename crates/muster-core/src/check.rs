//! Skill checks — one recorded competence observation each.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

// ─── Competence level ────────────────────────────────────────────────────────

/// Ordered assessment outcome. The top two levels denote a pass.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CompetenceLevel {
  NotTaught,
  NotCompetent,
  Competent,
  HighlyConfident,
}

impl CompetenceLevel {
  /// `passed` is strictly derived from the level; it is never settable
  /// independently.
  pub fn passed(self) -> bool {
    matches!(self, Self::Competent | Self::HighlyConfident)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::NotTaught => "not_taught",
      Self::NotCompetent => "not_competent",
      Self::Competent => "competent",
      Self::HighlyConfident => "highly_confident",
    }
  }
}

impl FromStr for CompetenceLevel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "not_taught" => Ok(Self::NotTaught),
      "not_competent" => Ok(Self::NotCompetent),
      "competent" => Ok(Self::Competent),
      "highly_confident" => Ok(Self::HighlyConfident),
      other => Err(format!("unknown competence level: {other:?}")),
    }
  }
}

// ─── Check status ────────────────────────────────────────────────────────────

/// Inclusion state of a check. Session-scoped checks start at `Draft` and
/// are only reassigned by the review engine; independent checks are
/// `Include` from creation, since no review step exists outside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
  Draft,
  Include,
  Exclude,
}

impl CheckStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Draft => "draft",
      Self::Include => "include",
      Self::Exclude => "exclude",
    }
  }
}

impl FromStr for CheckStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "draft" => Ok(Self::Draft),
      "include" => Ok(Self::Include),
      "exclude" => Ok(Self::Exclude),
      other => Err(format!("unknown check status: {other:?}")),
    }
  }
}

// ─── Check ───────────────────────────────────────────────────────────────────

/// A recorded assessment outcome for a (skill, assessee) pair.
///
/// Identity fields (`session_id`, `skill_id`, `assessee_id`) are immutable
/// after creation; re-saving only changes `result`/`notes` and re-stamps
/// `assessor_id` and `recorded_at` to the editing caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCheck {
  pub check_id:    Uuid,
  /// `None` for a check recorded independently of any session.
  pub session_id:  Option<Uuid>,
  pub skill_id:    Uuid,
  pub assessee_id: Uuid,
  pub assessor_id: Uuid,
  pub result:      CompetenceLevel,
  /// Always equal to `result.passed()`.
  pub passed:      bool,
  pub notes:       Option<String>,
  pub date:        NaiveDate,
  pub status:      CheckStatus,
  pub recorded_at: DateTime<Utc>,
}

impl SkillCheck {
  /// The diffable (mutable) field view of a check.
  pub fn field_map(&self) -> Map<String, Value> {
    let v = json!({
      "result": self.result,
      "notes":  self.notes,
    });
    match v {
      Value::Object(m) => m,
      _ => unreachable!(),
    }
  }

  /// The empty-default baseline a fresh check is diffed against for its
  /// `CreateCheck` change entry.
  pub fn empty_baseline() -> Map<String, Value> {
    let v = json!({ "result": null, "notes": null });
    match v {
      Value::Object(m) => m,
      _ => unreachable!(),
    }
  }
}

/// Input to check creation within a session. The assessor is always the
/// caller; the date is inherited from the session.
#[derive(Debug, Clone)]
pub struct NewCheck {
  pub skill_id:    Uuid,
  pub assessee_id: Uuid,
  pub result:      CompetenceLevel,
  pub notes:       Option<String>,
}

/// The mutable fields of an existing check.
#[derive(Debug, Clone)]
pub struct CheckFields {
  pub result: CompetenceLevel,
  pub notes:  Option<String>,
}

/// One element of a batch save: upsert by `check_id`.
#[derive(Debug, Clone)]
pub struct SaveCheck {
  pub check_id:    Option<Uuid>,
  pub skill_id:    Uuid,
  pub assessee_id: Uuid,
  pub result:      CompetenceLevel,
  pub notes:       Option<String>,
}

/// Input to independent (session-less) check creation. The caller supplies
/// the date, since there is no session to inherit it from.
#[derive(Debug, Clone)]
pub struct NewIndependentCheck {
  pub skill_id:    Uuid,
  pub assessee_id: Uuid,
  pub result:      CompetenceLevel,
  pub notes:       Option<String>,
  pub date:        NaiveDate,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pass_is_derived_from_the_top_two_levels() {
    assert!(!CompetenceLevel::NotTaught.passed());
    assert!(!CompetenceLevel::NotCompetent.passed());
    assert!(CompetenceLevel::Competent.passed());
    assert!(CompetenceLevel::HighlyConfident.passed());
  }

  #[test]
  fn levels_are_ordered() {
    assert!(CompetenceLevel::NotTaught < CompetenceLevel::NotCompetent);
    assert!(CompetenceLevel::NotCompetent < CompetenceLevel::Competent);
    assert!(CompetenceLevel::Competent < CompetenceLevel::HighlyConfident);
  }
}
