//! Person — a human record referenced by sessions and checks.
//!
//! People are soft-deleted via [`PersonStatus::Inactive`]; a person is
//! never removed while historical checks reference them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonStatus {
  Active,
  Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub person_id:  Uuid,
  pub org_id:     Uuid,
  pub name:       String,
  pub email:      String,
  pub status:     PersonStatus,
  /// Link to an external user account, if the person has one.
  pub user_id:    Option<Uuid>,
  pub created_at: DateTime<Utc>,
}

impl Person {
  /// The diffable field view; keys match the update-input shape.
  pub fn field_map(&self) -> Map<String, Value> {
    let v = json!({
      "name":    self.name,
      "email":   self.email,
      "status":  self.status,
      "user_id": self.user_id,
    });
    match v {
      Value::Object(m) => m,
      _ => unreachable!(),
    }
  }
}

/// Input to person creation. `person_id` and `created_at` are assigned by
/// the workflow; `org_id` always comes from the caller's context.
#[derive(Debug, Clone)]
pub struct NewPerson {
  pub name:    String,
  pub email:   String,
  pub user_id: Option<Uuid>,
}

/// Admin-editable fields of a person.
#[derive(Debug, Clone)]
pub struct PersonFields {
  pub name:    String,
  pub email:   String,
  pub status:  PersonStatus,
  pub user_id: Option<Uuid>,
}
