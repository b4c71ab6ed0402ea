//! The field-level diff used by every diff-gated write.
//!
//! Given a "before" object and a "candidate" object with overlapping keys,
//! produce the list of keys whose values differ, paired with before/after
//! values. An empty result is the no-op signal: all callers must treat it
//! as "nothing to write".

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One changed field, with its before and after values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
  pub field:  String,
  pub before: Value,
  pub after:  Value,
}

/// Shallow keywise diff over the keys of `after`. A key absent from
/// `before` diffs against `null`.
pub fn diff_objects(
  before: &Map<String, Value>,
  after: &Map<String, Value>,
) -> Vec<FieldChange> {
  after
    .iter()
    .filter_map(|(key, after_value)| {
      let before_value = before.get(key).cloned().unwrap_or(Value::Null);
      if &before_value == after_value {
        None
      } else {
        Some(FieldChange {
          field:  key.clone(),
          before: before_value,
          after:  after_value.clone(),
        })
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn obj(v: Value) -> Map<String, Value> {
    match v {
      Value::Object(m) => m,
      _ => panic!("expected object"),
    }
  }

  #[test]
  fn identical_objects_diff_empty() {
    let a = obj(json!({ "name": "Morning Drill", "notes": null }));
    assert!(diff_objects(&a, &a.clone()).is_empty());
  }

  #[test]
  fn changed_and_unchanged_keys() {
    let before = obj(json!({ "name": "Morning Drill", "date": "2025-01-10" }));
    let after = obj(json!({ "name": "Evening Drill", "date": "2025-01-10" }));

    let changes = diff_objects(&before, &after);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].field, "name");
    assert_eq!(changes[0].before, json!("Morning Drill"));
    assert_eq!(changes[0].after, json!("Evening Drill"));
  }

  #[test]
  fn key_missing_from_before_diffs_against_null() {
    let before = obj(json!({}));
    let after = obj(json!({ "notes": "first pass" }));

    let changes = diff_objects(&before, &after);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].before, Value::Null);
  }

  #[test]
  fn null_to_value_is_a_change() {
    let before = obj(json!({ "notes": null }));
    let after = obj(json!({ "notes": "updated" }));
    assert_eq!(diff_objects(&before, &after).len(), 1);
  }
}
