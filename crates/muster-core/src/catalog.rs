//! The assessable-competency catalogue: packages, groups, and skills.
//!
//! Read-mostly reference data. Sessions and checks hold foreign keys into
//! the catalogue; nothing here participates in the session lifecycle.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogStatus {
  Active,
  Retired,
}

/// Top-level grouping sold/distributed as one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillPackage {
  pub package_id: Uuid,
  pub name:       String,
  pub status:     CatalogStatus,
  /// Display ordering within catalogue listings.
  pub seq:        i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGroup {
  pub group_id:   Uuid,
  pub package_id: Uuid,
  pub name:       String,
  pub seq:        i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
  pub skill_id: Uuid,
  pub group_id: Option<Uuid>,
  pub name:     String,
  pub status:   CatalogStatus,
  pub seq:      i64,
}
