//! The per-request access context.
//!
//! Identity resolution (who is calling, which organization is active, what
//! role they hold there) happens at the transport boundary. The workflow
//! never re-implements authentication; it consumes an [`AccessContext`]
//! passed explicitly into every function.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// The caller's role within their active organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
  Member,
  Admin,
}

/// The caller's active organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgContext {
  pub org_id: Uuid,
  pub role:   OrgRole,
}

/// Everything the workflow needs to know about the caller.
///
/// `person_id` links the account to a [`Person`](crate::person::Person)
/// record; it is `None` for accounts with no person in the active
/// organization, which blocks them from authoring checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessContext {
  pub user_id:   Uuid,
  pub person_id: Option<Uuid>,
  pub org:       OrgContext,
}

impl AccessContext {
  pub fn is_admin(&self) -> bool { self.org.role == OrgRole::Admin }

  /// Org-admin tier.
  pub fn require_admin(&self) -> Result<()> {
    if self.is_admin() {
      Ok(())
    } else {
      Err(Error::Forbidden("organization admin required".to_string()))
    }
  }

  /// The caller must resolve to a person record, e.g. to be stamped as the
  /// assessor on a check.
  pub fn require_person(&self) -> Result<Uuid> {
    self.person_id.ok_or_else(|| {
      Error::Forbidden(
        "caller has no person record in the active organization".to_string(),
      )
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ctx(role: OrgRole, person: Option<Uuid>) -> AccessContext {
    AccessContext {
      user_id:   Uuid::new_v4(),
      person_id: person,
      org:       OrgContext { org_id: Uuid::new_v4(), role },
    }
  }

  #[test]
  fn admin_tier() {
    assert!(ctx(OrgRole::Admin, None).require_admin().is_ok());
    assert!(matches!(
      ctx(OrgRole::Member, None).require_admin(),
      Err(Error::Forbidden(_))
    ));
  }

  #[test]
  fn person_requirement() {
    let person = Uuid::new_v4();
    assert_eq!(
      ctx(OrgRole::Member, Some(person)).require_person().unwrap(),
      person
    );
    assert!(matches!(
      ctx(OrgRole::Member, None).require_person(),
      Err(Error::Forbidden(_))
    ));
  }
}
