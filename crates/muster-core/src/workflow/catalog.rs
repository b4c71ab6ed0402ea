//! Catalogue administration: packages, groups, skills.
//!
//! Catalogue mutations are package-scoped in the change log. A skill with
//! no group sits outside any package and is not logged.

use serde_json::json;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::AccessContext,
  catalog::{CatalogStatus, Skill, SkillGroup, SkillPackage},
  changelog::{ChangeEntry, EventKind},
  store::SessionStore,
};

#[derive(Debug, Clone)]
pub struct NewPackage {
  pub name: String,
  pub seq:  i64,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
  pub package_id: Uuid,
  pub name:       String,
  pub seq:        i64,
}

#[derive(Debug, Clone)]
pub struct NewSkill {
  pub group_id: Option<Uuid>,
  pub name:     String,
  pub seq:      i64,
}

fn require_name(name: &str) -> Result<()> {
  if name.trim().is_empty() {
    Err(Error::BadRequest("name must not be blank".to_string()))
  } else {
    Ok(())
  }
}

pub async fn create_package<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  input: NewPackage,
) -> Result<SkillPackage> {
  ctx.require_admin()?;
  require_name(&input.name)?;

  let package = SkillPackage {
    package_id: Uuid::new_v4(),
    name:       input.name,
    status:     CatalogStatus::Active,
    seq:        input.seq,
  };

  let entry =
    ChangeEntry::package(package.package_id, ctx.user_id, EventKind::Create)
      .with_metadata(json!({ "package_id": package.package_id }));

  store
    .insert_package(package.clone(), entry)
    .await
    .map_err(Error::store)?;
  Ok(package)
}

pub async fn create_group<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  input: NewGroup,
) -> Result<SkillGroup> {
  ctx.require_admin()?;
  require_name(&input.name)?;

  if store
    .get_package(input.package_id)
    .await
    .map_err(Error::store)?
    .is_none()
  {
    return Err(Error::NotFound(format!("package {}", input.package_id)));
  }

  let group = SkillGroup {
    group_id:   Uuid::new_v4(),
    package_id: input.package_id,
    name:       input.name,
    seq:        input.seq,
  };

  let entry =
    ChangeEntry::package(input.package_id, ctx.user_id, EventKind::Create)
      .with_metadata(json!({ "group_id": group.group_id }));

  store.insert_group(group.clone(), entry).await.map_err(Error::store)?;
  Ok(group)
}

pub async fn create_skill<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  input: NewSkill,
) -> Result<Skill> {
  ctx.require_admin()?;
  require_name(&input.name)?;

  // Resolve the owning package through the group, if any.
  let package_id = match input.group_id {
    Some(group_id) => Some(
      store
        .get_group(group_id)
        .await
        .map_err(Error::store)?
        .ok_or_else(|| Error::NotFound(format!("group {group_id}")))?
        .package_id,
    ),
    None => None,
  };

  let skill = Skill {
    skill_id: Uuid::new_v4(),
    group_id: input.group_id,
    name:     input.name,
    status:   CatalogStatus::Active,
    seq:      input.seq,
  };

  let entry = package_id.map(|pkg| {
    ChangeEntry::package(pkg, ctx.user_id, EventKind::AddSkill)
      .with_metadata(json!({ "skill_id": skill.skill_id }))
  });

  store.insert_skill(skill.clone(), entry).await.map_err(Error::store)?;
  Ok(skill)
}

pub async fn list_packages<S: SessionStore>(store: &S) -> Result<Vec<SkillPackage>> {
  store.list_packages().await.map_err(Error::store)
}

pub async fn list_skills<S: SessionStore>(store: &S) -> Result<Vec<Skill>> {
  store.list_skills().await.map_err(Error::store)
}

/// Admin read of a package's audit trail.
pub async fn list_package_changes<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  package_id: Uuid,
) -> Result<Vec<ChangeEntry>> {
  ctx.require_admin()?;
  store.package_changes(package_id).await.map_err(Error::store)
}
