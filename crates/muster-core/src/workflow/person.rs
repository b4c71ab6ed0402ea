//! Person management.
//!
//! People are referenced, not owned, by sessions; their edits are not
//! session-scoped and therefore carry no session change entries.

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::AccessContext,
  diff::diff_objects,
  person::{NewPerson, Person, PersonFields, PersonStatus},
  store::SessionStore,
};

/// Load a person visible to the caller's organization, or `NotFound`.
pub(crate) async fn person_in_scope<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  person_id: Uuid,
) -> Result<Person> {
  store
    .get_person(person_id)
    .await
    .map_err(Error::store)?
    .filter(|p| p.org_id == ctx.org.org_id)
    .ok_or_else(|| Error::NotFound(format!("person {person_id}")))
}

pub async fn create_person<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  input: NewPerson,
) -> Result<Person> {
  ctx.require_admin()?;

  if input.name.trim().is_empty() || input.email.trim().is_empty() {
    return Err(Error::BadRequest(
      "person name and email must not be blank".to_string(),
    ));
  }

  let person = Person {
    person_id: Uuid::new_v4(),
    org_id: ctx.org.org_id,
    name: input.name,
    email: input.email,
    status: PersonStatus::Active,
    user_id: input.user_id,
    created_at: Utc::now(),
  };

  store.insert_person(person.clone()).await.map_err(Error::store)?;
  Ok(person)
}

/// Diff-gated person edit.
pub async fn update_person<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  person_id: Uuid,
  fields: PersonFields,
) -> Result<Person> {
  ctx.require_admin()?;
  let current = person_in_scope(store, ctx, person_id).await?;

  let candidate = Person {
    name: fields.name,
    email: fields.email,
    status: fields.status,
    user_id: fields.user_id,
    ..current.clone()
  };

  if diff_objects(&current.field_map(), &candidate.field_map()).is_empty() {
    return Ok(current);
  }

  if candidate.name.trim().is_empty() || candidate.email.trim().is_empty() {
    return Err(Error::BadRequest(
      "person name and email must not be blank".to_string(),
    ));
  }

  store.update_person(candidate.clone()).await.map_err(Error::store)?;
  Ok(candidate)
}

pub async fn get_person<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
  person_id: Uuid,
) -> Result<Person> {
  person_in_scope(store, ctx, person_id).await
}

pub async fn list_people<S: SessionStore>(
  store: &S,
  ctx: &AccessContext,
) -> Result<Vec<Person>> {
  store.list_people(ctx.org.org_id).await.map_err(Error::store)
}
