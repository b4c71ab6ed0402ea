//! [`SqliteStore`] — the SQLite implementation of [`SessionStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use muster_core::{
  catalog::{Skill, SkillGroup, SkillPackage},
  changelog::ChangeEntry,
  check::SkillCheck,
  person::Person,
  session::{Roster, RosterRole, Session, SessionStatus},
  store::SessionStore,
};

use crate::{
  Error, Result,
  encode::{
    EntryParams, RawCheck, RawEntry, RawGroup, RawPackage, RawPerson,
    RawSession, RawSkill, encode_catalog_status, encode_date, encode_dt,
    encode_entry, encode_person_status, encode_uuid,
  },
  schema::SCHEMA,
};

/// The join table and member column backing one roster role.
fn role_table(role: RosterRole) -> (&'static str, &'static str) {
  match role {
    RosterRole::Assessor => ("session_assessors", "person_id"),
    RosterRole::Assessee => ("session_assessees", "person_id"),
    RosterRole::Skill => ("session_skills", "skill_id"),
  }
}

/// Append one change-log entry inside an open transaction.
fn insert_entry(
  tx: &rusqlite::Transaction<'_>,
  entry: &EntryParams,
) -> rusqlite::Result<()> {
  tx.execute(
    "INSERT INTO change_log (
       entry_id, session_id, package_id, actor_id,
       event, metadata, changes, recorded_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      entry.entry_id,
      entry.session_id,
      entry.package_id,
      entry.actor_id,
      entry.event,
      entry.metadata,
      entry.changes,
      entry.recorded_at,
    ],
  )?;
  Ok(())
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Muster store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SessionStore impl ───────────────────────────────────────────────────────

impl SessionStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn insert_person(&self, person: Person) -> Result<()> {
    let id_str      = encode_uuid(person.person_id);
    let org_str     = encode_uuid(person.org_id);
    let status_str  = encode_person_status(person.status).to_owned();
    let user_str    = person.user_id.map(encode_uuid);
    let created_str = encode_dt(person.created_at);
    let name        = person.name;
    let email       = person.email;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO people (person_id, org_id, name, email, status, user_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, org_str, name, email, status_str, user_str, created_str
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT person_id, org_id, name, email, status, user_id, created_at
             FROM people WHERE person_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawPerson {
                person_id:  row.get(0)?,
                org_id:     row.get(1)?,
                name:       row.get(2)?,
                email:      row.get(3)?,
                status:     row.get(4)?,
                user_id:    row.get(5)?,
                created_at: row.get(6)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn list_people(&self, org_id: Uuid) -> Result<Vec<Person>> {
    let org_str = encode_uuid(org_id);

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT person_id, org_id, name, email, status, user_id, created_at
           FROM people WHERE org_id = ?1 ORDER BY name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![org_str], |row| {
            Ok(RawPerson {
              person_id:  row.get(0)?,
              org_id:     row.get(1)?,
              name:       row.get(2)?,
              email:      row.get(3)?,
              status:     row.get(4)?,
              user_id:    row.get(5)?,
              created_at: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn update_person(&self, person: Person) -> Result<()> {
    let id_str     = encode_uuid(person.person_id);
    let status_str = encode_person_status(person.status).to_owned();
    let user_str   = person.user_id.map(encode_uuid);
    let name       = person.name;
    let email      = person.email;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE people SET name = ?2, email = ?3, status = ?4, user_id = ?5
           WHERE person_id = ?1",
          rusqlite::params![id_str, name, email, status_str, user_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Catalogue ─────────────────────────────────────────────────────────────

  async fn insert_package(
    &self,
    package: SkillPackage,
    entry: ChangeEntry,
  ) -> Result<()> {
    let id_str     = encode_uuid(package.package_id);
    let status_str = encode_catalog_status(package.status).to_owned();
    let name       = package.name;
    let seq        = package.seq;
    let entry      = encode_entry(&entry)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO skill_packages (package_id, name, status, seq)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, status_str, seq],
        )?;
        insert_entry(&tx, &entry)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_packages(&self) -> Result<Vec<SkillPackage>> {
    let raws: Vec<RawPackage> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT package_id, name, status, seq FROM skill_packages
           ORDER BY seq, name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawPackage {
              package_id: row.get(0)?,
              name:       row.get(1)?,
              status:     row.get(2)?,
              seq:        row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPackage::into_package).collect()
  }

  async fn get_package(&self, id: Uuid) -> Result<Option<SkillPackage>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPackage> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT package_id, name, status, seq FROM skill_packages
             WHERE package_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawPackage {
                package_id: row.get(0)?,
                name:       row.get(1)?,
                status:     row.get(2)?,
                seq:        row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPackage::into_package).transpose()
  }

  async fn insert_group(
    &self,
    group: SkillGroup,
    entry: ChangeEntry,
  ) -> Result<()> {
    let id_str  = encode_uuid(group.group_id);
    let pkg_str = encode_uuid(group.package_id);
    let name    = group.name;
    let seq     = group.seq;
    let entry   = encode_entry(&entry)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO skill_groups (group_id, package_id, name, seq)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, pkg_str, name, seq],
        )?;
        insert_entry(&tx, &entry)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_group(&self, id: Uuid) -> Result<Option<SkillGroup>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawGroup> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT group_id, package_id, name, seq FROM skill_groups
             WHERE group_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawGroup {
                group_id:   row.get(0)?,
                package_id: row.get(1)?,
                name:       row.get(2)?,
                seq:        row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawGroup::into_group).transpose()
  }

  async fn insert_skill(
    &self,
    skill: Skill,
    entry: Option<ChangeEntry>,
  ) -> Result<()> {
    let id_str     = encode_uuid(skill.skill_id);
    let group_str  = skill.group_id.map(encode_uuid);
    let status_str = encode_catalog_status(skill.status).to_owned();
    let name       = skill.name;
    let seq        = skill.seq;
    let entry      = entry.as_ref().map(encode_entry).transpose()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO skills (skill_id, group_id, name, status, seq)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, group_str, name, status_str, seq],
        )?;
        if let Some(entry) = &entry {
          insert_entry(&tx, entry)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_skill(&self, id: Uuid) -> Result<Option<Skill>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSkill> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT skill_id, group_id, name, status, seq FROM skills
             WHERE skill_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawSkill {
                skill_id: row.get(0)?,
                group_id: row.get(1)?,
                name:     row.get(2)?,
                status:   row.get(3)?,
                seq:      row.get(4)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSkill::into_skill).transpose()
  }

  async fn list_skills(&self) -> Result<Vec<Skill>> {
    let raws: Vec<RawSkill> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT skill_id, group_id, name, status, seq FROM skills
           ORDER BY seq, name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSkill {
              skill_id: row.get(0)?,
              group_id: row.get(1)?,
              name:     row.get(2)?,
              status:   row.get(3)?,
              seq:      row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSkill::into_skill).collect()
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn insert_session(
    &self,
    session: Session,
    entry: ChangeEntry,
  ) -> Result<bool> {
    let id_str      = encode_uuid(session.session_id);
    let org_str     = encode_uuid(session.org_id);
    let date_str    = encode_date(session.date);
    let status_str  = session.status.as_str().to_owned();
    let created_str = encode_dt(session.created_at);
    let name        = session.name;
    let notes       = session.notes;
    let entry       = encode_entry(&entry)?;

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // OR IGNORE makes an id collision a no-op instead of a
        // constraint error, so the loser of a racing create sees
        // `false` rather than a database failure.
        let inserted = tx.execute(
          "INSERT OR IGNORE INTO sessions (session_id, org_id, name, notes, date, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, org_str, name, notes, date_str, status_str, created_str
          ],
        )? == 1;
        if inserted {
          insert_entry(&tx, &entry)?;
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;
    Ok(inserted)
  }

  async fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT session_id, org_id, name, notes, date, status, created_at
             FROM sessions WHERE session_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawSession {
                session_id: row.get(0)?,
                org_id:     row.get(1)?,
                name:       row.get(2)?,
                notes:      row.get(3)?,
                date:       row.get(4)?,
                status:     row.get(5)?,
                created_at: row.get(6)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn list_sessions(
    &self,
    org_id: Uuid,
    statuses: Vec<SessionStatus>,
  ) -> Result<Vec<Session>> {
    let org_str = encode_uuid(org_id);
    let status_strs: Vec<String> =
      statuses.iter().map(|s| s.as_str().to_owned()).collect();

    let raws: Vec<RawSession> = self
      .conn
      .call(move |conn| {
        // Build the status IN clause dynamically.
        let sql = if status_strs.is_empty() {
          "SELECT session_id, org_id, name, notes, date, status, created_at
           FROM sessions WHERE org_id = ?1
           ORDER BY date DESC, created_at DESC"
            .to_string()
        } else {
          let placeholders: Vec<String> = (0..status_strs.len())
            .map(|i| format!("?{}", i + 2))
            .collect();
          format!(
            "SELECT session_id, org_id, name, notes, date, status, created_at
             FROM sessions WHERE org_id = ?1 AND status IN ({})
             ORDER BY date DESC, created_at DESC",
            placeholders.join(", ")
          )
        };

        let params: Vec<&dyn rusqlite::ToSql> =
          std::iter::once(&org_str as &dyn rusqlite::ToSql)
            .chain(status_strs.iter().map(|s| s as &dyn rusqlite::ToSql))
            .collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params.as_slice(), |row| {
            Ok(RawSession {
              session_id: row.get(0)?,
              org_id:     row.get(1)?,
              name:       row.get(2)?,
              notes:      row.get(3)?,
              date:       row.get(4)?,
              status:     row.get(5)?,
              created_at: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSession::into_session).collect()
  }

  async fn update_session(
    &self,
    session: Session,
    entry: ChangeEntry,
  ) -> Result<()> {
    let id_str   = encode_uuid(session.session_id);
    let date_str = encode_date(session.date);
    let name     = session.name;
    let notes    = session.notes;
    let entry    = encode_entry(&entry)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE sessions SET name = ?2, notes = ?3, date = ?4
           WHERE session_id = ?1",
          rusqlite::params![id_str, name, notes, date_str],
        )?;
        insert_entry(&tx, &entry)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_session(&self, id: Uuid, entry: ChangeEntry) -> Result<()> {
    let id_str = encode_uuid(id);
    let entry  = encode_entry(&entry)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        insert_entry(&tx, &entry)?;
        // Roster rows and checks go with the session via ON DELETE CASCADE.
        tx.execute(
          "DELETE FROM sessions WHERE session_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Roster ────────────────────────────────────────────────────────────────

  async fn roster(&self, session_id: Uuid) -> Result<Roster> {
    let id_str = encode_uuid(session_id);

    let (assessors, assessees, skills): (Vec<String>, Vec<String>, Vec<String>) =
      self
        .conn
        .call(move |conn| {
          let members = |table: &str, column: &str| -> rusqlite::Result<Vec<String>> {
            let mut stmt = conn.prepare(&format!(
              "SELECT {column} FROM {table} WHERE session_id = ?1 ORDER BY rowid"
            ))?;
            stmt
              .query_map(rusqlite::params![id_str], |row| row.get(0))?
              .collect()
          };

          let assessors = members("session_assessors", "person_id")?;
          let assessees = members("session_assessees", "person_id")?;
          let skills    = members("session_skills", "skill_id")?;
          Ok((assessors, assessees, skills))
        })
        .await?;

    let decode_all = |ids: Vec<String>| -> Result<Vec<Uuid>> {
      ids.iter().map(|s| crate::encode::decode_uuid(s)).collect()
    };

    Ok(Roster {
      assessors: decode_all(assessors)?,
      assessees: decode_all(assessees)?,
      skills:    decode_all(skills)?,
    })
  }

  async fn add_member(
    &self,
    session_id: Uuid,
    role: RosterRole,
    member_id: Uuid,
    entry: ChangeEntry,
  ) -> Result<()> {
    let (table, column) = role_table(role);
    let session_str = encode_uuid(session_id);
    let member_str  = encode_uuid(member_id);
    let entry       = encode_entry(&entry)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          &format!(
            "INSERT INTO {table} (session_id, {column}) VALUES (?1, ?2)"
          ),
          rusqlite::params![session_str, member_str],
        )?;
        insert_entry(&tx, &entry)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove_member(
    &self,
    session_id: Uuid,
    role: RosterRole,
    member_id: Uuid,
    entry: ChangeEntry,
  ) -> Result<()> {
    let (table, column) = role_table(role);
    let session_str = encode_uuid(session_id);
    let member_str  = encode_uuid(member_id);
    let entry       = encode_entry(&entry)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          &format!(
            "DELETE FROM {table} WHERE session_id = ?1 AND {column} = ?2"
          ),
          rusqlite::params![session_str, member_str],
        )?;
        insert_entry(&tx, &entry)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn sync_members(
    &self,
    session_id: Uuid,
    role: RosterRole,
    additions: Vec<Uuid>,
    removals: Vec<Uuid>,
    entries: Vec<ChangeEntry>,
  ) -> Result<()> {
    let (table, column) = role_table(role);
    let session_str = encode_uuid(session_id);
    let add_strs: Vec<String> = additions.into_iter().map(encode_uuid).collect();
    let remove_strs: Vec<String> =
      removals.into_iter().map(encode_uuid).collect();
    let entries: Vec<EntryParams> =
      entries.iter().map(encode_entry).collect::<Result<_>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for id in &add_strs {
          tx.execute(
            &format!(
              "INSERT INTO {table} (session_id, {column}) VALUES (?1, ?2)"
            ),
            rusqlite::params![session_str, id],
          )?;
        }
        for id in &remove_strs {
          tx.execute(
            &format!(
              "DELETE FROM {table} WHERE session_id = ?1 AND {column} = ?2"
            ),
            rusqlite::params![session_str, id],
          )?;
        }
        for entry in &entries {
          insert_entry(&tx, entry)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Checks ────────────────────────────────────────────────────────────────

  async fn insert_check(
    &self,
    check: SkillCheck,
    entry: Option<ChangeEntry>,
  ) -> Result<()> {
    let id_str       = encode_uuid(check.check_id);
    let session_str  = check.session_id.map(encode_uuid);
    let skill_str    = encode_uuid(check.skill_id);
    let assessee_str = encode_uuid(check.assessee_id);
    let assessor_str = encode_uuid(check.assessor_id);
    let result_str   = check.result.as_str().to_owned();
    let passed       = check.passed;
    let notes        = check.notes;
    let date_str     = encode_date(check.date);
    let status_str   = check.status.as_str().to_owned();
    let recorded_str = encode_dt(check.recorded_at);
    let entry        = entry.as_ref().map(encode_entry).transpose()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO checks (
             check_id, session_id, skill_id, assessee_id, assessor_id,
             result, passed, notes, date, status, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            session_str,
            skill_str,
            assessee_str,
            assessor_str,
            result_str,
            passed,
            notes,
            date_str,
            status_str,
            recorded_str,
          ],
        )?;
        if let Some(entry) = &entry {
          insert_entry(&tx, entry)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_check(
    &self,
    check: SkillCheck,
    entry: Option<ChangeEntry>,
  ) -> Result<()> {
    let id_str       = encode_uuid(check.check_id);
    let assessor_str = encode_uuid(check.assessor_id);
    let result_str   = check.result.as_str().to_owned();
    let passed       = check.passed;
    let notes        = check.notes;
    let recorded_str = encode_dt(check.recorded_at);
    let entry        = entry.as_ref().map(encode_entry).transpose()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE checks SET result = ?2, passed = ?3, notes = ?4,
             assessor_id = ?5, recorded_at = ?6
           WHERE check_id = ?1",
          rusqlite::params![
            id_str, result_str, passed, notes, assessor_str, recorded_str
          ],
        )?;
        if let Some(entry) = &entry {
          insert_entry(&tx, entry)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_check(&self, id: Uuid) -> Result<Option<SkillCheck>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCheck> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT check_id, session_id, skill_id, assessee_id, assessor_id,
                    result, passed, notes, date, status, recorded_at
             FROM checks WHERE check_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawCheck {
                check_id:    row.get(0)?,
                session_id:  row.get(1)?,
                skill_id:    row.get(2)?,
                assessee_id: row.get(3)?,
                assessor_id: row.get(4)?,
                result:      row.get(5)?,
                passed:      row.get(6)?,
                notes:       row.get(7)?,
                date:        row.get(8)?,
                status:      row.get(9)?,
                recorded_at: row.get(10)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCheck::into_check).transpose()
  }

  async fn list_checks(&self, session_id: Uuid) -> Result<Vec<SkillCheck>> {
    let id_str = encode_uuid(session_id);

    let raws: Vec<RawCheck> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT check_id, session_id, skill_id, assessee_id, assessor_id,
                  result, passed, notes, date, status, recorded_at
           FROM checks WHERE session_id = ?1
           ORDER BY recorded_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawCheck {
              check_id:    row.get(0)?,
              session_id:  row.get(1)?,
              skill_id:    row.get(2)?,
              assessee_id: row.get(3)?,
              assessor_id: row.get(4)?,
              result:      row.get(5)?,
              passed:      row.get(6)?,
              notes:       row.get(7)?,
              date:        row.get(8)?,
              status:      row.get(9)?,
              recorded_at: row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCheck::into_check).collect()
  }

  async fn delete_check(&self, check_id: Uuid, entry: ChangeEntry) -> Result<()> {
    let id_str = encode_uuid(check_id);
    let entry  = encode_entry(&entry)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        insert_entry(&tx, &entry)?;
        tx.execute(
          "DELETE FROM checks WHERE check_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn apply_review(
    &self,
    session_id: Uuid,
    status_change: Option<(SessionStatus, ChangeEntry)>,
    include: Vec<Uuid>,
    exclude: Vec<Uuid>,
  ) -> Result<()> {
    let session_str = encode_uuid(session_id);
    let status_change = status_change
      .map(|(status, entry)| {
        Ok::<_, Error>((status.as_str().to_owned(), encode_entry(&entry)?))
      })
      .transpose()?;
    let include_strs: Vec<String> = include.into_iter().map(encode_uuid).collect();
    let exclude_strs: Vec<String> = exclude.into_iter().map(encode_uuid).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if let Some((status_str, entry)) = &status_change {
          tx.execute(
            "UPDATE sessions SET status = ?2 WHERE session_id = ?1",
            rusqlite::params![session_str, status_str],
          )?;
          insert_entry(&tx, entry)?;
        }

        for id in &include_strs {
          tx.execute(
            "UPDATE checks SET status = 'include'
             WHERE check_id = ?1 AND session_id = ?2",
            rusqlite::params![id, session_str],
          )?;
        }
        for id in &exclude_strs {
          tx.execute(
            "UPDATE checks SET status = 'exclude'
             WHERE check_id = ?1 AND session_id = ?2",
            rusqlite::params![id, session_str],
          )?;
        }

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Change log ────────────────────────────────────────────────────────────

  async fn session_changes(&self, session_id: Uuid) -> Result<Vec<ChangeEntry>> {
    self.changes_for("session_id", encode_uuid(session_id)).await
  }

  async fn package_changes(&self, package_id: Uuid) -> Result<Vec<ChangeEntry>> {
    self.changes_for("package_id", encode_uuid(package_id)).await
  }
}

impl SqliteStore {
  async fn changes_for(
    &self,
    scope_column: &'static str,
    scope_id: String,
  ) -> Result<Vec<ChangeEntry>> {
    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT entry_id, session_id, package_id, actor_id,
                  event, metadata, changes, recorded_at
           FROM change_log WHERE {scope_column} = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![scope_id], |row| {
            Ok(RawEntry {
              entry_id:    row.get(0)?,
              session_id:  row.get(1)?,
              package_id:  row.get(2)?,
              actor_id:    row.get(3)?,
              event:       row.get(4)?,
              metadata:    row.get(5)?,
              changes:     row.get(6)?,
              recorded_at: row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }
}
