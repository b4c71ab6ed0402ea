//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`, enums as their closed-vocabulary strings, and structured
//! fields (metadata, field deltas) as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use muster_core::{
  catalog::{CatalogStatus, Skill, SkillGroup, SkillPackage},
  changelog::{ChangeEntry, EventKind},
  check::{CheckStatus, CompetenceLevel, SkillCheck},
  person::{Person, PersonStatus},
  session::{Session, SessionStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_uuid_opt(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_session_status(s: &str) -> Result<SessionStatus> {
  s.parse().map_err(Error::Decode)
}

pub fn decode_check_status(s: &str) -> Result<CheckStatus> {
  s.parse().map_err(Error::Decode)
}

pub fn decode_level(s: &str) -> Result<CompetenceLevel> {
  s.parse().map_err(Error::Decode)
}

pub fn decode_event(s: &str) -> Result<EventKind> {
  s.parse().map_err(Error::Decode)
}

pub fn encode_person_status(s: PersonStatus) -> &'static str {
  match s {
    PersonStatus::Active => "active",
    PersonStatus::Inactive => "inactive",
  }
}

pub fn decode_person_status(s: &str) -> Result<PersonStatus> {
  match s {
    "active" => Ok(PersonStatus::Active),
    "inactive" => Ok(PersonStatus::Inactive),
    other => Err(Error::Decode(format!("unknown person status: {other:?}"))),
  }
}

pub fn encode_catalog_status(s: CatalogStatus) -> &'static str {
  match s {
    CatalogStatus::Active => "active",
    CatalogStatus::Retired => "retired",
  }
}

pub fn decode_catalog_status(s: &str) -> Result<CatalogStatus> {
  match s {
    "active" => Ok(CatalogStatus::Active),
    "retired" => Ok(CatalogStatus::Retired),
    other => Err(Error::Decode(format!("unknown catalog status: {other:?}"))),
  }
}

// ─── Raw row structs ─────────────────────────────────────────────────────────

pub struct RawPerson {
  pub person_id:  String,
  pub org_id:     String,
  pub name:       String,
  pub email:      String,
  pub status:     String,
  pub user_id:    Option<String>,
  pub created_at: String,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:  decode_uuid(&self.person_id)?,
      org_id:     decode_uuid(&self.org_id)?,
      name:       self.name,
      email:      self.email,
      status:     decode_person_status(&self.status)?,
      user_id:    decode_uuid_opt(self.user_id.as_deref())?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawSession {
  pub session_id: String,
  pub org_id:     String,
  pub name:       String,
  pub notes:      Option<String>,
  pub date:       String,
  pub status:     String,
  pub created_at: String,
}

impl RawSession {
  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      session_id: decode_uuid(&self.session_id)?,
      org_id:     decode_uuid(&self.org_id)?,
      name:       self.name,
      notes:      self.notes,
      date:       decode_date(&self.date)?,
      status:     decode_session_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawCheck {
  pub check_id:    String,
  pub session_id:  Option<String>,
  pub skill_id:    String,
  pub assessee_id: String,
  pub assessor_id: String,
  pub result:      String,
  pub passed:      bool,
  pub notes:       Option<String>,
  pub date:        String,
  pub status:      String,
  pub recorded_at: String,
}

impl RawCheck {
  pub fn into_check(self) -> Result<SkillCheck> {
    Ok(SkillCheck {
      check_id:    decode_uuid(&self.check_id)?,
      session_id:  decode_uuid_opt(self.session_id.as_deref())?,
      skill_id:    decode_uuid(&self.skill_id)?,
      assessee_id: decode_uuid(&self.assessee_id)?,
      assessor_id: decode_uuid(&self.assessor_id)?,
      result:      decode_level(&self.result)?,
      passed:      self.passed,
      notes:       self.notes,
      date:        decode_date(&self.date)?,
      status:      decode_check_status(&self.status)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub struct RawEntry {
  pub entry_id:    String,
  pub session_id:  Option<String>,
  pub package_id:  Option<String>,
  pub actor_id:    String,
  pub event:       String,
  pub metadata:    String,
  pub changes:     String,
  pub recorded_at: String,
}

impl RawEntry {
  pub fn into_entry(self) -> Result<ChangeEntry> {
    Ok(ChangeEntry {
      entry_id:    decode_uuid(&self.entry_id)?,
      session_id:  decode_uuid_opt(self.session_id.as_deref())?,
      package_id:  decode_uuid_opt(self.package_id.as_deref())?,
      actor_id:    decode_uuid(&self.actor_id)?,
      event:       decode_event(&self.event)?,
      metadata:    serde_json::from_str(&self.metadata)?,
      changes:     serde_json::from_str(&self.changes)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub struct RawSkill {
  pub skill_id: String,
  pub group_id: Option<String>,
  pub name:     String,
  pub status:   String,
  pub seq:      i64,
}

impl RawSkill {
  pub fn into_skill(self) -> Result<Skill> {
    Ok(Skill {
      skill_id: decode_uuid(&self.skill_id)?,
      group_id: decode_uuid_opt(self.group_id.as_deref())?,
      name:     self.name,
      status:   decode_catalog_status(&self.status)?,
      seq:      self.seq,
    })
  }
}

pub struct RawPackage {
  pub package_id: String,
  pub name:       String,
  pub status:     String,
  pub seq:        i64,
}

impl RawPackage {
  pub fn into_package(self) -> Result<SkillPackage> {
    Ok(SkillPackage {
      package_id: decode_uuid(&self.package_id)?,
      name:       self.name,
      status:     decode_catalog_status(&self.status)?,
      seq:        self.seq,
    })
  }
}

pub struct RawGroup {
  pub group_id:   String,
  pub package_id: String,
  pub name:       String,
  pub seq:        i64,
}

impl RawGroup {
  pub fn into_group(self) -> Result<SkillGroup> {
    Ok(SkillGroup {
      group_id:   decode_uuid(&self.group_id)?,
      package_id: decode_uuid(&self.package_id)?,
      name:       self.name,
      seq:        self.seq,
    })
  }
}

// ─── Change entries (write side) ─────────────────────────────────────────────

/// A pre-serialised change entry, built outside the connection closure so
/// the closure only touches SQL.
pub struct EntryParams {
  pub entry_id:    String,
  pub session_id:  Option<String>,
  pub package_id:  Option<String>,
  pub actor_id:    String,
  pub event:       String,
  pub metadata:    String,
  pub changes:     String,
  pub recorded_at: String,
}

pub fn encode_entry(entry: &ChangeEntry) -> Result<EntryParams> {
  Ok(EntryParams {
    entry_id:    encode_uuid(entry.entry_id),
    session_id:  entry.session_id.map(encode_uuid),
    package_id:  entry.package_id.map(encode_uuid),
    actor_id:    encode_uuid(entry.actor_id),
    event:       entry.event.as_str().to_owned(),
    metadata:    serde_json::to_string(&entry.metadata)?,
    changes:     serde_json::to_string(&entry.changes)?,
    recorded_at: encode_dt(entry.recorded_at),
  })
}
