//! SQL schema for the Muster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated
//! on the `user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- People are soft-deleted via status; rows referenced by historical
-- checks are never removed.
CREATE TABLE IF NOT EXISTS people (
    person_id  TEXT PRIMARY KEY,
    org_id     TEXT NOT NULL,
    name       TEXT NOT NULL,
    email      TEXT NOT NULL,
    status     TEXT NOT NULL,   -- 'active' | 'inactive'
    user_id    TEXT,            -- external account link
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS skill_packages (
    package_id TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    status     TEXT NOT NULL,   -- 'active' | 'retired'
    seq        INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS skill_groups (
    group_id   TEXT PRIMARY KEY,
    package_id TEXT NOT NULL REFERENCES skill_packages(package_id),
    name       TEXT NOT NULL,
    seq        INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS skills (
    skill_id TEXT PRIMARY KEY,
    group_id TEXT REFERENCES skill_groups(group_id),
    name     TEXT NOT NULL,
    status   TEXT NOT NULL,     -- 'active' | 'retired'
    seq      INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS sessions (
    session_id TEXT PRIMARY KEY,
    org_id     TEXT NOT NULL,
    name       TEXT NOT NULL,
    notes      TEXT,
    date       TEXT NOT NULL,   -- ISO calendar date
    status     TEXT NOT NULL,   -- 'draft' | 'include' | 'exclude'
    created_at TEXT NOT NULL
);

-- Roster membership: plain join tables, one per role.
CREATE TABLE IF NOT EXISTS session_assessors (
    session_id TEXT NOT NULL REFERENCES sessions(session_id) ON DELETE CASCADE,
    person_id  TEXT NOT NULL REFERENCES people(person_id),
    PRIMARY KEY (session_id, person_id)
);

CREATE TABLE IF NOT EXISTS session_assessees (
    session_id TEXT NOT NULL REFERENCES sessions(session_id) ON DELETE CASCADE,
    person_id  TEXT NOT NULL REFERENCES people(person_id),
    PRIMARY KEY (session_id, person_id)
);

CREATE TABLE IF NOT EXISTS session_skills (
    session_id TEXT NOT NULL REFERENCES sessions(session_id) ON DELETE CASCADE,
    skill_id   TEXT NOT NULL REFERENCES skills(skill_id),
    PRIMARY KEY (session_id, skill_id)
);

CREATE TABLE IF NOT EXISTS checks (
    check_id    TEXT PRIMARY KEY,
    session_id  TEXT REFERENCES sessions(session_id) ON DELETE CASCADE,
    skill_id    TEXT NOT NULL REFERENCES skills(skill_id),
    assessee_id TEXT NOT NULL REFERENCES people(person_id),
    assessor_id TEXT NOT NULL REFERENCES people(person_id),
    result      TEXT NOT NULL,    -- competence level
    passed      INTEGER NOT NULL, -- derived from result
    notes       TEXT,
    date        TEXT NOT NULL,
    status      TEXT NOT NULL,    -- 'draft' | 'include' | 'exclude'
    recorded_at TEXT NOT NULL
);

-- The change log is strictly append-only. No UPDATE or DELETE is ever
-- issued against this table, and it carries no foreign keys so entries
-- outlive the rows they describe.
CREATE TABLE IF NOT EXISTS change_log (
    entry_id    TEXT PRIMARY KEY,
    session_id  TEXT,
    package_id  TEXT,
    actor_id    TEXT NOT NULL,
    event       TEXT NOT NULL,
    metadata    TEXT NOT NULL DEFAULT '{}',  -- JSON object of ids
    changes     TEXT NOT NULL DEFAULT '[]',  -- JSON field delta
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS sessions_org_idx       ON sessions(org_id);
CREATE INDEX IF NOT EXISTS people_org_idx         ON people(org_id);
CREATE INDEX IF NOT EXISTS checks_session_idx     ON checks(session_id);
CREATE INDEX IF NOT EXISTS change_log_session_idx ON change_log(session_id);
CREATE INDEX IF NOT EXISTS change_log_package_idx ON change_log(package_id);

PRAGMA user_version = 1;
";
