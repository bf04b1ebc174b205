//! SQL schema for the Rollcall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Directory tables are written by external collaborators.
CREATE TABLE IF NOT EXISTS subjects (
    id          TEXT PRIMARY KEY,
    code        TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    teacher_id  TEXT,              -- NULL: visible to admins only
    department  TEXT,
    year        INTEGER,
    is_active   INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS students (
    id             TEXT PRIMARY KEY,
    enrollment_no  TEXT NOT NULL UNIQUE,
    name           TEXT NOT NULL,
    department     TEXT,
    year           INTEGER,
    face_encoding  BLOB,           -- reserved; never read by the ledger
    is_active      INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS enrollments (
    student_id  TEXT NOT NULL REFERENCES students(id),
    subject_id  TEXT NOT NULL REFERENCES subjects(id),
    is_active   INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (student_id, subject_id)
);

-- Sessions are never deleted; is_active is cleared instead.
CREATE TABLE IF NOT EXISTS attendance_sessions (
    id            TEXT PRIMARY KEY,
    subject_id    TEXT NOT NULL REFERENCES subjects(id),
    name          TEXT NOT NULL,
    date          TEXT NOT NULL,   -- YYYY-MM-DD
    start_time    TEXT,            -- HH:MM:SS
    end_time      TEXT,
    location      TEXT,
    session_type  TEXT NOT NULL DEFAULT 'lecture'
                  CHECK (session_type IN ('lecture', 'lab', 'tutorial', 'exam')),
    is_active     INTEGER NOT NULL DEFAULT 1,
    created_by    TEXT NOT NULL,
    created_at    TEXT NOT NULL    -- RFC 3339 UTC
);

-- One row per (session, student); writes replace the row in place.
CREATE TABLE IF NOT EXISTS attendance_records (
    session_id        TEXT NOT NULL REFERENCES attendance_sessions(id),
    student_id        TEXT NOT NULL REFERENCES students(id),
    status            TEXT NOT NULL DEFAULT 'present'
                      CHECK (status IN ('present', 'absent', 'late', 'excused')),
    method            TEXT NOT NULL DEFAULT 'manual'
                      CHECK (method IN ('manual', 'face_recognition', 'qr_code')),
    confidence_score  REAL,
    marked_by         TEXT NOT NULL,
    marked_at         TEXT NOT NULL,
    notes             TEXT,
    PRIMARY KEY (session_id, student_id)
);

CREATE INDEX IF NOT EXISTS sessions_subject_idx ON attendance_sessions(subject_id);
CREATE INDEX IF NOT EXISTS sessions_date_idx    ON attendance_sessions(date);
CREATE INDEX IF NOT EXISTS records_student_idx  ON attendance_records(student_id);
CREATE INDEX IF NOT EXISTS enrollments_subject_idx ON enrollments(subject_id);

PRAGMA user_version = 1;
";
