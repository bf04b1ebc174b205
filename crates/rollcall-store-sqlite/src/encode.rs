//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, dates as `YYYY-MM-DD` and
//! times as `HH:MM:SS`, so all three sort correctly as text. UUIDs are stored
//! as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rollcall_core::{
  directory::{Enrollment, Student, Subject},
  record::{MarkMethod, Record, RecordStatus, RecordView},
  session::{Session, SessionType},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Dates and times ─────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

/// Accepts `HH:MM:SS` and, for rows written by other tools, `HH:MM`.
pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S")
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_session_type(t: SessionType) -> &'static str {
  match t {
    SessionType::Lecture => "lecture",
    SessionType::Lab => "lab",
    SessionType::Tutorial => "tutorial",
    SessionType::Exam => "exam",
  }
}

pub fn decode_session_type(s: &str) -> Result<SessionType> {
  match s {
    "lecture" => Ok(SessionType::Lecture),
    "lab" => Ok(SessionType::Lab),
    "tutorial" => Ok(SessionType::Tutorial),
    "exam" => Ok(SessionType::Exam),
    other => Err(unknown("session_type", other)),
  }
}

pub fn encode_status(s: RecordStatus) -> &'static str {
  match s {
    RecordStatus::Present => "present",
    RecordStatus::Absent => "absent",
    RecordStatus::Late => "late",
    RecordStatus::Excused => "excused",
  }
}

pub fn decode_status(s: &str) -> Result<RecordStatus> {
  match s {
    "present" => Ok(RecordStatus::Present),
    "absent" => Ok(RecordStatus::Absent),
    "late" => Ok(RecordStatus::Late),
    "excused" => Ok(RecordStatus::Excused),
    other => Err(unknown("status", other)),
  }
}

pub fn encode_method(m: MarkMethod) -> &'static str {
  match m {
    MarkMethod::Manual => "manual",
    MarkMethod::FaceRecognition => "face_recognition",
    MarkMethod::QrCode => "qr_code",
  }
}

pub fn decode_method(s: &str) -> Result<MarkMethod> {
  match s {
    "manual" => Ok(MarkMethod::Manual),
    "face_recognition" => Ok(MarkMethod::FaceRecognition),
    "qr_code" => Ok(MarkMethod::QrCode),
    other => Err(unknown("method", other)),
  }
}

fn unknown(column: &'static str, value: &str) -> Error {
  Error::UnknownVariant { column, value: value.to_owned() }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSubject::from_row`], for a `subjects s` alias.
pub const SUBJECT_COLUMNS: &str =
  "s.id, s.code, s.name, s.teacher_id, s.department, s.year, s.is_active";

/// Raw values read directly from a `subjects` row.
pub struct RawSubject {
  pub id:         String,
  pub code:       String,
  pub name:       String,
  pub teacher_id: Option<String>,
  pub department: Option<String>,
  pub year:       Option<i64>,
  pub is_active:  bool,
}

impl RawSubject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      code:       row.get(1)?,
      name:       row.get(2)?,
      teacher_id: row.get(3)?,
      department: row.get(4)?,
      year:       row.get(5)?,
      is_active:  row.get(6)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      id:         decode_uuid(&self.id)?,
      code:       self.code,
      name:       self.name,
      teacher_id: self.teacher_id.as_deref().map(decode_uuid).transpose()?,
      department: self.department,
      year:       self.year,
      is_active:  self.is_active,
    })
  }
}

/// Column list matching [`RawStudent::from_row`], for a `students st` alias.
pub const STUDENT_COLUMNS: &str =
  "st.id, st.enrollment_no, st.name, st.department, st.year, st.is_active";

pub struct RawStudent {
  pub id:            String,
  pub enrollment_no: String,
  pub name:          String,
  pub department:    Option<String>,
  pub year:          Option<i64>,
  pub is_active:     bool,
}

impl RawStudent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      enrollment_no: row.get(1)?,
      name:          row.get(2)?,
      department:    row.get(3)?,
      year:          row.get(4)?,
      is_active:     row.get(5)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      id:            decode_uuid(&self.id)?,
      enrollment_no: self.enrollment_no,
      name:          self.name,
      department:    self.department,
      year:          self.year,
      is_active:     self.is_active,
    })
  }
}

/// Column list matching [`RawEnrollment::from_row`], for an `enrollments e`
/// alias.
pub const ENROLLMENT_COLUMNS: &str = "e.student_id, e.subject_id, e.is_active";

pub struct RawEnrollment {
  pub student_id: String,
  pub subject_id: String,
  pub is_active:  bool,
}

impl RawEnrollment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { student_id: row.get(0)?, subject_id: row.get(1)?, is_active: row.get(2)? })
  }

  pub fn into_enrollment(self) -> Result<Enrollment> {
    Ok(Enrollment {
      student_id: decode_uuid(&self.student_id)?,
      subject_id: decode_uuid(&self.subject_id)?,
      is_active:  self.is_active,
    })
  }
}

/// Column list matching [`RawSession::from_row`], for an
/// `attendance_sessions ats` alias.
pub const SESSION_COLUMNS: &str = "ats.id, ats.subject_id, ats.name, ats.date, ats.start_time, \
                                   ats.end_time, ats.location, ats.session_type, ats.is_active, \
                                   ats.created_by, ats.created_at";

/// Raw values read directly from an `attendance_sessions` row.
pub struct RawSession {
  pub id:           String,
  pub subject_id:   String,
  pub name:         String,
  pub date:         String,
  pub start_time:   Option<String>,
  pub end_time:     Option<String>,
  pub location:     Option<String>,
  pub session_type: String,
  pub is_active:    bool,
  pub created_by:   String,
  pub created_at:   String,
}

impl RawSession {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      subject_id:   row.get(1)?,
      name:         row.get(2)?,
      date:         row.get(3)?,
      start_time:   row.get(4)?,
      end_time:     row.get(5)?,
      location:     row.get(6)?,
      session_type: row.get(7)?,
      is_active:    row.get(8)?,
      created_by:   row.get(9)?,
      created_at:   row.get(10)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      id:           decode_uuid(&self.id)?,
      subject_id:   decode_uuid(&self.subject_id)?,
      name:         self.name,
      date:         decode_date(&self.date)?,
      start_time:   self.start_time.as_deref().map(decode_time).transpose()?,
      end_time:     self.end_time.as_deref().map(decode_time).transpose()?,
      location:     self.location,
      session_type: decode_session_type(&self.session_type)?,
      is_active:    self.is_active,
      created_by:   decode_uuid(&self.created_by)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawRecord::from_row`], for an
/// `attendance_records ar` alias.
pub const RECORD_COLUMNS: &str = "ar.session_id, ar.student_id, ar.status, ar.method, \
                                  ar.confidence_score, ar.marked_by, ar.marked_at, ar.notes";

/// Raw values read directly from an `attendance_records` row.
pub struct RawRecord {
  pub session_id:       String,
  pub student_id:       String,
  pub status:           String,
  pub method:           String,
  pub confidence_score: Option<f64>,
  pub marked_by:        String,
  pub marked_at:        String,
  pub notes:            Option<String>,
}

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id:       row.get(0)?,
      student_id:       row.get(1)?,
      status:           row.get(2)?,
      method:           row.get(3)?,
      confidence_score: row.get(4)?,
      marked_by:        row.get(5)?,
      marked_at:        row.get(6)?,
      notes:            row.get(7)?,
    })
  }

  pub fn into_record(self) -> Result<Record> {
    Ok(Record {
      session_id:       decode_uuid(&self.session_id)?,
      student_id:       decode_uuid(&self.student_id)?,
      status:           decode_status(&self.status)?,
      method:           decode_method(&self.method)?,
      confidence_score: self.confidence_score,
      marked_by:        decode_uuid(&self.marked_by)?,
      marked_at:        decode_dt(&self.marked_at)?,
      notes:            self.notes,
    })
  }
}

/// A record row followed by `st.name, st.enrollment_no`.
pub struct RawRecordView {
  pub record:        RawRecord,
  pub student_name:  String,
  pub enrollment_no: String,
}

impl RawRecordView {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record:        RawRecord::from_row(row)?,
      student_name:  row.get(8)?,
      enrollment_no: row.get(9)?,
    })
  }

  pub fn into_view(self) -> Result<RecordView> {
    Ok(RecordView {
      record:        self.record.into_record()?,
      student_name:  self.student_name,
      enrollment_no: self.enrollment_no,
    })
  }
}
