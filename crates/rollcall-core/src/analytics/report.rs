//! Date-ranged attendance reports, per enrollment or per record.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metrics::{Tally, percentage};
use crate::{
  directory::Student,
  record::{MarkMethod, RecordStatus},
  session::SessionType,
  store::Snapshot,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
  #[default]
  Summary,
  Detailed,
}

/// Parameters for [`crate::AnalyticsAggregator::report`]. Both dates are
/// inclusive.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportQuery {
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  #[serde(default)]
  pub format:     ReportFormat,
  pub subject_id: Option<Uuid>,
  pub student_id: Option<Uuid>,
  pub department: Option<String>,
  pub year:       Option<i64>,
}

impl ReportQuery {
  pub fn new(start_date: NaiveDate, end_date: NaiveDate, format: ReportFormat) -> Self {
    Self {
      start_date,
      end_date,
      format,
      subject_id: None,
      student_id: None,
      department: None,
      year: None,
    }
  }

  fn admits(&self, student: &Student) -> bool {
    self.student_id.is_none_or(|id| id == student.id)
      && self.department.as_ref().is_none_or(|d| student.department.as_ref() == Some(d))
      && self.year.is_none_or(|y| student.year == Some(y))
  }
}

/// One enrolled student in one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
  pub student_id:            Uuid,
  pub student_name:          String,
  pub enrollment_no:         String,
  pub department:            Option<String>,
  pub year:                  Option<i64>,
  pub subject_id:            Uuid,
  pub subject_name:          String,
  pub subject_code:          String,
  pub total_sessions:        u64,
  pub attended_sessions:     u64,
  pub present_count:         u64,
  pub absent_count:          u64,
  pub late_count:            u64,
  /// Present records over the subject's sessions in range, so unmarked
  /// sessions count against the student.
  pub attendance_percentage: Option<f64>,
}

/// One marked record with its session, subject and student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedRow {
  pub session_id:    Uuid,
  pub date:          NaiveDate,
  pub session_name:  String,
  pub session_type:  SessionType,
  pub subject_name:  String,
  pub subject_code:  String,
  pub student_id:    Uuid,
  pub student_name:  String,
  pub enrollment_no: String,
  pub department:    Option<String>,
  pub year:          Option<i64>,
  pub status:        RecordStatus,
  pub method:        MarkMethod,
  pub marked_by:     Uuid,
  pub marked_at:     DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportData {
  Summary(Vec<SummaryRow>),
  Detailed(Vec<DetailedRow>),
}

impl ReportData {
  pub fn len(&self) -> usize {
    match self {
      Self::Summary(rows) => rows.len(),
      Self::Detailed(rows) => rows.len(),
    }
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPeriod {
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
  pub period:        ReportPeriod,
  pub format:        ReportFormat,
  pub total_records: usize,
  pub data:          ReportData,
}

/// Build a report from a snapshot already restricted to the query's date
/// range, scope and subject.
pub fn report(snapshot: &Snapshot, query: &ReportQuery) -> Report {
  let data = match query.format {
    ReportFormat::Summary => ReportData::Summary(summary(snapshot, query)),
    ReportFormat::Detailed => ReportData::Detailed(detailed(snapshot, query)),
  };
  Report {
    period: ReportPeriod { start_date: query.start_date, end_date: query.end_date },
    format: query.format,
    total_records: data.len(),
    data,
  }
}

fn summary(snapshot: &Snapshot, query: &ReportQuery) -> Vec<SummaryRow> {
  let mut sessions_of: HashMap<Uuid, u64> = HashMap::new();
  let mut subject_of: HashMap<Uuid, Uuid> = HashMap::new();
  for session in &snapshot.sessions {
    *sessions_of.entry(session.subject_id).or_default() += 1;
    subject_of.insert(session.id, session.subject_id);
  }

  let mut tallies: HashMap<(Uuid, Uuid), Tally> = HashMap::new();
  for record in &snapshot.records {
    if let Some(subject_id) = subject_of.get(&record.session_id) {
      tallies.entry((record.student_id, *subject_id)).or_default().add(record.status);
    }
  }

  let mut rows: Vec<SummaryRow> = snapshot
    .enrollments
    .iter()
    .filter(|e| e.is_active)
    .filter(|e| query.subject_id.is_none_or(|id| id == e.subject_id))
    .filter_map(|e| {
      let student = snapshot.student(e.student_id).filter(|s| s.is_active && query.admits(s))?;
      let subject = snapshot.subject(e.subject_id)?;
      let total_sessions = sessions_of.get(&subject.id).copied().unwrap_or(0);
      let tally = tallies.get(&(student.id, subject.id)).copied().unwrap_or_default();
      Some(SummaryRow {
        student_id: student.id,
        student_name: student.name.clone(),
        enrollment_no: student.enrollment_no.clone(),
        department: student.department.clone(),
        year: student.year,
        subject_id: subject.id,
        subject_name: subject.name.clone(),
        subject_code: subject.code.clone(),
        total_sessions,
        attended_sessions: tally.total(),
        present_count: tally.present,
        absent_count: tally.absent,
        late_count: tally.late,
        attendance_percentage: percentage(tally.present, total_sessions),
      })
    })
    .collect();

  rows.sort_by(|a, b| {
    a.student_name
      .cmp(&b.student_name)
      .then_with(|| a.subject_name.cmp(&b.subject_name))
      .then_with(|| a.student_id.cmp(&b.student_id))
  });
  rows
}

fn detailed(snapshot: &Snapshot, query: &ReportQuery) -> Vec<DetailedRow> {
  let sessions: HashMap<Uuid, _> = snapshot.sessions.iter().map(|s| (s.id, s)).collect();

  let mut rows: Vec<DetailedRow> = snapshot
    .records
    .iter()
    .filter_map(|record| {
      let session = sessions.get(&record.session_id)?;
      let subject = snapshot.subject(session.subject_id)?;
      let student = snapshot.student(record.student_id).filter(|s| query.admits(s))?;
      Some(DetailedRow {
        session_id:    session.id,
        date:          session.date,
        session_name:  session.name.clone(),
        session_type:  session.session_type,
        subject_name:  subject.name.clone(),
        subject_code:  subject.code.clone(),
        student_id:    student.id,
        student_name:  student.name.clone(),
        enrollment_no: student.enrollment_no.clone(),
        department:    student.department.clone(),
        year:          student.year,
        status:        record.status,
        method:        record.method,
        marked_by:     record.marked_by,
        marked_at:     record.marked_at,
      })
    })
    .collect();

  rows.sort_by(|a, b| {
    b.date
      .cmp(&a.date)
      .then_with(|| a.session_name.cmp(&b.session_name))
      .then_with(|| a.student_name.cmp(&b.student_name))
  });
  rows
}
