//! Dashboard overview over a trailing window.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use super::{
  metrics::{Bucket, GroupBy, Tally},
  trends,
};
use crate::store::Snapshot;

/// Students under this percentage are flagged.
pub const LOW_ATTENDANCE_THRESHOLD: f64 = 75.0;
/// At most this many flagged students are returned.
pub const LOW_ATTENDANCE_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
  pub total_students:          u64,
  pub total_subjects:          u64,
  pub total_sessions:          u64,
  pub attendance_overview:     Overview,
  pub daily_trend:             Vec<Bucket>,
  pub subject_wise:            Vec<SubjectAttendance>,
  pub low_attendance_students: Vec<StudentAttendance>,
}

/// Status counts over every record in the window. The percentage uses the
/// record count as denominator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
  pub present:    u64,
  pub absent:     u64,
  pub late:       u64,
  pub total:      u64,
  pub percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAttendance {
  pub subject_id:            Uuid,
  pub subject_name:          String,
  pub subject_code:          String,
  pub total_sessions:        u64,
  pub total_records:         u64,
  pub present_count:         u64,
  pub attendance_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentAttendance {
  pub student_id:            Uuid,
  pub student_name:          String,
  pub enrollment_no:         String,
  pub total_records:         u64,
  pub present_count:         u64,
  pub attendance_percentage: Option<f64>,
}

pub fn dashboard(snapshot: &Snapshot) -> Dashboard {
  let overall: Tally = snapshot.records.iter().map(|r| r.status).collect();

  Dashboard {
    total_students:          enrolled_students(snapshot).len() as u64,
    total_subjects:          snapshot.subjects.iter().filter(|s| s.is_active).count() as u64,
    total_sessions:          snapshot.sessions.len() as u64,
    attendance_overview:     Overview {
      present:    overall.present,
      absent:     overall.absent,
      late:       overall.late,
      total:      overall.total(),
      percentage: overall.record_percentage(),
    },
    daily_trend:             trends::buckets(snapshot, GroupBy::Day),
    subject_wise:            subject_wise(snapshot),
    low_attendance_students: low_attendance(snapshot),
  }
}

/// Active students holding an active enrollment, mapped to the subjects they
/// are enrolled in.
fn enrolled_students(snapshot: &Snapshot) -> HashMap<Uuid, HashSet<Uuid>> {
  let mut enrolled: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
  for enrollment in snapshot.enrollments.iter().filter(|e| e.is_active) {
    let student_active = snapshot.student(enrollment.student_id).is_some_and(|s| s.is_active);
    if student_active && snapshot.subject(enrollment.subject_id).is_some() {
      enrolled.entry(enrollment.student_id).or_default().insert(enrollment.subject_id);
    }
  }
  enrolled
}

/// Active subjects, best attended first; subjects without records last.
fn subject_wise(snapshot: &Snapshot) -> Vec<SubjectAttendance> {
  let subject_of: HashMap<Uuid, Uuid> =
    snapshot.sessions.iter().map(|s| (s.id, s.subject_id)).collect();

  let mut sessions: HashMap<Uuid, u64> = HashMap::new();
  for session in &snapshot.sessions {
    *sessions.entry(session.subject_id).or_default() += 1;
  }
  let mut tallies: HashMap<Uuid, Tally> = HashMap::new();
  for record in &snapshot.records {
    if let Some(subject_id) = subject_of.get(&record.session_id) {
      tallies.entry(*subject_id).or_default().add(record.status);
    }
  }

  let mut rows: Vec<SubjectAttendance> = snapshot
    .subjects
    .iter()
    .filter(|s| s.is_active)
    .map(|subject| {
      let tally = tallies.get(&subject.id).copied().unwrap_or_default();
      SubjectAttendance {
        subject_id:            subject.id,
        subject_name:          subject.name.clone(),
        subject_code:          subject.code.clone(),
        total_sessions:        sessions.get(&subject.id).copied().unwrap_or(0),
        total_records:         tally.total(),
        present_count:         tally.present,
        attendance_percentage: tally.record_percentage(),
      }
    })
    .collect();

  rows.sort_by(|a, b| {
    let by_pct = match (a.attendance_percentage, b.attendance_percentage) {
      (Some(x), Some(y)) => y.total_cmp(&x),
      (Some(_), None) => std::cmp::Ordering::Less,
      (None, Some(_)) => std::cmp::Ordering::Greater,
      (None, None) => std::cmp::Ordering::Equal,
    };
    by_pct.then_with(|| a.subject_name.cmp(&b.subject_name))
  });
  rows
}

/// Students with at least one record and a percentage under the threshold,
/// lowest first. Only records from subjects the student is enrolled in count.
fn low_attendance(snapshot: &Snapshot) -> Vec<StudentAttendance> {
  let enrolled = enrolled_students(snapshot);
  let subject_of: HashMap<Uuid, Uuid> =
    snapshot.sessions.iter().map(|s| (s.id, s.subject_id)).collect();

  let mut tallies: HashMap<Uuid, Tally> = HashMap::new();
  for record in &snapshot.records {
    let Some(subjects) = enrolled.get(&record.student_id) else { continue };
    if subject_of.get(&record.session_id).is_some_and(|s| subjects.contains(s)) {
      tallies.entry(record.student_id).or_default().add(record.status);
    }
  }

  let mut rows: Vec<StudentAttendance> = tallies
    .into_iter()
    .filter_map(|(student_id, tally)| {
      let pct = tally.record_percentage()?;
      if pct >= LOW_ATTENDANCE_THRESHOLD {
        return None;
      }
      let student = snapshot.student(student_id)?;
      Some(StudentAttendance {
        student_id,
        student_name: student.name.clone(),
        enrollment_no: student.enrollment_no.clone(),
        total_records: tally.total(),
        present_count: tally.present,
        attendance_percentage: Some(pct),
      })
    })
    .collect();

  rows.sort_by(|a, b| {
    let pa = a.attendance_percentage.unwrap_or_default();
    let pb = b.attendance_percentage.unwrap_or_default();
    pa.total_cmp(&pb).then_with(|| a.student_name.cmp(&b.student_name))
  });
  rows.truncate(LOW_ATTENDANCE_LIMIT);
  rows
}
