//! Test doubles and fixtures shared by the unit tests of this crate.

use std::{collections::BTreeMap, sync::Mutex};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  directory::{Enrollment, Student, Subject},
  error::RecordFailure,
  event::{Event, Notifier},
  filter::SessionFilter,
  record::{BatchOutcome, MarkRecord, Record, RecordStatus, RecordView, RecordWrite},
  session::{Session, SessionType},
  store::{AttendanceStore, Snapshot},
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, d).unwrap() }

pub fn subject_owned_by(teacher_id: Option<Uuid>) -> Subject {
  let id = Uuid::new_v4();
  Subject {
    id,
    code: format!("S-{}", &id.simple().to_string()[..6]),
    name: format!("Subject {id}"),
    teacher_id,
    department: None,
    year: None,
    is_active: true,
  }
}

pub fn named_subject(name: &str) -> Subject {
  Subject { name: name.to_owned(), code: name.to_uppercase(), ..subject_owned_by(None) }
}

pub fn session_on(subject_id: Uuid, date: NaiveDate) -> Session {
  Session {
    id: Uuid::new_v4(),
    subject_id,
    name: format!("Session {date}"),
    date,
    start_time: None,
    end_time: None,
    location: None,
    session_type: SessionType::Lecture,
    is_active: true,
    created_by: Uuid::new_v4(),
    created_at: Utc::now(),
  }
}

pub fn student_named(name: &str) -> Student {
  Student {
    id: Uuid::new_v4(),
    enrollment_no: format!("E-{name}"),
    name: name.to_owned(),
    department: None,
    year: None,
    is_active: true,
  }
}

pub fn record(session: &Session, student: &Student, status: RecordStatus) -> Record {
  Record {
    session_id: session.id,
    student_id: student.id,
    status,
    method: Default::default(),
    confidence_score: None,
    marked_by: Uuid::new_v4(),
    marked_at: Utc::now(),
    notes: None,
  }
}

pub fn enrolled(student: &Student, subject: &Subject) -> Enrollment {
  Enrollment { student_id: student.id, subject_id: subject.id, is_active: true }
}

// ─── Notifier ────────────────────────────────────────────────────────────────

/// Remembers every published event.
#[derive(Default)]
pub struct RecordingNotifier {
  events: Mutex<Vec<Event>>,
}

impl RecordingNotifier {
  pub fn events(&self) -> Vec<Event> { self.events.lock().unwrap().clone() }
}

impl Notifier for RecordingNotifier {
  fn publish(&self, event: Event) { self.events.lock().unwrap().push(event); }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct State {
  subjects:    Vec<Subject>,
  students:    Vec<Student>,
  enrollments: Vec<Enrollment>,
  sessions:    Vec<Session>,
  records:     BTreeMap<(Uuid, Uuid), Record>,
}

impl State {
  fn apply(&mut self, write: RecordWrite) -> Result<RecordView> {
    let Some(student) = self.students.iter().find(|s| s.id == write.mark.student_id) else {
      return Err(Error::not_found(format!("student {} not found", write.mark.student_id)));
    };
    let record = Record {
      session_id:       write.session_id,
      student_id:       student.id,
      status:           write.mark.status,
      method:           write.mark.method,
      confidence_score: write.mark.confidence_score,
      marked_by:        write.marked_by,
      marked_at:        Utc::now(),
      notes:            write.mark.notes,
    };
    let view = RecordView {
      record:        record.clone(),
      student_name:  student.name.clone(),
      enrollment_no: student.enrollment_no.clone(),
    };
    self.records.insert((record.session_id, record.student_id), record);
    Ok(view)
  }

  fn view(&self, record: &Record) -> Option<RecordView> {
    let student = self.students.iter().find(|s| s.id == record.student_id)?;
    Some(RecordView {
      record:        record.clone(),
      student_name:  student.name.clone(),
      enrollment_no: student.enrollment_no.clone(),
    })
  }
}

/// A [`Mutex`]-guarded in-memory [`AttendanceStore`].
#[derive(Default)]
pub struct MemoryStore {
  state: Mutex<State>,
}

impl MemoryStore {
  pub fn add_subject(&self, subject: Subject) -> Subject {
    self.state.lock().unwrap().subjects.push(subject.clone());
    subject
  }

  pub fn add_student(&self, student: Student) -> Student {
    self.state.lock().unwrap().students.push(student.clone());
    student
  }

  pub fn add_enrollment(&self, enrollment: Enrollment) {
    self.state.lock().unwrap().enrollments.push(enrollment);
  }

  pub fn add_session(&self, session: Session) -> Session {
    self.state.lock().unwrap().sessions.push(session.clone());
    session
  }

  pub fn deactivate_session(&self, id: Uuid) {
    let mut state = self.state.lock().unwrap();
    if let Some(session) = state.sessions.iter_mut().find(|s| s.id == id) {
      session.is_active = false;
    }
  }
}

impl AttendanceStore for MemoryStore {
  type Error = Error;

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    Ok(self.state.lock().unwrap().subjects.iter().find(|s| s.id == id).cloned())
  }

  async fn insert_session(&self, session: Session) -> Result<Session> {
    Ok(self.add_session(session))
  }

  async fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
    Ok(self.state.lock().unwrap().sessions.iter().find(|s| s.id == id).cloned())
  }

  async fn list_sessions(&self, filter: &SessionFilter, limit: usize) -> Result<Vec<Session>> {
    let state = self.state.lock().unwrap();
    let mut sessions: Vec<Session> = state
      .sessions
      .iter()
      .filter(|session| {
        state
          .subjects
          .iter()
          .find(|s| s.id == session.subject_id)
          .is_some_and(|subject| filter.matches(session, subject))
      })
      .cloned()
      .collect();
    sessions.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.start_time.cmp(&a.start_time)));
    sessions.truncate(limit);
    Ok(sessions)
  }

  async fn upsert_record(&self, write: RecordWrite) -> Result<RecordView> {
    self.state.lock().unwrap().apply(write)
  }

  async fn write_batch(
    &self,
    session_id: Uuid,
    marked_by: Uuid,
    marks: Vec<MarkRecord>,
  ) -> Result<BatchOutcome> {
    let mut state = self.state.lock().unwrap();
    let before = state.records.clone();
    let count = marks.len();
    let mut failures = Vec::new();
    for (index, mark) in marks.into_iter().enumerate() {
      let student_id = mark.student_id;
      if let Err(e) = state.apply(RecordWrite { session_id, marked_by, mark }) {
        failures.push(RecordFailure { index, student_id: Some(student_id), error: e.to_string() });
      }
    }
    if failures.is_empty() {
      Ok(BatchOutcome::Committed { count })
    } else {
      state.records = before;
      Ok(BatchOutcome::RolledBack { failures })
    }
  }

  async fn list_records(&self, session_id: Uuid) -> Result<Vec<RecordView>> {
    let state = self.state.lock().unwrap();
    let mut views: Vec<RecordView> = state
      .records
      .values()
      .filter(|r| r.session_id == session_id)
      .filter_map(|r| state.view(r))
      .collect();
    views.sort_by(|a, b| a.student_name.cmp(&b.student_name));
    Ok(views)
  }

  async fn snapshot(&self, filter: &SessionFilter) -> Result<Snapshot> {
    let state = self.state.lock().unwrap();
    let subjects: Vec<Subject> = state
      .subjects
      .iter()
      .filter(|s| filter.scope.permits(s.teacher_id))
      .cloned()
      .collect();
    let sessions: Vec<Session> = state
      .sessions
      .iter()
      .filter(|session| {
        subjects
          .iter()
          .find(|s| s.id == session.subject_id)
          .is_some_and(|subject| filter.matches(session, subject))
      })
      .cloned()
      .collect();
    let records: Vec<Record> = state
      .records
      .values()
      .filter(|r| sessions.iter().any(|s| s.id == r.session_id))
      .cloned()
      .collect();
    let enrollments: Vec<Enrollment> = state
      .enrollments
      .iter()
      .filter(|e| subjects.iter().any(|s| s.id == e.subject_id))
      .copied()
      .collect();
    let students = state
      .students
      .iter()
      .filter(|st| {
        enrollments.iter().any(|e| e.student_id == st.id)
          || records.iter().any(|r| r.student_id == st.id)
      })
      .cloned()
      .collect();
    Ok(Snapshot { subjects, sessions, records, students, enrollments })
  }
}
