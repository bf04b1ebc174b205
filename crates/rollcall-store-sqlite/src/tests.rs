//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};
use rollcall_core::{
  AnalyticsAggregator, AttendanceLedger, AttendanceStore, Error as CoreError, Event, Notifier,
  Principal, SessionRegistry,
  analytics::{ReportData, ReportFormat, ReportQuery},
  directory::{Enrollment, Student, Subject},
  filter::SessionFilter,
  record::{BatchOutcome, MarkMethod, MarkRecord, RecordStatus, RecordWrite},
  registry::SessionListQuery,
  session::NewSession,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, d).unwrap() }

fn subject(code: &str, teacher_id: Option<Uuid>) -> Subject {
  Subject {
    id: Uuid::new_v4(),
    code: code.to_owned(),
    name: format!("{code} course"),
    teacher_id,
    department: Some("CS".into()),
    year: Some(2),
    is_active: true,
  }
}

fn student(name: &str) -> Student {
  Student {
    id: Uuid::new_v4(),
    enrollment_no: format!("E-{name}"),
    name: name.to_owned(),
    department: Some("CS".into()),
    year: Some(2),
    is_active: true,
  }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Event>>);

impl Notifier for Recorder {
  fn publish(&self, event: Event) { self.0.lock().unwrap().push(event); }
}

struct Services {
  store:     Arc<SqliteStore>,
  registry:  Arc<SessionRegistry<SqliteStore>>,
  ledger:    AttendanceLedger<SqliteStore>,
  analytics: AnalyticsAggregator<SqliteStore>,
  events:    Arc<Recorder>,
}

async fn services() -> Services {
  let store = Arc::new(store().await);
  let events = Arc::new(Recorder::default());
  let registry = Arc::new(SessionRegistry::new(store.clone(), events.clone()));
  let ledger = AttendanceLedger::new(store.clone(), registry.clone(), events.clone());
  let analytics = AnalyticsAggregator::new(store.clone());
  Services { store, registry, ledger, analytics, events }
}

impl Services {
  async fn subject(&self, code: &str, teacher: Option<Uuid>) -> Subject {
    let subject = subject(code, teacher);
    self.store.put_subject(&subject).await.unwrap();
    subject
  }

  async fn student(&self, name: &str) -> Student {
    let student = student(name);
    self.store.put_student(&student).await.unwrap();
    student
  }

  async fn session(&self, subject: &Subject, date: NaiveDate) -> Uuid {
    self
      .registry
      .create_session(NewSession::new(subject.id, "Lecture", date), &Principal::admin(Uuid::new_v4()))
      .await
      .unwrap()
      .id
  }
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_and_get_subject() {
  let s = store().await;
  let mut maths = subject("MATH", Some(Uuid::new_v4()));
  s.put_subject(&maths).await.unwrap();
  assert_eq!(s.get_subject(maths.id).await.unwrap(), Some(maths.clone()));

  maths.is_active = false;
  s.put_subject(&maths).await.unwrap();
  assert!(!s.get_subject(maths.id).await.unwrap().unwrap().is_active);
}

#[tokio::test]
async fn get_subject_missing_returns_none() {
  let s = store().await;
  assert!(s.get_subject(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_subject_code_is_a_conflict() {
  let s = store().await;
  s.put_subject(&subject("MATH", None)).await.unwrap();
  let err = s.put_subject(&subject("MATH", None)).await.unwrap_err();
  assert!(err.is_unique_violation());
  assert!(matches!(CoreError::from(err), CoreError::Conflict(_)));
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_round_trips_through_the_registry() {
  let svc = services().await;
  let maths = svc.subject("MATH", None).await;
  let mut input = NewSession::new(maths.id, "Lab 1", day(5));
  input.start_time = NaiveTime::from_hms_opt(9, 0, 0);
  input.end_time = NaiveTime::from_hms_opt(10, 30, 0);
  input.location = Some("B12".into());

  let created = svc.registry.create_session(input, &Principal::admin(Uuid::new_v4())).await.unwrap();
  let fetched = svc.registry.get_session(created.id).await.unwrap();
  assert_eq!(fetched.name, "Lab 1");
  assert_eq!(fetched.start_time, created.start_time);
  assert_eq!(fetched.location.as_deref(), Some("B12"));
  assert!(fetched.is_active);
  assert!(matches!(svc.events.0.lock().unwrap()[0], Event::SessionCreated(_)));
}

#[tokio::test]
async fn sessions_for_inactive_subjects_are_refused() {
  let svc = services().await;
  let mut retired = subject("OLD", None);
  retired.is_active = false;
  svc.store.put_subject(&retired).await.unwrap();

  let err = svc
    .registry
    .create_session(NewSession::new(retired.id, "x", day(1)), &Principal::admin(Uuid::new_v4()))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn listing_orders_newest_first_and_skips_inactive() {
  let svc = services().await;
  let maths = svc.subject("MATH", None).await;
  let admin = Principal::admin(Uuid::new_v4());

  let mut ids = Vec::new();
  for (date, start) in [(day(3), None), (day(3), Some((14, 0))), (day(3), Some((9, 0))), (day(7), None)] {
    let mut input = NewSession::new(maths.id, "s", date);
    input.start_time = start.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0));
    ids.push(svc.registry.create_session(input, &admin).await.unwrap().id);
  }
  let closed = svc.session(&maths, day(9)).await;
  assert!(svc.store.set_session_active(closed, false).await.unwrap());

  let listed: Vec<_> = svc
    .registry
    .list_sessions(&SessionListQuery::default(), &admin)
    .await
    .unwrap()
    .into_iter()
    .map(|s| s.id)
    .collect();
  assert_eq!(listed, [ids[3], ids[1], ids[2], ids[0]]);

  let limited = SessionListQuery { limit: 2, ..SessionListQuery::default() };
  assert_eq!(svc.registry.list_sessions(&limited, &admin).await.unwrap().len(), 2);

  let on_day = SessionListQuery { date: Some(day(7)), ..SessionListQuery::default() };
  assert_eq!(svc.registry.list_sessions(&on_day, &admin).await.unwrap().len(), 1);
}

#[tokio::test]
async fn teachers_only_list_their_own_sessions() {
  let svc = services().await;
  let a = Uuid::new_v4();
  let b = Uuid::new_v4();
  let mine = svc.subject("MINE", Some(a)).await;
  let theirs = svc.subject("THEIRS", Some(b)).await;
  let own = svc.session(&mine, day(1)).await;
  svc.session(&theirs, day(1)).await;

  let listed = svc
    .registry
    .list_sessions(&SessionListQuery::default(), &Principal::teacher(a))
    .await
    .unwrap();
  assert_eq!(listed.iter().map(|s| s.id).collect::<Vec<_>>(), [own]);
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn non_owner_cannot_mark() {
  let svc = services().await;
  let a = Uuid::new_v4();
  let maths = svc.subject("MATH", Some(a)).await;
  let ada = svc.student("Ada").await;

  let session = svc
    .registry
    .create_session(NewSession::new(maths.id, "S1", day(1)), &Principal::teacher(a))
    .await
    .unwrap()
    .id;

  let err = svc
    .ledger
    .mark_one(session, MarkRecord::new(ada.id, RecordStatus::Present), &Principal::teacher(Uuid::new_v4()))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Forbidden(_)));
  assert!(svc.ledger.list_records(session).await.unwrap().is_empty());
}

#[tokio::test]
async fn remarking_replaces_every_field() {
  let svc = services().await;
  let maths = svc.subject("MATH", None).await;
  let ada = svc.student("Ada").await;
  let session = svc.session(&maths, day(1)).await;

  let mut first = MarkRecord::new(ada.id, RecordStatus::Present);
  first.method = MarkMethod::FaceRecognition;
  first.confidence_score = Some(0.93);
  first.notes = Some("camera".into());
  let first = svc.ledger.mark_one(session, first, &Principal::admin(Uuid::new_v4())).await.unwrap();
  assert_eq!(first.student_name, "Ada");
  assert_eq!(first.enrollment_no, "E-Ada");

  let marker = Principal::admin(Uuid::new_v4());
  let second = svc
    .ledger
    .mark_one(session, MarkRecord::new(ada.id, RecordStatus::Late), &marker)
    .await
    .unwrap();

  let records = svc.ledger.list_records(session).await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0], second);
  let record = &records[0].record;
  assert_eq!(record.status, RecordStatus::Late);
  assert_eq!(record.method, MarkMethod::Manual);
  assert_eq!(record.confidence_score, None);
  assert_eq!(record.notes, None);
  assert_eq!(record.marked_by, marker.id);
  assert!(record.marked_at >= first.record.marked_at);
}

#[tokio::test]
async fn marking_an_unknown_student_is_not_found() {
  let svc = services().await;
  let maths = svc.subject("MATH", None).await;
  let session = svc.session(&maths, day(1)).await;

  let err = svc
    .ledger
    .mark_one(session, MarkRecord::new(Uuid::new_v4(), RecordStatus::Present), &Principal::admin(Uuid::new_v4()))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn bulk_upserts_across_batches() {
  let svc = services().await;
  let maths = svc.subject("MATH", None).await;
  let [one, two, three] = [svc.student("One").await, svc.student("Two").await, svc.student("Three").await];
  let session = svc.session(&maths, day(1)).await;
  let admin = Principal::admin(Uuid::new_v4());

  let count = svc
    .ledger
    .mark_bulk(
      session,
      vec![MarkRecord::new(one.id, RecordStatus::Present), MarkRecord::new(two.id, RecordStatus::Absent)],
      &admin,
    )
    .await
    .unwrap();
  assert_eq!(count, 2);
  assert_eq!(svc.ledger.list_records(session).await.unwrap().len(), 2);

  svc
    .ledger
    .mark_bulk(
      session,
      vec![MarkRecord::new(one.id, RecordStatus::Late), MarkRecord::new(three.id, RecordStatus::Present)],
      &admin,
    )
    .await
    .unwrap();

  let by_student: Vec<_> = svc
    .ledger
    .list_records(session)
    .await
    .unwrap()
    .into_iter()
    .map(|v| (v.student_name, v.record.status))
    .collect();
  assert_eq!(
    by_student,
    [
      ("One".to_owned(), RecordStatus::Late),
      ("Three".to_owned(), RecordStatus::Present),
      ("Two".to_owned(), RecordStatus::Absent),
    ]
  );
}

#[tokio::test]
async fn bulk_duplicate_student_keeps_the_later_entry() {
  let svc = services().await;
  let maths = svc.subject("MATH", None).await;
  let ada = svc.student("Ada").await;
  let session = svc.session(&maths, day(1)).await;

  let count = svc
    .ledger
    .mark_bulk(
      session,
      vec![MarkRecord::new(ada.id, RecordStatus::Absent), MarkRecord::new(ada.id, RecordStatus::Excused)],
      &Principal::admin(Uuid::new_v4()),
    )
    .await
    .unwrap();
  assert_eq!(count, 2);

  let records = svc.ledger.list_records(session).await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].record.status, RecordStatus::Excused);
}

#[tokio::test]
async fn failed_bulk_rolls_back_and_lists_every_failure() {
  let svc = services().await;
  let maths = svc.subject("MATH", None).await;
  let ada = svc.student("Ada").await;
  let bob = svc.student("Bob").await;
  let session = svc.session(&maths, day(1)).await;
  let admin = Principal::admin(Uuid::new_v4());

  svc
    .ledger
    .mark_one(session, MarkRecord::new(bob.id, RecordStatus::Absent), &admin)
    .await
    .unwrap();

  let ghosts = [Uuid::new_v4(), Uuid::new_v4()];
  let err = svc
    .ledger
    .mark_bulk(
      session,
      vec![
        MarkRecord::new(ada.id, RecordStatus::Present),
        MarkRecord::new(ghosts[0], RecordStatus::Present),
        MarkRecord::new(bob.id, RecordStatus::Present),
        MarkRecord::new(ghosts[1], RecordStatus::Late),
      ],
      &admin,
    )
    .await
    .unwrap_err();

  let CoreError::BatchRejected { failures } = err else { panic!("expected rejection, got {err:?}") };
  assert_eq!(failures.iter().map(|f| (f.index, f.student_id)).collect::<Vec<_>>(), [(1, Some(ghosts[0])), (3, Some(ghosts[1]))]);

  let records = svc.ledger.list_records(session).await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].record.student_id, bob.id);
  assert_eq!(records[0].record.status, RecordStatus::Absent);
}

#[tokio::test]
async fn store_reports_batch_outcome_directly() {
  let svc = services().await;
  let maths = svc.subject("MATH", None).await;
  let session = svc.session(&maths, day(1)).await;

  let outcome = svc
    .store
    .write_batch(session, Uuid::new_v4(), vec![MarkRecord::new(Uuid::new_v4(), RecordStatus::Present)])
    .await
    .unwrap();
  let BatchOutcome::RolledBack { failures } = outcome else { panic!("expected rollback") };
  assert!(failures[0].error.contains("not found"));

  let err = svc
    .store
    .upsert_record(RecordWrite {
      session_id: session,
      marked_by:  Uuid::new_v4(),
      mark:       MarkRecord::new(Uuid::new_v4(), RecordStatus::Present),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::StudentNotFound(_)));
}

// ─── Analytics ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn snapshot_respects_scope_and_window() {
  let svc = services().await;
  let teacher = Uuid::new_v4();
  let mine = svc.subject("MINE", Some(teacher)).await;
  let theirs = svc.subject("THEIRS", Some(Uuid::new_v4())).await;
  let ada = svc.student("Ada").await;
  let bob = svc.student("Bob").await;
  svc.store.put_enrollment(Enrollment { student_id: ada.id, subject_id: mine.id, is_active: true }).await.unwrap();
  svc.store.put_enrollment(Enrollment { student_id: bob.id, subject_id: theirs.id, is_active: true }).await.unwrap();

  let early = svc.session(&mine, day(1)).await;
  let late = svc.session(&mine, day(15)).await;
  let other = svc.session(&theirs, day(15)).await;
  let admin = Principal::admin(Uuid::new_v4());
  for (session, student) in [(early, &ada), (late, &ada), (other, &bob)] {
    svc.ledger.mark_one(session, MarkRecord::new(student.id, RecordStatus::Present), &admin).await.unwrap();
  }

  let filter = SessionFilter::new()
    .scoped(Principal::teacher(teacher).scope())
    .since(day(10))
    .active_only();
  let snapshot = svc.store.snapshot(&filter).await.unwrap();
  assert_eq!(snapshot.subjects.len(), 1);
  assert_eq!(snapshot.sessions.iter().map(|s| s.id).collect::<Vec<_>>(), [late]);
  assert_eq!(snapshot.records.len(), 1);
  assert_eq!(snapshot.enrollments.len(), 1);
  assert_eq!(snapshot.students.iter().map(|s| s.id).collect::<Vec<_>>(), [ada.id]);
}

#[tokio::test]
async fn summary_report_uses_session_denominator() {
  let svc = services().await;
  let maths = svc.subject("MATH", None).await;
  let ada = svc.student("Ada").await;
  svc.store.put_enrollment(Enrollment { student_id: ada.id, subject_id: maths.id, is_active: true }).await.unwrap();
  let admin = Principal::admin(Uuid::new_v4());

  for d in 1..=10 {
    let session = svc.session(&maths, day(d)).await;
    let status = match d {
      1..=5 => Some(RecordStatus::Present),
      6 => Some(RecordStatus::Absent),
      _ => None,
    };
    if let Some(status) = status {
      svc.ledger.mark_one(session, MarkRecord::new(ada.id, status), &admin).await.unwrap();
    }
  }

  let query = ReportQuery::new(day(1), day(31), ReportFormat::Summary);
  let report = svc.analytics.report(&query, &admin).await.unwrap();
  let ReportData::Summary(rows) = report.data else { panic!("expected summary rows") };
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].total_sessions, 10);
  assert_eq!(rows[0].attended_sessions, 6);
  assert_eq!(rows[0].present_count, 5);
  assert_eq!(rows[0].attendance_percentage, Some(50.0));

  let dashboard = svc.analytics.dashboard_as_of(day(19), 30, &admin).await.unwrap();
  assert_eq!(dashboard.attendance_overview.total, 6);
  assert_eq!(dashboard.attendance_overview.percentage, Some(83.33));
}

#[tokio::test]
async fn file_backed_store_persists_across_reopen() {
  let path = std::env::temp_dir().join(format!("rollcall-{}.db", Uuid::new_v4()));
  let maths = subject("MATH", None);
  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.put_subject(&maths).await.unwrap();
  }
  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.get_subject(maths.id).await.unwrap(), Some(maths));
  drop(s);
  let _ = std::fs::remove_file(&path);
}
