//! The `AttendanceStore` trait and the read snapshot it produces.
//!
//! The trait is implemented by storage backends (e.g.
//! `rollcall-store-sqlite`). The services in this crate depend on this
//! abstraction, never on a concrete backend, and receive it explicitly at
//! construction time.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Error, Result,
  directory::{Enrollment, Student, Subject},
  filter::SessionFilter,
  record::{BatchOutcome, MarkRecord, Record, RecordView, RecordWrite},
  session::Session,
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Everything an analytics query needs, read in one consistent pass.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  /// Every subject visible under the filter's scope, active or not.
  pub subjects:    Vec<Subject>,
  /// Sessions matching the filter.
  pub sessions:    Vec<Session>,
  /// Records belonging to `sessions`.
  pub records:     Vec<Record>,
  /// Students enrolled in `subjects` or referenced by `records`.
  pub students:    Vec<Student>,
  /// Enrollments into `subjects`, active or not.
  pub enrollments: Vec<Enrollment>,
}

impl Snapshot {
  pub fn subject(&self, id: Uuid) -> Option<&Subject> {
    self.subjects.iter().find(|s| s.id == id)
  }

  pub fn student(&self, id: Uuid) -> Option<&Student> {
    self.students.iter().find(|s| s.id == id)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an attendance store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AttendanceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<Error>;

  // ── Directory (read-only) ─────────────────────────────────────────────

  /// Retrieve a subject by id. Returns `None` if not found.
  fn get_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Persist a fully-built session.
  fn insert_session(
    &self,
    session: Session,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Retrieve a session by id, active or not. Returns `None` if not found.
  fn get_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Sessions matching `filter`, newest date first, then latest start time
  /// first (sessions without a start time last), at most `limit` of them.
  fn list_sessions<'a>(
    &'a self,
    filter: &'a SessionFilter,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Session>, Self::Error>> + Send + 'a;

  // ── Records ───────────────────────────────────────────────────────────

  /// Create or fully replace the record for `(session_id, student_id)`.
  /// `marked_at` is set by the store.
  fn upsert_record(
    &self,
    write: RecordWrite,
  ) -> impl Future<Output = Result<RecordView, Self::Error>> + Send + '_;

  /// Apply `marks` in input order inside a single transaction.
  ///
  /// Every entry is attempted. If any entry fails, the transaction is rolled
  /// back and every failure is reported; otherwise it commits.
  fn write_batch(
    &self,
    session_id: Uuid,
    marked_by: Uuid,
    marks: Vec<MarkRecord>,
  ) -> impl Future<Output = Result<BatchOutcome, Self::Error>> + Send + '_;

  /// Records of a session joined with student identity, by student name.
  fn list_records(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<RecordView>, Self::Error>> + Send + '_;

  // ── Reads for analytics ───────────────────────────────────────────────

  /// Read a [`Snapshot`] for `filter` inside a single read transaction.
  fn snapshot<'a>(
    &'a self,
    filter: &'a SessionFilter,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + 'a;
}

/// Lifts a backend result into the core [`Error`].
pub(crate) trait IntoCore<T> {
  fn into_core(self) -> Result<T>;
}

impl<T, E: Into<Error>> IntoCore<T> for Result<T, E> {
  fn into_core(self) -> Result<T> { self.map_err(Into::into) }
}
