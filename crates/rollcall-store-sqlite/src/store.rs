//! [`SqliteStore`]: the SQLite implementation of [`AttendanceStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params, params_from_iter};
use uuid::Uuid;

use rollcall_core::{
  directory::Subject,
  error::RecordFailure,
  filter::SessionFilter,
  record::{BatchOutcome, MarkRecord, RecordView, RecordWrite},
  session::Session,
  store::{AttendanceStore, Snapshot},
};

use crate::{
  Error, Result,
  encode::{
    ENROLLMENT_COLUMNS, RECORD_COLUMNS, RawEnrollment, RawRecord, RawRecordView, RawSession,
    RawStudent, RawSubject, SESSION_COLUMNS, STUDENT_COLUMNS, SUBJECT_COLUMNS, encode_date,
    encode_dt, encode_method, encode_session_type, encode_status, encode_time, encode_uuid,
  },
  error::is_foreign_key_violation,
  schema::SCHEMA,
  sql::Where,
};

/// Replaces every column of an existing `(session_id, student_id)` row.
const UPSERT_RECORD: &str = "
  INSERT INTO attendance_records (
    session_id, student_id, status, method, confidence_score, marked_by, marked_at, notes
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
  ON CONFLICT (session_id, student_id) DO UPDATE SET
    status           = excluded.status,
    method           = excluded.method,
    confidence_score = excluded.confidence_score,
    marked_by        = excluded.marked_by,
    marked_at        = excluded.marked_at,
    notes            = excluded.notes";

// ─── Store ───────────────────────────────────────────────────────────────────

/// An attendance store backed by a single SQLite file.
///
/// Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "sqlite store opened");
    Ok(store)
  }

  /// Open an in-memory store.
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

/// A record write with every column already encoded.
struct EncodedRecord {
  student_id:       Uuid,
  status:           &'static str,
  method:           &'static str,
  confidence_score: Option<f64>,
  notes:            Option<String>,
}

impl EncodedRecord {
  fn new(mark: MarkRecord) -> Self {
    Self {
      student_id:       mark.student_id,
      status:           encode_status(mark.status),
      method:           encode_method(mark.method),
      confidence_score: mark.confidence_score,
      notes:            mark.notes,
    }
  }

  fn execute(
    &self,
    stmt: &mut rusqlite::Statement<'_>,
    session_id: &str,
    marked_by: &str,
    marked_at: &str,
  ) -> rusqlite::Result<usize> {
    stmt.execute(params![
      session_id,
      encode_uuid(self.student_id),
      self.status,
      self.method,
      self.confidence_score,
      marked_by,
      marked_at,
      self.notes,
    ])
  }
}

// ─── AttendanceStore impl ────────────────────────────────────────────────────

impl AttendanceStore for SqliteStore {
  type Error = Error;

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SUBJECT_COLUMNS} FROM subjects s WHERE s.id = ?1"),
              params![id_str],
              RawSubject::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn insert_session(&self, session: Session) -> Result<Session> {
    let id_str         = encode_uuid(session.id);
    let subject_id_str = encode_uuid(session.subject_id);
    let name           = session.name.clone();
    let date_str       = encode_date(session.date);
    let start_str      = session.start_time.map(encode_time);
    let end_str        = session.end_time.map(encode_time);
    let location       = session.location.clone();
    let type_str       = encode_session_type(session.session_type);
    let is_active      = session.is_active;
    let created_by_str = encode_uuid(session.created_by);
    let created_at_str = encode_dt(session.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO attendance_sessions (
             id, subject_id, name, date, start_time, end_time,
             location, session_type, is_active, created_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          params![
            id_str,
            subject_id_str,
            name,
            date_str,
            start_str,
            end_str,
            location,
            type_str,
            is_active,
            created_by_str,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SESSION_COLUMNS} FROM attendance_sessions ats WHERE ats.id = ?1"),
              params![id_str],
              RawSession::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn list_sessions(&self, filter: &SessionFilter, limit: usize) -> Result<Vec<Session>> {
    let Where { clause, mut params } = Where::sessions(filter);
    params.push(rusqlite::types::Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

    let raws: Vec<RawSession> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {SESSION_COLUMNS}
           FROM attendance_sessions ats
           JOIN subjects s ON s.id = ats.subject_id
           {clause}
           ORDER BY ats.date DESC, ats.start_time IS NULL, ats.start_time DESC
           LIMIT ?"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params), RawSession::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSession::into_session).collect()
  }

  // ── Records ───────────────────────────────────────────────────────────────

  async fn upsert_record(&self, write: RecordWrite) -> Result<RecordView> {
    let student_id     = write.mark.student_id;
    let session_id_str = encode_uuid(write.session_id);
    let marked_by_str  = encode_uuid(write.marked_by);
    let marked_at_str  = encode_dt(Utc::now());
    let encoded        = EncodedRecord::new(write.mark);

    let raw: Option<RawRecordView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(UPSERT_RECORD)?;
        match encoded.execute(&mut stmt, &session_id_str, &marked_by_str, &marked_at_str) {
          Ok(_) => {}
          Err(e) if is_foreign_key_violation(&e) => return Ok(None),
          Err(e) => return Err(e.into()),
        }

        let view = conn.query_row(
          &format!(
            "SELECT {RECORD_COLUMNS}, st.name, st.enrollment_no
             FROM attendance_records ar
             JOIN students st ON st.id = ar.student_id
             WHERE ar.session_id = ?1 AND ar.student_id = ?2"
          ),
          params![session_id_str, encode_uuid(encoded.student_id)],
          RawRecordView::from_row,
        )?;
        Ok(Some(view))
      })
      .await?;

    raw.ok_or(Error::StudentNotFound(student_id))?.into_view()
  }

  async fn write_batch(
    &self,
    session_id: Uuid,
    marked_by: Uuid,
    marks: Vec<MarkRecord>,
  ) -> Result<BatchOutcome> {
    let session_id_str = encode_uuid(session_id);
    let marked_by_str  = encode_uuid(marked_by);
    let marked_at_str  = encode_dt(Utc::now());
    let encoded: Vec<EncodedRecord> = marks.into_iter().map(EncodedRecord::new).collect();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut failures = Vec::new();
        {
          let mut stmt = tx.prepare_cached(UPSERT_RECORD)?;
          for (index, record) in encoded.iter().enumerate() {
            if let Err(e) = record.execute(&mut stmt, &session_id_str, &marked_by_str, &marked_at_str)
            {
              let error = if is_foreign_key_violation(&e) {
                format!("student {} not found", record.student_id)
              } else {
                e.to_string()
              };
              failures.push(RecordFailure { index, student_id: Some(record.student_id), error });
            }
          }
        }

        if failures.is_empty() {
          tx.commit()?;
          Ok(BatchOutcome::Committed { count: encoded.len() })
        } else {
          tx.rollback()?;
          Ok(BatchOutcome::RolledBack { failures })
        }
      })
      .await?;

    Ok(outcome)
  }

  async fn list_records(&self, session_id: Uuid) -> Result<Vec<RecordView>> {
    let session_id_str = encode_uuid(session_id);

    let raws: Vec<RawRecordView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS}, st.name, st.enrollment_no
           FROM attendance_records ar
           JOIN students st ON st.id = ar.student_id
           WHERE ar.session_id = ?1
           ORDER BY st.name, st.id"
        ))?;
        let rows = stmt
          .query_map(params![session_id_str], RawRecordView::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecordView::into_view).collect()
  }

  // ── Reads for analytics ───────────────────────────────────────────────────

  async fn snapshot(&self, filter: &SessionFilter) -> Result<Snapshot> {
    let sessions_where = Where::sessions(filter);
    let subjects_where = Where::subjects(filter.scope);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        fn collect<T>(
          tx: &rusqlite::Transaction<'_>,
          sql: &str,
          params: &[rusqlite::types::Value],
          map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
        ) -> rusqlite::Result<Vec<T>> {
          let mut stmt = tx.prepare(sql)?;
          let rows = stmt.query_map(params_from_iter(params), map)?.collect();
          rows
        }

        let Where { clause: sessions_clause, params: session_params } = &sessions_where;
        let Where { clause: subjects_clause, params: subject_params } = &subjects_where;

        let subjects = collect(
          &tx,
          &format!("SELECT {SUBJECT_COLUMNS} FROM subjects s {subjects_clause}"),
          subject_params,
          RawSubject::from_row,
        )?;
        let sessions = collect(
          &tx,
          &format!(
            "SELECT {SESSION_COLUMNS}
             FROM attendance_sessions ats
             JOIN subjects s ON s.id = ats.subject_id
             {sessions_clause}"
          ),
          session_params,
          RawSession::from_row,
        )?;
        let records = collect(
          &tx,
          &format!(
            "SELECT {RECORD_COLUMNS}
             FROM attendance_records ar
             JOIN attendance_sessions ats ON ats.id = ar.session_id
             JOIN subjects s ON s.id = ats.subject_id
             {sessions_clause}"
          ),
          session_params,
          RawRecord::from_row,
        )?;
        let enrollments = collect(
          &tx,
          &format!(
            "SELECT {ENROLLMENT_COLUMNS}
             FROM enrollments e
             JOIN subjects s ON s.id = e.subject_id
             {subjects_clause}"
          ),
          subject_params,
          RawEnrollment::from_row,
        )?;

        let student_params: Vec<_> = subject_params.iter().chain(session_params).cloned().collect();
        let students = collect(
          &tx,
          &format!(
            "SELECT {STUDENT_COLUMNS}
             FROM students st
             WHERE st.id IN (
               SELECT e.student_id FROM enrollments e
               JOIN subjects s ON s.id = e.subject_id
               {subjects_clause}
             ) OR st.id IN (
               SELECT ar.student_id FROM attendance_records ar
               JOIN attendance_sessions ats ON ats.id = ar.session_id
               JOIN subjects s ON s.id = ats.subject_id
               {sessions_clause}
             )"
          ),
          &student_params,
          RawStudent::from_row,
        )?;

        tx.commit()?;
        Ok((subjects, sessions, records, students, enrollments))
      })
      .await?;

    let (subjects, sessions, records, students, enrollments) = raw;
    Ok(Snapshot {
      subjects:    subjects.into_iter().map(RawSubject::into_subject).collect::<Result<_>>()?,
      sessions:    sessions.into_iter().map(RawSession::into_session).collect::<Result<_>>()?,
      records:     records.into_iter().map(RawRecord::into_record).collect::<Result<_>>()?,
      students:    students.into_iter().map(RawStudent::into_student).collect::<Result<_>>()?,
      enrollments: enrollments
        .into_iter()
        .map(RawEnrollment::into_enrollment)
        .collect::<Result<_>>()?,
    })
  }
}
