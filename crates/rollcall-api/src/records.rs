//! Handlers for attendance records and statistics.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/attendance/sessions/{id}/records` | Ordered by student name |
//! | `POST` | `/attendance/sessions/{id}/records` | Body: [`MarkRecord`] |
//! | `POST` | `/attendance/sessions/{id}/bulk-records` | Body: `{"records":[...]}`; all or nothing |
//! | `GET`  | `/attendance/stats` | Optional `?subject_id`, `student_id`, `start_date`, `end_date` |

use axum::{Json, extract::State};
use rollcall_core::{
  AttendanceStore, Error as CoreError,
  analytics::{Statistics, StatsQuery},
  error::RecordFailure,
  record::{MarkRecord, RecordView},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{JsonBody, Path, Query},
  principal::Caller,
};

/// `GET /attendance/sessions/{id}/records`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Caller(_): Caller,
  Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<RecordView>>, ApiError>
where
  S: AttendanceStore + 'static,
{
  Ok(Json(state.ledger.list_records(session_id).await?))
}

/// `POST /attendance/sessions/{id}/records`
pub async fn mark<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Path(session_id): Path<Uuid>,
  JsonBody(body): JsonBody<MarkRecord>,
) -> Result<Json<Value>, ApiError>
where
  S: AttendanceStore + 'static,
{
  let record = state.ledger.mark_one(session_id, body, &principal).await?;
  Ok(Json(json!({ "message": "Attendance marked successfully", "record": record })))
}

/// Entries stay raw so that one malformed entry is reported by index
/// instead of rejecting the whole body.
#[derive(Debug, Deserialize)]
pub struct BulkBody {
  #[serde(default)]
  pub records: Vec<Value>,
}

/// `POST /attendance/sessions/{id}/bulk-records`
pub async fn mark_bulk<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Path(session_id): Path<Uuid>,
  JsonBody(body): JsonBody<BulkBody>,
) -> Result<Json<Value>, ApiError>
where
  S: AttendanceStore + 'static,
{
  let marks = parse_marks(body.records)?;
  let count = state.ledger.mark_bulk(session_id, marks, &principal).await?;
  Ok(Json(json!({ "message": "Bulk attendance marked successfully", "count": count })))
}

/// `GET /attendance/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Query(query): Query<StatsQuery>,
) -> Result<Json<Statistics>, ApiError>
where
  S: AttendanceStore + 'static,
{
  Ok(Json(state.analytics.statistics(&query, &principal).await?))
}

/// Parse every bulk entry; any that fail are all reported by index.
fn parse_marks(entries: Vec<Value>) -> Result<Vec<MarkRecord>, CoreError> {
  let mut marks = Vec::with_capacity(entries.len());
  let mut failures = Vec::new();

  for (index, entry) in entries.into_iter().enumerate() {
    let student_id =
      entry.get("student_id").and_then(Value::as_str).and_then(|s| s.parse::<Uuid>().ok());
    match serde_json::from_value::<MarkRecord>(entry) {
      Ok(mark) => marks.push(mark),
      Err(e) => failures.push(RecordFailure { index, student_id, error: e.to_string() }),
    }
  }

  if failures.is_empty() {
    Ok(marks)
  } else {
    Err(CoreError::BatchRejected { failures })
  }
}
