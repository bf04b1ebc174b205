//! Handlers for `/attendance/sessions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/attendance/sessions` | Optional `?subject_id`, `date`, `limit` (default 50) |
//! | `POST` | `/attendance/sessions` | Body: [`NewSession`]; returns 201 |
//! | `GET`  | `/attendance/sessions/{id}` | 404 if not found |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_core::{
  AttendanceStore,
  registry::SessionListQuery,
  session::{NewSession, Session},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{JsonBody, Path, Query},
  principal::Caller,
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /attendance/sessions[?subject_id=..][&date=YYYY-MM-DD][&limit=N]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Query(query): Query<SessionListQuery>,
) -> Result<Json<Vec<Session>>, ApiError>
where
  S: AttendanceStore + 'static,
{
  Ok(Json(state.registry.list_sessions(&query, &principal).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /attendance/sessions`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  JsonBody(body): JsonBody<NewSession>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AttendanceStore + 'static,
{
  let session = state.registry.create_session(body, &principal).await?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Attendance session created successfully", "session": session })),
  ))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /attendance/sessions/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Caller(_): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError>
where
  S: AttendanceStore + 'static,
{
  Ok(Json(state.registry.get_session(id).await?))
}
