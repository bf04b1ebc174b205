//! Handlers for `/analytics` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/analytics/dashboard` | Optional `?period=<days>` (default 30) |
//! | `GET`  | `/analytics/trends` | Optional `?period`, `group_by=day\|week\|month`, `subject_id` |
//! | `GET`  | `/analytics/report` | Required `?start_date`, `end_date`; optional `format`, filters |

use axum::{Json, extract::State};
use rollcall_core::{
  AttendanceStore,
  analytics::{DEFAULT_PERIOD_DAYS, Dashboard, Report, ReportQuery, TrendQuery, Trends},
};
use serde::Deserialize;

use crate::{AppState, error::ApiError, extract::Query, principal::Caller};

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
  /// Trailing window in days.
  #[serde(default = "default_period")]
  pub period: u32,
}

fn default_period() -> u32 { DEFAULT_PERIOD_DAYS }

/// `GET /analytics/dashboard[?period=N]`
pub async fn dashboard<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Query(params): Query<DashboardParams>,
) -> Result<Json<Dashboard>, ApiError>
where
  S: AttendanceStore + 'static,
{
  Ok(Json(state.analytics.dashboard(params.period, &principal).await?))
}

/// `GET /analytics/trends`
pub async fn trends<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Query(query): Query<TrendQuery>,
) -> Result<Json<Trends>, ApiError>
where
  S: AttendanceStore + 'static,
{
  Ok(Json(state.analytics.trends(&query, &principal).await?))
}

/// `GET /analytics/report?start_date=..&end_date=..`
pub async fn report<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Query(query): Query<ReportQuery>,
) -> Result<Json<Report>, ApiError>
where
  S: AttendanceStore + 'static,
{
  Ok(Json(state.analytics.report(&query, &principal).await?))
}
