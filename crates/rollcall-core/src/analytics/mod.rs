//! [`AnalyticsAggregator`]: read-only aggregates over the ledger.
//!
//! Every operation reads one [`Snapshot`] from the store and reduces it with
//! the pure functions in the submodules. Nothing is cached; each call sees
//! the state at the moment its snapshot was taken.

pub mod dashboard;
pub mod metrics;
pub mod report;
pub mod stats;
pub mod trends;

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};

pub use self::{
  dashboard::{Dashboard, StudentAttendance, SubjectAttendance},
  metrics::{Bucket, GroupBy, percentage},
  report::{Report, ReportData, ReportFormat, ReportQuery},
  stats::{Statistics, StatsQuery},
  trends::{TrendQuery, Trends},
};
use crate::{
  Error, Result,
  filter::SessionFilter,
  scope::Principal,
  store::{AttendanceStore, IntoCore as _, Snapshot},
};

/// Trailing window used when a caller names none.
pub const DEFAULT_PERIOD_DAYS: u32 = 30;

pub(crate) fn default_period() -> u32 { DEFAULT_PERIOD_DAYS }

pub struct AnalyticsAggregator<S> {
  store: Arc<S>,
}

impl<S: AttendanceStore> AnalyticsAggregator<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn dashboard(&self, period_days: u32, principal: &Principal) -> Result<Dashboard> {
    self.dashboard_as_of(today(), period_days, principal).await
  }

  pub async fn dashboard_as_of(
    &self,
    today: NaiveDate,
    period_days: u32,
    principal: &Principal,
  ) -> Result<Dashboard> {
    let filter = window(principal, today, period_days);
    let snapshot = self.snapshot(&filter).await?;
    Ok(dashboard::dashboard(&snapshot))
  }

  pub async fn trends(&self, query: &TrendQuery, principal: &Principal) -> Result<Trends> {
    self.trends_as_of(today(), query, principal).await
  }

  pub async fn trends_as_of(
    &self,
    today: NaiveDate,
    query: &TrendQuery,
    principal: &Principal,
  ) -> Result<Trends> {
    let filter = window(principal, today, query.period_days).subject(query.subject_id);
    let snapshot = self.snapshot(&filter).await?;
    Ok(Trends {
      period:   query.period_days,
      group_by: query.group_by,
      data:     trends::buckets(&snapshot, query.group_by),
    })
  }

  pub async fn report(&self, query: &ReportQuery, principal: &Principal) -> Result<Report> {
    check_range(Some(query.start_date), Some(query.end_date))?;

    let filter = SessionFilter::new()
      .scoped(principal.scope())
      .subject(query.subject_id)
      .between(query.start_date, query.end_date)
      .active_only();
    let snapshot = self.snapshot(&filter).await?;
    Ok(report::report(&snapshot, query))
  }

  pub async fn statistics(&self, query: &StatsQuery, principal: &Principal) -> Result<Statistics> {
    check_range(query.start_date, query.end_date)?;

    let mut filter =
      SessionFilter::new().scoped(principal.scope()).subject(query.subject_id).active_only();
    filter.from = query.start_date;
    filter.until = query.end_date;
    let snapshot = self.snapshot(&filter).await?;
    Ok(stats::statistics(&snapshot, query.student_id))
  }

  async fn snapshot(&self, filter: &SessionFilter) -> Result<Snapshot> {
    let snapshot = self.store.snapshot(filter).await.into_core()?;
    tracing::debug!(
      sessions = snapshot.sessions.len(),
      records = snapshot.records.len(),
      "analytics snapshot read"
    );
    Ok(snapshot)
  }
}

fn today() -> NaiveDate { Utc::now().date_naive() }

/// Active, in-scope sessions dated `today - period_days` or later.
fn window(principal: &Principal, today: NaiveDate, period_days: u32) -> SessionFilter {
  let since = today.checked_sub_days(Days::new(period_days.into())).unwrap_or(NaiveDate::MIN);
  SessionFilter::new().scoped(principal.scope()).since(since).active_only()
}

fn check_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
  match (start, end) {
    (Some(start), Some(end)) if start > end => Err(Error::validation(format!(
      "start_date {start} is after end_date {end}"
    ))),
    _ => Ok(()),
  }
}
