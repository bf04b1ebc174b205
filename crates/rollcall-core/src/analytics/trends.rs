//! Time-bucketed attendance trends.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metrics::{Bucket, GroupBy, Tally};
use crate::store::Snapshot;

/// Parameters for [`crate::AnalyticsAggregator::trends`].
#[derive(Debug, Clone, Deserialize)]
pub struct TrendQuery {
  /// Trailing window in days.
  #[serde(default = "super::default_period", alias = "period")]
  pub period_days: u32,
  #[serde(default)]
  pub group_by:    GroupBy,
  pub subject_id:  Option<Uuid>,
}

impl Default for TrendQuery {
  fn default() -> Self {
    Self { period_days: super::default_period(), group_by: GroupBy::Day, subject_id: None }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trends {
  pub period:   u32,
  pub group_by: GroupBy,
  pub data:     Vec<Bucket>,
}

/// One bucket per period holding at least one session, ascending by period.
/// A bucket whose sessions carry no records has an undefined percentage.
pub fn buckets(snapshot: &Snapshot, group_by: GroupBy) -> Vec<Bucket> {
  let mut periods: BTreeMap<String, (u64, Tally)> = BTreeMap::new();
  let mut period_of: HashMap<Uuid, String> = HashMap::with_capacity(snapshot.sessions.len());

  for session in &snapshot.sessions {
    let key = group_by.key(session.date);
    periods.entry(key.clone()).or_default().0 += 1;
    period_of.insert(session.id, key);
  }

  for record in &snapshot.records {
    if let Some((_, tally)) = period_of.get(&record.session_id).and_then(|k| periods.get_mut(k)) {
      tally.add(record.status);
    }
  }

  periods
    .into_iter()
    .map(|(period, (sessions, tally))| Bucket::new(period, sessions, &tally))
    .collect()
}
