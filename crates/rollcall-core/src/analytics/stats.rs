//! Flat attendance statistics over a filtered set of sessions.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metrics::Tally;
use crate::store::Snapshot;

/// Parameters for [`crate::AnalyticsAggregator::statistics`]. Dates are
/// inclusive and either may be left open.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
  pub subject_id: Option<Uuid>,
  pub student_id: Option<Uuid>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
  pub total_sessions:        u64,
  pub present_count:         u64,
  pub absent_count:          u64,
  pub late_count:            u64,
  pub attendance_percentage: Option<f64>,
}

/// With a student, only sessions holding that student's record count and
/// only that student's records are tallied.
pub fn statistics(snapshot: &Snapshot, student_id: Option<Uuid>) -> Statistics {
  let records = snapshot.records.iter().filter(|r| student_id.is_none_or(|id| id == r.student_id));

  let (total_sessions, tally) = match student_id {
    None => (snapshot.sessions.len() as u64, records.map(|r| r.status).collect::<Tally>()),
    Some(_) => {
      let mut sessions = HashSet::new();
      let mut tally = Tally::default();
      for record in records {
        sessions.insert(record.session_id);
        tally.add(record.status);
      }
      (sessions.len() as u64, tally)
    }
  };

  Statistics {
    total_sessions,
    present_count: tally.present,
    absent_count: tally.absent,
    late_count: tally.late,
    attendance_percentage: tally.record_percentage(),
  }
}
