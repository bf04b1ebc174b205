//! Counting and rounding primitives shared by every aggregate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::RecordStatus;

/// `numerator / denominator * 100`, rounded half-up to two decimals.
/// `None` when the denominator is zero.
pub fn percentage(numerator: u64, denominator: u64) -> Option<f64> {
  if denominator == 0 {
    return None;
  }
  // Work in hundredths of a percent so the rounding step sees the exact
  // quotient rather than an already-scaled float.
  let hundredths = (numerator as f64 * 10_000.0 / denominator as f64).round();
  Some(hundredths / 100.0)
}

/// Per-status record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
  pub present: u64,
  pub absent:  u64,
  pub late:    u64,
  pub excused: u64,
}

impl Tally {
  pub fn add(&mut self, status: RecordStatus) {
    match status {
      RecordStatus::Present => self.present += 1,
      RecordStatus::Absent => self.absent += 1,
      RecordStatus::Late => self.late += 1,
      RecordStatus::Excused => self.excused += 1,
    }
  }

  /// Every record counted, whatever its status.
  pub fn total(&self) -> u64 { self.present + self.absent + self.late + self.excused }

  /// Present records over all records.
  pub fn record_percentage(&self) -> Option<f64> { percentage(self.present, self.total()) }
}

impl FromIterator<RecordStatus> for Tally {
  fn from_iter<I: IntoIterator<Item = RecordStatus>>(iter: I) -> Self {
    let mut tally = Tally::default();
    iter.into_iter().for_each(|s| tally.add(s));
    tally
  }
}

/// Width of a trend bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
  #[default]
  Day,
  /// Monday-based `%Y-%W` weeks. A week that spans New Year is split into
  /// two buckets, e.g. 2025-12-29 is `2025-52` but 2026-01-01 is `2026-00`.
  Week,
  Month,
}

impl GroupBy {
  /// The period key a date falls into. Keys sort chronologically as strings.
  ///
  /// Weeks are numbered `00`–`53` with Monday as the first day; days before
  /// the year's first Monday fall into week `00`.
  pub fn key(&self, date: NaiveDate) -> String {
    match self {
      Self::Day => date.format("%Y-%m-%d").to_string(),
      Self::Week => date.format("%Y-%W").to_string(),
      Self::Month => date.format("%Y-%m").to_string(),
    }
  }
}

/// Aggregate over the sessions of one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
  pub period:                String,
  pub total_sessions:        u64,
  pub total_records:         u64,
  pub present_count:         u64,
  pub absent_count:          u64,
  pub late_count:            u64,
  pub attendance_percentage: Option<f64>,
}

impl Bucket {
  pub fn new(period: String, total_sessions: u64, tally: &Tally) -> Self {
    Self {
      period,
      total_sessions,
      total_records: tally.total(),
      present_count: tally.present,
      absent_count: tally.absent,
      late_count: tally.late,
      attendance_percentage: tally.record_percentage(),
    }
  }
}
