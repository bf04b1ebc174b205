//! Attendance records: the outcome for one student in one session.
//!
//! A record is keyed by `(session_id, student_id)`. Writes replace the whole
//! row; no prior version is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RecordFailure;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
  #[default]
  Present,
  Absent,
  Late,
  Excused,
}

/// How the record was captured. `FaceRecognition` is accepted as a tag only.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MarkMethod {
  #[default]
  Manual,
  FaceRecognition,
  QrCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
  pub session_id:       Uuid,
  pub student_id:       Uuid,
  pub status:           RecordStatus,
  pub method:           MarkMethod,
  pub confidence_score: Option<f64>,
  pub marked_by:        Uuid,
  /// Store-assigned on every write.
  pub marked_at:        DateTime<Utc>,
  pub notes:            Option<String>,
}

/// A record joined with the identity of its student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordView {
  #[serde(flatten)]
  pub record:        Record,
  pub student_name:  String,
  pub enrollment_no: String,
}

/// One entry of a mark request, as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkRecord {
  pub student_id:       Uuid,
  #[serde(default)]
  pub status:           RecordStatus,
  #[serde(default)]
  pub method:           MarkMethod,
  pub confidence_score: Option<f64>,
  pub notes:            Option<String>,
}

impl MarkRecord {
  /// Convenience constructor for a manual mark with no score or notes.
  pub fn new(student_id: Uuid, status: RecordStatus) -> Self {
    Self {
      student_id,
      status,
      method: MarkMethod::default(),
      confidence_score: None,
      notes: None,
    }
  }
}

/// A fully-attributed write handed to the store. `marked_at` is set by the
/// store, not the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordWrite {
  pub session_id: Uuid,
  pub marked_by:  Uuid,
  pub mark:       MarkRecord,
}

/// Result of an atomic batch write.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
  /// Every entry was applied and the transaction committed.
  Committed { count: usize },
  /// At least one entry failed; nothing was applied.
  RolledBack { failures: Vec<RecordFailure> },
}
