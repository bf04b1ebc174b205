//! Error types for `rollcall-core`.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// One entry of a rejected bulk write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
  /// Position of the entry in the submitted batch.
  pub index:      usize,
  /// `None` when the entry was too malformed to name a student.
  pub student_id: Option<Uuid>,
  pub error:      String,
}

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or malformed required input.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// The principal does not own the subject-owned row it tried to touch.
  #[error("forbidden: {0}")]
  Forbidden(String),

  /// A uniqueness violation outside the record upsert path.
  #[error("conflict: {0}")]
  Conflict(String),

  /// A bulk write was rolled back; every failing entry is listed.
  #[error("{} record(s) failed to save", failures.len())]
  BatchRejected { failures: Vec<RecordFailure> },

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

  pub fn not_found(msg: impl Into<String>) -> Self { Self::NotFound(msg.into()) }

  pub fn forbidden(msg: impl Into<String>) -> Self { Self::Forbidden(msg.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
