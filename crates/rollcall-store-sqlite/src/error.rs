//! Error type for `rollcall-store-sqlite`.

use rusqlite::ffi;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown {column} value: {value:?}")]
  UnknownVariant { column: &'static str, value: String },

  /// A record referenced a student that does not exist.
  #[error("student not found: {0}")]
  StudentNotFound(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// Whether this is a primary-key or unique-index violation.
  pub fn is_unique_violation(&self) -> bool {
    let Self::Database(tokio_rusqlite::Error::Rusqlite(err)) = self else {
      return false;
    };
    has_extended_code(err, ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
      || has_extended_code(err, ffi::SQLITE_CONSTRAINT_UNIQUE)
  }
}

/// Whether `err` is a foreign-key violation.
pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
  has_extended_code(err, ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

fn has_extended_code(err: &rusqlite::Error, code: std::ffi::c_int) -> bool {
  matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.extended_code == code)
}

impl From<Error> for rollcall_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::StudentNotFound(id) => Self::not_found(format!("student {id} not found")),
      err if err.is_unique_violation() => Self::Conflict(err.to_string()),
      err => Self::Storage(Box::new(err)),
    }
  }
}
