//! Sessions are scheduled occurrences of a subject for which attendance may be
//! recorded.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// The kind of teaching event a session represents.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
  #[default]
  Lecture,
  Lab,
  Tutorial,
  Exam,
}

/// A persisted session. Immutable after creation apart from `is_active`,
/// which external tooling may clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub id:           Uuid,
  pub subject_id:   Uuid,
  pub name:         String,
  pub date:         NaiveDate,
  pub start_time:   Option<NaiveTime>,
  pub end_time:     Option<NaiveTime>,
  pub location:     Option<String>,
  pub session_type: SessionType,
  pub is_active:    bool,
  pub created_by:   Uuid,
  /// Server-assigned; never changes after creation.
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::SessionRegistry::create_session`].
///
/// The required fields are optional here so that absent input surfaces as a
/// [`Error::Validation`] rather than a deserialisation failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSession {
  pub subject_id:   Option<Uuid>,
  #[serde(alias = "session_name")]
  pub name:         Option<String>,
  pub date:         Option<NaiveDate>,
  pub start_time:   Option<NaiveTime>,
  pub end_time:     Option<NaiveTime>,
  pub location:     Option<String>,
  #[serde(default)]
  pub session_type: SessionType,
}

impl NewSession {
  /// Convenience constructor with all optional fields unset.
  pub fn new(subject_id: Uuid, name: impl Into<String>, date: NaiveDate) -> Self {
    Self {
      subject_id: Some(subject_id),
      name: Some(name.into()),
      date: Some(date),
      ..Self::default()
    }
  }

  /// Check required fields and build the row the store will persist.
  pub fn into_session(self, created_by: Uuid, created_at: DateTime<Utc>) -> Result<Session> {
    let subject_id = self.subject_id;
    let name = self.name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());
    let (Some(subject_id), Some(name), Some(date)) = (subject_id, name, self.date) else {
      return Err(Error::validation("subject id, session name, and date are required"));
    };

    if let (Some(start), Some(end)) = (self.start_time, self.end_time)
      && end < start
    {
      return Err(Error::validation("end time precedes start time"));
    }

    Ok(Session {
      id: Uuid::new_v4(),
      subject_id,
      name,
      date,
      start_time: self.start_time,
      end_time: self.end_time,
      location: self.location,
      session_type: self.session_type,
      is_active: true,
      created_by,
      created_at,
    })
  }
}
