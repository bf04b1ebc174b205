//! [`SessionRegistry`]: session lifecycle and ownership checks.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  event::{Event, Notifier},
  filter::SessionFilter,
  scope::Principal,
  session::{NewSession, Session},
  store::{AttendanceStore, IntoCore as _},
};

/// Default page size for [`SessionRegistry::list_sessions`].
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Parameters for [`SessionRegistry::list_sessions`].
#[derive(Debug, Clone, Deserialize)]
pub struct SessionListQuery {
  pub subject_id: Option<Uuid>,
  pub date:       Option<NaiveDate>,
  #[serde(default = "default_limit")]
  pub limit:      usize,
}

fn default_limit() -> usize { DEFAULT_LIST_LIMIT }

impl Default for SessionListQuery {
  fn default() -> Self { Self { subject_id: None, date: None, limit: DEFAULT_LIST_LIMIT } }
}

pub struct SessionRegistry<S> {
  store:    Arc<S>,
  notifier: Arc<dyn Notifier>,
}

impl<S: AttendanceStore> SessionRegistry<S> {
  pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>) -> Self { Self { store, notifier } }

  /// Create a session for an active subject the principal may schedule.
  ///
  /// A teacher asking for someone else's subject gets the same `NotFound` as
  /// for a missing one.
  pub async fn create_session(&self, input: NewSession, principal: &Principal) -> Result<Session> {
    let session = input.into_session(principal.id, Utc::now())?;

    let scope = principal.scope();
    self
      .store
      .get_subject(session.subject_id)
      .await
      .into_core()?
      .filter(|subject| subject.is_active && scope.permits(subject.teacher_id))
      .ok_or_else(|| {
        Error::not_found(format!("subject {} not found or access denied", session.subject_id))
      })?;

    let session = self.store.insert_session(session).await.into_core()?;
    tracing::info!(
      session_id = %session.id,
      subject_id = %session.subject_id,
      date = %session.date,
      "session created"
    );

    self.notifier.publish(Event::SessionCreated(session.clone()));
    Ok(session)
  }

  pub async fn get_session(&self, id: Uuid) -> Result<Session> {
    self
      .store
      .get_session(id)
      .await
      .into_core()?
      .ok_or_else(|| Error::not_found(format!("session {id} not found")))
  }

  /// Active sessions visible to `principal`, newest first.
  pub async fn list_sessions(
    &self,
    query: &SessionListQuery,
    principal: &Principal,
  ) -> Result<Vec<Session>> {
    let filter = SessionFilter::new()
      .scoped(principal.scope())
      .subject(query.subject_id)
      .on(query.date)
      .active_only();
    self.store.list_sessions(&filter, query.limit).await.into_core()
  }

  /// Resolve a session that `principal` may record attendance for.
  ///
  /// Fails `NotFound` for a missing or inactive session and `Forbidden` when
  /// a teacher does not own the session's subject.
  pub async fn writable_session(&self, id: Uuid, principal: &Principal) -> Result<Session> {
    let session = self
      .store
      .get_session(id)
      .await
      .into_core()?
      .filter(|s| s.is_active)
      .ok_or_else(|| Error::not_found(format!("session {id} not found")))?;

    let subject = self
      .store
      .get_subject(session.subject_id)
      .await
      .into_core()?
      .ok_or_else(|| Error::not_found(format!("subject {} not found", session.subject_id)))?;

    if !principal.scope().permits(subject.teacher_id) {
      return Err(Error::forbidden(format!("no access to session {id}")));
    }
    Ok(session)
  }
}
