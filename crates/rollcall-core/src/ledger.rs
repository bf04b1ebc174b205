//! [`AttendanceLedger`]: record upserts and atomic bulk writes.
//!
//! Authorization is delegated to [`SessionRegistry::writable_session`] and
//! always runs before any write.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  event::{Event, Notifier},
  record::{BatchOutcome, MarkRecord, RecordView, RecordWrite},
  registry::SessionRegistry,
  scope::Principal,
  store::{AttendanceStore, IntoCore as _},
};

pub struct AttendanceLedger<S> {
  store:    Arc<S>,
  registry: Arc<SessionRegistry<S>>,
  notifier: Arc<dyn Notifier>,
}

impl<S: AttendanceStore> AttendanceLedger<S> {
  pub fn new(
    store: Arc<S>,
    registry: Arc<SessionRegistry<S>>,
    notifier: Arc<dyn Notifier>,
  ) -> Self {
    Self { store, registry, notifier }
  }

  /// Create or fully replace one student's record for a session.
  pub async fn mark_one(
    &self,
    session_id: Uuid,
    mark: MarkRecord,
    principal: &Principal,
  ) -> Result<RecordView> {
    check_confidence(&mark)?;
    self.registry.writable_session(session_id, principal).await?;

    let view = self
      .store
      .upsert_record(RecordWrite { session_id, marked_by: principal.id, mark })
      .await
      .into_core()?;
    tracing::debug!(
      %session_id,
      student_id = %view.record.student_id,
      status = ?view.record.status,
      "attendance marked"
    );

    self.notifier.publish(Event::AttendanceMarked(view.clone()));
    Ok(view)
  }

  /// Write a whole batch atomically and return how many entries were applied.
  ///
  /// Entries are applied in input order, so a later entry for the same
  /// student wins. If any entry fails nothing is kept and the error lists
  /// every failing entry.
  pub async fn mark_bulk(
    &self,
    session_id: Uuid,
    marks: Vec<MarkRecord>,
    principal: &Principal,
  ) -> Result<usize> {
    if marks.is_empty() {
      return Err(Error::validation("records array is required"));
    }
    marks.iter().try_for_each(check_confidence)?;
    self.registry.writable_session(session_id, principal).await?;

    match self.store.write_batch(session_id, principal.id, marks).await.into_core()? {
      BatchOutcome::Committed { count } => {
        tracing::info!(%session_id, count, "bulk attendance committed");
        self.notifier.publish(Event::BulkAttendanceMarked { session_id, count });
        Ok(count)
      }
      BatchOutcome::RolledBack { failures } => {
        tracing::warn!(%session_id, failed = failures.len(), "bulk attendance rolled back");
        Err(Error::BatchRejected { failures })
      }
    }
  }

  pub async fn list_records(&self, session_id: Uuid) -> Result<Vec<RecordView>> {
    self.store.list_records(session_id).await.into_core()
  }
}

fn check_confidence(mark: &MarkRecord) -> Result<()> {
  match mark.confidence_score {
    Some(score) if !score.is_finite() => Err(Error::validation(format!(
      "confidence score for student {} must be a finite number",
      mark.student_id
    ))),
    _ => Ok(()),
  }
}
