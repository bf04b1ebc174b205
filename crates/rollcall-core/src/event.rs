//! Domain events published after successful writes, and the port they are
//! published through.
//!
//! Delivery (websockets, queues, …) belongs to whoever implements
//! [`Notifier`]; publishing never fails and never blocks a write.

use serde::Serialize;
use uuid::Uuid;

use crate::{record::RecordView, session::Session};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum Event {
  /// Broadcast to everyone.
  SessionCreated(Session),
  /// Scoped to the session's room.
  AttendanceMarked(RecordView),
  /// Scoped to the session's room.
  BulkAttendanceMarked { session_id: Uuid, count: usize },
}

impl Event {
  /// Wire name of the event.
  pub fn name(&self) -> &'static str {
    match self {
      Self::SessionCreated(_) => "session-created",
      Self::AttendanceMarked(_) => "attendance-marked",
      Self::BulkAttendanceMarked { .. } => "bulk-attendance-marked",
    }
  }

  /// The room the event is addressed to; `None` means every listener.
  pub fn room(&self) -> Option<String> {
    match self {
      Self::SessionCreated(_) => None,
      Self::AttendanceMarked(view) => Some(session_room(view.record.session_id)),
      Self::BulkAttendanceMarked { session_id, .. } => Some(session_room(*session_id)),
    }
  }
}

pub fn session_room(session_id: Uuid) -> String { format!("session-{session_id}") }

/// Outbound port for [`Event`]s.
pub trait Notifier: Send + Sync {
  fn publish(&self, event: Event);
}
