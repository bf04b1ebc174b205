//! [`BroadcastNotifier`]: fans published events out to in-process
//! subscribers.

use rollcall_core::{Event, Notifier};
use tokio::sync::broadcast;

/// A [`Notifier`] backed by a [`broadcast`] channel. Transports (websocket
/// hubs, loggers) call [`BroadcastNotifier::subscribe`] and forward what they
/// receive. Slow subscribers lose the oldest events.
#[derive(Clone)]
pub struct BroadcastNotifier {
  tx: broadcast::Sender<Event>,
}

impl BroadcastNotifier {
  /// `capacity` is clamped to at least one buffered event.
  pub fn new(capacity: usize) -> Self {
    let (tx, _) = broadcast::channel(capacity.max(1));
    Self { tx }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<Event> { self.tx.subscribe() }
}

impl Notifier for BroadcastNotifier {
  fn publish(&self, event: Event) {
    let name = event.name();
    if self.tx.send(event).is_err() {
      tracing::trace!(event = name, "no event subscribers");
    }
  }
}
