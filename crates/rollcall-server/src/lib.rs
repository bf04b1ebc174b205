//! HTTP server wiring for Rollcall.
//!
//! Mounts [`rollcall_api::api_router`] under `/api`, adds request tracing,
//! and logs every published domain event.

use std::path::PathBuf;

use axum::Router;
use rollcall_api::{AppState, BroadcastNotifier, api_router};
use rollcall_core::AttendanceStore;
use serde::Deserialize;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `rollcall.toml` and
/// `ROLLCALL_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// Events buffered per subscriber before the slowest one starts lagging.
  #[serde(default = "default_event_capacity")]
  pub event_capacity: usize,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 5000 }
fn default_store_path() -> PathBuf { PathBuf::from("rollcall.db") }
fn default_event_capacity() -> usize { 256 }

// ─── App ──────────────────────────────────────────────────────────────────────

/// The full application: the API under `/api`, wrapped in an HTTP trace layer.
pub fn build_app<S>(state: AppState<S>) -> Router
where
  S: AttendanceStore + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

/// Log every event published through `notifier` until it is dropped.
pub fn spawn_event_log(notifier: &BroadcastNotifier) -> JoinHandle<()> {
  let mut rx = notifier.subscribe();
  tokio::spawn(async move {
    loop {
      match rx.recv().await {
        Ok(event) => {
          tracing::info!(event = event.name(), room = ?event.room(), "event published");
        }
        Err(RecvError::Lagged(skipped)) => {
          tracing::warn!(skipped, "event log fell behind");
        }
        Err(RecvError::Closed) => break,
      }
    }
  })
}
