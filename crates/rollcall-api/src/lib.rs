//! JSON REST API for Rollcall.
//!
//! Exposes an axum [`Router`] over the attendance services, backed by any
//! [`AttendanceStore`]. Authentication, TLS, and transport concerns are the
//! caller's responsibility; the authenticated principal arrives in request
//! headers (see [`principal`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rollcall_api::api_router(state))
//! ```

pub mod analytics;
pub mod error;
pub mod extract;
pub mod notify;
pub mod principal;
pub mod records;
pub mod sessions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use rollcall_core::{
  AnalyticsAggregator, AttendanceLedger, AttendanceStore, Notifier, SessionRegistry,
};

pub use error::ApiError;
pub use notify::BroadcastNotifier;
pub use principal::Caller;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub registry:  Arc<SessionRegistry<S>>,
  pub ledger:    Arc<AttendanceLedger<S>>,
  pub analytics: Arc<AnalyticsAggregator<S>>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      registry:  self.registry.clone(),
      ledger:    self.ledger.clone(),
      analytics: self.analytics.clone(),
    }
  }
}

impl<S: AttendanceStore> AppState<S> {
  /// Wire every service to one store and one notifier.
  pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>) -> Self {
    let registry = Arc::new(SessionRegistry::new(store.clone(), notifier.clone()));
    let ledger = Arc::new(AttendanceLedger::new(store.clone(), registry.clone(), notifier));
    let analytics = Arc::new(AnalyticsAggregator::new(store));
    Self { registry, ledger, analytics }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router over `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: AttendanceStore + 'static,
{
  Router::new()
    // Sessions
    .route("/attendance/sessions", get(sessions::list::<S>).post(sessions::create::<S>))
    .route("/attendance/sessions/{id}", get(sessions::get_one::<S>))
    // Records
    .route(
      "/attendance/sessions/{id}/records",
      get(records::list::<S>).post(records::mark::<S>),
    )
    .route("/attendance/sessions/{id}/bulk-records", post(records::mark_bulk::<S>))
    .route("/attendance/stats", get(records::stats::<S>))
    // Analytics
    .route("/analytics/dashboard", get(analytics::dashboard::<S>))
    .route("/analytics/trends", get(analytics::trends::<S>))
    .route("/analytics/report", get(analytics::report::<S>))
    .with_state(state)
}
