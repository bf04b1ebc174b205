//! Core types, services and trait definitions for the Rollcall attendance
//! ledger.
//!
//! This crate has no HTTP or database dependencies. The
//! services ([`SessionRegistry`], [`AttendanceLedger`],
//! [`AnalyticsAggregator`]) receive an [`AttendanceStore`] implementation
//! and a [`Notifier`] at construction time; nothing is reached through
//! globals.

pub mod analytics;
pub mod directory;
pub mod error;
pub mod event;
pub mod filter;
pub mod ledger;
pub mod record;
pub mod registry;
pub mod scope;
pub mod session;
pub mod store;

pub use analytics::AnalyticsAggregator;
pub use error::{Error, Result};
pub use event::{Event, Notifier};
pub use ledger::AttendanceLedger;
pub use registry::SessionRegistry;
pub use scope::{AccessScope, Principal, Role};
pub use store::AttendanceStore;

#[cfg(test)]
pub(crate) mod testing;
