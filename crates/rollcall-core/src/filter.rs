//! [`SessionFilter`]: a typed predicate over sessions joined with their
//! subject.
//!
//! Storage backends translate the filter into their own query language; the
//! in-memory [`SessionFilter::matches`] is the reference semantics every
//! translation must agree with.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{directory::Subject, scope::AccessScope, session::Session};

/// Composable session predicate. All set terms are ANDed together; an empty
/// filter matches every session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
  pub scope:       AccessScope,
  pub subject_id:  Option<Uuid>,
  /// Exact calendar date.
  pub date:        Option<NaiveDate>,
  /// Inclusive lower bound on the session date.
  pub from:        Option<NaiveDate>,
  /// Inclusive upper bound on the session date.
  pub until:       Option<NaiveDate>,
  pub active_only: bool,
}

impl SessionFilter {
  pub fn new() -> Self { Self::default() }

  pub fn scoped(mut self, scope: AccessScope) -> Self {
    self.scope = scope;
    self
  }

  pub fn subject(mut self, subject_id: Option<Uuid>) -> Self {
    self.subject_id = subject_id;
    self
  }

  pub fn on(mut self, date: Option<NaiveDate>) -> Self {
    self.date = date;
    self
  }

  pub fn since(mut self, from: NaiveDate) -> Self {
    self.from = Some(from);
    self
  }

  pub fn between(mut self, from: NaiveDate, until: NaiveDate) -> Self {
    self.from = Some(from);
    self.until = Some(until);
    self
  }

  pub fn active_only(mut self) -> Self {
    self.active_only = true;
    self
  }

  /// Evaluate the filter against a session and the subject it belongs to.
  pub fn matches(&self, session: &Session, subject: &Subject) -> bool {
    if session.subject_id != subject.id || !self.scope.permits(subject.teacher_id) {
      return false;
    }
    if self.active_only && !session.is_active {
      return false;
    }
    if self.subject_id.is_some_and(|id| id != session.subject_id) {
      return false;
    }
    if self.date.is_some_and(|d| d != session.date) {
      return false;
    }
    if self.from.is_some_and(|d| session.date < d) {
      return false;
    }
    if self.until.is_some_and(|d| session.date > d) {
      return false;
    }
    true
  }
}
