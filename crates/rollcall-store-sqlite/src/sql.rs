//! Rendering of [`SessionFilter`] into SQL.
//!
//! The rendered clause assumes `attendance_sessions ats` joined with
//! `subjects s` and uses anonymous `?` placeholders, bound in order from
//! [`Where::params`].

use rollcall_core::{AccessScope, filter::SessionFilter};
use rusqlite::types::Value;

use crate::encode::{encode_date, encode_uuid};

/// A `WHERE` clause (empty when unconstrained) and its positional values.
#[derive(Debug, Default, PartialEq)]
pub struct Where {
  pub clause: String,
  pub params: Vec<Value>,
}

impl Where {
  /// Terms of `filter` that constrain sessions.
  pub fn sessions(filter: &SessionFilter) -> Self {
    let mut terms = Terms::default();
    terms.scope(filter.scope);
    if let Some(id) = filter.subject_id {
      terms.push("ats.subject_id = ?", Value::Text(encode_uuid(id)));
    }
    if let Some(date) = filter.date {
      terms.push("ats.date = ?", Value::Text(encode_date(date)));
    }
    if let Some(from) = filter.from {
      terms.push("ats.date >= ?", Value::Text(encode_date(from)));
    }
    if let Some(until) = filter.until {
      terms.push("ats.date <= ?", Value::Text(encode_date(until)));
    }
    if filter.active_only {
      terms.conds.push("ats.is_active = 1");
    }
    terms.finish()
  }

  /// Only the ownership term, for queries over `subjects s` alone.
  pub fn subjects(scope: AccessScope) -> Self {
    let mut terms = Terms::default();
    terms.scope(scope);
    terms.finish()
  }
}

#[derive(Default)]
struct Terms {
  conds:  Vec<&'static str>,
  params: Vec<Value>,
}

impl Terms {
  fn push(&mut self, cond: &'static str, value: Value) {
    self.conds.push(cond);
    self.params.push(value);
  }

  fn scope(&mut self, scope: AccessScope) {
    if let Some(owner) = scope.owner() {
      self.push("s.teacher_id = ?", Value::Text(encode_uuid(owner)));
    }
  }

  fn finish(self) -> Where {
    let clause = if self.conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.conds.join(" AND "))
    };
    Where { clause, params: self.params }
  }
}
