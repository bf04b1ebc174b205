//! Principals and the role-derived visibility rule applied to every
//! subject-owned row.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role an authenticated actor carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Teacher,
}

impl std::str::FromStr for Role {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "admin" => Ok(Self::Admin),
      "teacher" => Ok(Self::Teacher),
      other => Err(format!("unknown role: {other:?}")),
    }
  }
}

/// The authenticated actor issuing a request. Issued by an external
/// authentication layer; this crate only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub id:   Uuid,
  pub role: Role,
}

impl Principal {
  pub fn admin(id: Uuid) -> Self { Self { id, role: Role::Admin } }

  pub fn teacher(id: Uuid) -> Self { Self { id, role: Role::Teacher } }

  pub fn scope(&self) -> AccessScope { AccessScope::for_principal(self) }
}

/// Visibility restriction over rows that join through a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessScope {
  /// Every row is visible.
  #[default]
  Unrestricted,
  /// Only rows whose subject is taught by this user.
  OwnedBy(Uuid),
}

impl AccessScope {
  pub fn for_principal(principal: &Principal) -> Self {
    match principal.role {
      Role::Admin => Self::Unrestricted,
      Role::Teacher => Self::OwnedBy(principal.id),
    }
  }

  /// Whether a row owned by a subject with `teacher_id` is visible.
  /// A subject without a teacher is only visible to admins.
  pub fn permits(&self, teacher_id: Option<Uuid>) -> bool {
    match self {
      Self::Unrestricted => true,
      Self::OwnedBy(id) => teacher_id == Some(*id),
    }
  }

  /// The teacher id the scope is pinned to, if any.
  pub fn owner(&self) -> Option<Uuid> {
    match self {
      Self::Unrestricted => None,
      Self::OwnedBy(id) => Some(*id),
    }
  }
}
