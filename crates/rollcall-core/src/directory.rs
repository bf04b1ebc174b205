//! Directory rows owned by external collaborators: subjects, students and
//! enrollments. The ledger reads them; it never creates or edits them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A taught course. `teacher_id` drives [`crate::AccessScope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
  pub id:         Uuid,
  pub code:       String,
  pub name:       String,
  pub teacher_id: Option<Uuid>,
  pub department: Option<String>,
  pub year:       Option<i64>,
  pub is_active:  bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
  pub id:            Uuid,
  pub enrollment_no: String,
  pub name:          String,
  pub department:    Option<String>,
  pub year:          Option<i64>,
  pub is_active:     bool,
}

/// Membership of a student in a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
  pub student_id: Uuid,
  pub subject_id: Uuid,
  pub is_active:  bool,
}
