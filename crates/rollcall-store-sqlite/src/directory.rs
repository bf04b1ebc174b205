//! Directory writes for collaborators that own subjects, students and
//! enrollments. The ledger itself only reads these tables.

use rollcall_core::directory::{Enrollment, Student, Subject};
use rusqlite::params;
use uuid::Uuid;

use crate::{Result, SqliteStore, encode::encode_uuid};

impl SqliteStore {
  /// Insert or update a subject by id.
  pub async fn put_subject(&self, subject: &Subject) -> Result<()> {
    let id_str      = encode_uuid(subject.id);
    let code        = subject.code.clone();
    let name        = subject.name.clone();
    let teacher_str = subject.teacher_id.map(encode_uuid);
    let department  = subject.department.clone();
    let year        = subject.year;
    let is_active   = subject.is_active;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (id, code, name, teacher_id, department, year, is_active)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT (id) DO UPDATE SET
             code       = excluded.code,
             name       = excluded.name,
             teacher_id = excluded.teacher_id,
             department = excluded.department,
             year       = excluded.year,
             is_active  = excluded.is_active",
          params![id_str, code, name, teacher_str, department, year, is_active],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or update a student by id.
  pub async fn put_student(&self, student: &Student) -> Result<()> {
    let id_str        = encode_uuid(student.id);
    let enrollment_no = student.enrollment_no.clone();
    let name          = student.name.clone();
    let department    = student.department.clone();
    let year          = student.year;
    let is_active     = student.is_active;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO students (id, enrollment_no, name, department, year, is_active)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (id) DO UPDATE SET
             enrollment_no = excluded.enrollment_no,
             name          = excluded.name,
             department    = excluded.department,
             year          = excluded.year,
             is_active     = excluded.is_active",
          params![id_str, enrollment_no, name, department, year, is_active],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or update the membership of a student in a subject.
  pub async fn put_enrollment(&self, enrollment: Enrollment) -> Result<()> {
    let student_str = encode_uuid(enrollment.student_id);
    let subject_str = encode_uuid(enrollment.subject_id);
    let is_active   = enrollment.is_active;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO enrollments (student_id, subject_id, is_active) VALUES (?1, ?2, ?3)
           ON CONFLICT (student_id, subject_id) DO UPDATE SET is_active = excluded.is_active",
          params![student_str, subject_str, is_active],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Set a session's active flag. Returns `false` if no such session exists.
  pub async fn set_session_active(&self, id: Uuid, active: bool) -> Result<bool> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE attendance_sessions SET is_active = ?2 WHERE id = ?1",
          params![id_str, active],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}
