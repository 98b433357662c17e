//! Entity types and write payloads.
//!
//! Row structs decode straight from the store via `sqlx::FromRow`; the
//! `New*`/`Update*` structs are the write payloads the route layer
//! deserializes. All `created_at` values are RFC 3339 strings set once at
//! insert time.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::contact::GuardianContact;
use crate::error::Result;

/// Current wall-clock time as an RFC 3339 string, the `created_at` format
/// used across all tables.
pub(crate) fn now_iso() -> Result<String> {
   Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}

/// Account role. Immutable through the login flow; mutable only via the
/// accounts repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
   Admin,
   Teacher,
   Student,
}

impl Role {
   pub fn as_str(&self) -> &'static str {
      match self {
         Role::Admin => "admin",
         Role::Teacher => "teacher",
         Role::Student => "student",
      }
   }
}

/// A login account. The password hash is never decoded into this type.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Account {
   pub id: i64,
   pub username: String,
   pub role: Role,
   pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
   pub username: String,
   pub password: String,
   #[serde(default)]
   pub role: Option<Role>,
}

/// Partial account update: password only, role only, or both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAccount {
   #[serde(default)]
   pub password: Option<String>,
   #[serde(default)]
   pub role: Option<Role>,
}

/// A student row as stored, with the guardian-contact blob still encoded.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentRow {
   pub id: i64,
   pub student_id: String,
   pub name: String,
   pub gender: String,
   pub age: Option<i64>,
   pub contact: Option<String>,
   pub family_info: Option<String>,
   pub class_name: Option<String>,
   pub teacher: Option<String>,
   pub created_at: String,
}

/// API view of a student with the guardian-contact blob decoded into
/// separate email/address fields.
#[derive(Debug, Clone, Serialize)]
pub struct Student {
   pub id: i64,
   pub student_id: String,
   pub name: String,
   pub gender: String,
   pub age: Option<i64>,
   pub phone: String,
   pub email: String,
   pub address: String,
   pub class_name: Option<String>,
   pub teacher_name: String,
   pub created_at: String,
}

impl From<StudentRow> for Student {
   fn from(row: StudentRow) -> Self {
      let contact = GuardianContact::decode(row.family_info.as_deref().unwrap_or(""));
      Self {
         id: row.id,
         student_id: row.student_id,
         name: row.name,
         gender: row.gender,
         age: row.age,
         phone: row.contact.unwrap_or_default(),
         email: contact.email,
         address: contact.address,
         class_name: row.class_name,
         teacher_name: row.teacher.unwrap_or_default(),
         created_at: row.created_at,
      }
   }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStudent {
   pub student_id: String,
   pub name: String,
   pub gender: String,
   #[serde(default)]
   pub age: Option<i64>,
   #[serde(default)]
   pub phone: Option<String>,
   #[serde(default)]
   pub email: Option<String>,
   #[serde(default)]
   pub address: Option<String>,
   #[serde(default)]
   pub class_name: Option<String>,
   #[serde(default)]
   pub teacher_name: Option<String>,
}

/// Full student update keyed by business key; `student_id` itself is
/// immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStudent {
   pub name: String,
   pub gender: String,
   #[serde(default)]
   pub age: Option<i64>,
   #[serde(default)]
   pub phone: Option<String>,
   #[serde(default)]
   pub email: Option<String>,
   #[serde(default)]
   pub address: Option<String>,
   #[serde(default)]
   pub class_name: Option<String>,
   #[serde(default)]
   pub teacher_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Course {
   pub id: i64,
   pub course_code: Option<String>,
   pub course_name: String,
   pub teacher: Option<String>,
   pub credits: Option<i64>,
   pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCourse {
   #[serde(default)]
   pub course_code: Option<String>,
   pub course_name: String,
   #[serde(default)]
   pub teacher: Option<String>,
   #[serde(default)]
   pub credits: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourse {
   pub course_name: String,
   #[serde(default)]
   pub teacher: Option<String>,
   #[serde(default)]
   pub credits: Option<i64>,
}

/// An enrollment joined with its course and student columns, as returned by
/// list and get operations.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Enrollment {
   pub id: i64,
   pub student_id: String,
   pub course_id: i64,
   pub exam_score: Option<f64>,
   pub daily_score: Option<f64>,
   pub final_score: Option<f64>,
   pub semester: Option<String>,
   pub created_at: String,
   pub course_code: Option<String>,
   pub course_name: Option<String>,
   pub teacher: Option<String>,
   pub credits: Option<i64>,
   pub student_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEnrollment {
   pub student_id: String,
   pub course_id: i64,
   #[serde(default)]
   pub exam_score: Option<f64>,
   #[serde(default)]
   pub daily_score: Option<f64>,
   #[serde(default)]
   pub semester: Option<String>,
}

/// Partial enrollment update. Scores are always rewritten (absent means 0);
/// a changed student or course reference is re-validated against the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEnrollment {
   #[serde(default)]
   pub student_id: Option<String>,
   #[serde(default)]
   pub course_id: Option<i64>,
   #[serde(default)]
   pub exam_score: Option<f64>,
   #[serde(default)]
   pub daily_score: Option<f64>,
   #[serde(default)]
   pub semester: Option<String>,
}

/// Attendance status value counted as present by the statistics module.
pub const STATUS_PRESENT: &str = "present";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AttendanceRecord {
   pub id: i64,
   pub student_id: String,
   pub course_id: Option<i64>,
   pub date: String,
   pub status: String,
   pub reason: Option<String>,
   pub created_at: String,
   pub student_name: Option<String>,
   pub class_name: Option<String>,
   pub course_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAttendance {
   pub student_id: String,
   pub date: String,
   pub status: String,
   #[serde(default)]
   pub course_id: Option<i64>,
   #[serde(default)]
   pub reason: Option<String>,
}

/// Partial attendance update. A `course_id` of 0 clears the course
/// reference to NULL (legacy payload convention).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAttendance {
   #[serde(default)]
   pub student_id: Option<String>,
   #[serde(default)]
   pub course_id: Option<i64>,
   #[serde(default)]
   pub date: Option<String>,
   pub status: String,
   #[serde(default)]
   pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RewardPunishment {
   pub id: i64,
   pub student_id: String,
   #[sqlx(rename = "type")]
   #[serde(rename = "type")]
   pub kind: String,
   pub title: String,
   pub description: Option<String>,
   pub date: String,
   pub created_at: String,
   pub student_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRewardPunishment {
   pub student_id: String,
   #[serde(rename = "type")]
   pub kind: String,
   pub title: String,
   #[serde(default)]
   pub description: Option<String>,
   pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRewardPunishment {
   #[serde(rename = "type")]
   pub kind: String,
   pub title: String,
   #[serde(default)]
   pub description: Option<String>,
   pub date: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Guardian {
   pub id: i64,
   pub student_id: String,
   pub name: String,
   pub relationship: String,
   pub phone: String,
   pub email: Option<String>,
   pub address: Option<String>,
   pub created_at: String,
   pub student_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGuardian {
   pub student_id: String,
   pub name: String,
   pub relationship: String,
   pub phone: String,
   #[serde(default)]
   pub email: Option<String>,
   #[serde(default)]
   pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGuardian {
   pub name: String,
   pub relationship: String,
   pub phone: String,
   #[serde(default)]
   pub email: Option<String>,
   #[serde(default)]
   pub address: Option<String>,
}
