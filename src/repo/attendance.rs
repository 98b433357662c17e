//! Attendance repository.
//!
//! The course link is optional: records predating the course column carry
//! NULL, and an update payload of `course_id = 0` clears the link back to
//! NULL.

use std::sync::Arc;

use school_conn::{BindValue, SqliteDatabase};

use crate::error::{Error, Result};
use crate::models::{AttendanceRecord, NewAttendance, UpdateAttendance, now_iso};
use crate::query::{ListQuery, Page, PageParams};
use crate::repo::{build_update_sql, course_exists, fetch_page, student_exists};

const JOINED_SELECT: &str = "SELECT a.*, s.name AS student_name, s.class_name, c.course_name \
                             FROM attendance a \
                             JOIN students s ON a.student_id = s.student_id \
                             LEFT JOIN courses c ON a.course_id = c.id";

pub struct AttendanceRepo {
   db: Arc<SqliteDatabase>,
}

impl AttendanceRepo {
   pub fn new(db: Arc<SqliteDatabase>) -> Self {
      Self { db }
   }

   pub async fn create(&self, input: &NewAttendance) -> Result<i64> {
      if input.student_id.trim().is_empty()
         || input.date.trim().is_empty()
         || input.status.trim().is_empty()
      {
         return Err(Error::InvalidRequest(
            "student_id, date and status are required".to_string(),
         ));
      }
      if !student_exists(&self.db, &input.student_id).await? {
         return Err(Error::InvalidRequest("student does not exist".to_string()));
      }
      if let Some(course_id) = input.course_id
         && !course_exists(&self.db, course_id).await?
      {
         return Err(Error::InvalidRequest("course does not exist".to_string()));
      }

      let result = self
         .db
         .execute_write(
            "INSERT INTO attendance (student_id, course_id, date, status, reason, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            &[
               input.student_id.as_str().into(),
               input.course_id.into(),
               input.date.as_str().into(),
               input.status.as_str().into(),
               input.reason.clone().into(),
               now_iso()?.into(),
            ],
         )
         .await?;

      Ok(result.last_insert_rowid())
   }

   pub async fn get(&self, id: i64) -> Result<AttendanceRecord> {
      let pool = self.db.read_pool()?;
      let sql = format!("{JOINED_SELECT} WHERE a.id = ?");
      let record: Option<AttendanceRecord> = sqlx::query_as(&sql)
         .bind(id)
         .fetch_optional(pool)
         .await?;

      record.ok_or_else(|| Error::NotFound(format!("attendance record {id} does not exist")))
   }

   pub async fn update(&self, id: i64, input: &UpdateAttendance) -> Result<()> {
      if input.status.trim().is_empty() {
         return Err(Error::InvalidRequest("status is required".to_string()));
      }

      let mut sets: Vec<(&str, BindValue)> = vec![
         ("status", input.status.as_str().into()),
         ("reason", input.reason.clone().into()),
      ];

      if let Some(student_id) = &input.student_id {
         if !student_exists(&self.db, student_id).await? {
            return Err(Error::InvalidRequest("student does not exist".to_string()));
         }
         sets.push(("student_id", student_id.as_str().into()));
      }
      if let Some(course_id) = input.course_id {
         // Zero clears the course link.
         if course_id == 0 {
            sets.push(("course_id", BindValue::Null));
         } else {
            if !course_exists(&self.db, course_id).await? {
               return Err(Error::InvalidRequest("course does not exist".to_string()));
            }
            sets.push(("course_id", course_id.into()));
         }
      }
      if let Some(date) = &input.date {
         sets.push(("date", date.as_str().into()));
      }

      let (sql, mut args) = build_update_sql("attendance", &sets, "id");
      args.push(id.into());

      let result = self.db.execute_write(&sql, &args).await?;
      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("attendance record {id} does not exist")));
      }
      Ok(())
   }

   pub async fn delete(&self, id: i64) -> Result<()> {
      let result = self
         .db
         .execute_write("DELETE FROM attendance WHERE id = ?", &[id.into()])
         .await?;

      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("attendance record {id} does not exist")));
      }
      Ok(())
   }

   pub async fn list(
      &self,
      student_id: Option<&str>,
      course_id: Option<i64>,
      date: Option<&str>,
      params: PageParams,
   ) -> Result<Page<AttendanceRecord>> {
      let query = ListQuery::new(JOINED_SELECT)
         .filter_eq("a.student_id", student_id)?
         .filter_eq("a.course_id", course_id)?
         .filter_eq("a.date", date)?;
      fetch_page(&self.db, &query, "a.date DESC", params).await
   }
}
