//! Enrollment repository.
//!
//! An enrollment links a student to a course at most once. The pair is
//! pre-checked on create and update, with the table's UNIQUE constraint as
//! the backstop against concurrent inserts. The stored `final_score` is
//! derived from exam and daily scores at write time, never at read time.

use std::sync::Arc;

use school_conn::{BindValue, SqliteDatabase};

use crate::error::{Error, Result};
use crate::models::{Enrollment, NewEnrollment, UpdateEnrollment, now_iso};
use crate::query::{ListQuery, Page, PageParams};
use crate::repo::{build_update_sql, conflict_on_unique, course_exists, fetch_page, student_exists};
use crate::score::final_score;

const JOINED_SELECT: &str = "SELECT sc.*, c.course_code, c.course_name, c.teacher, c.credits, \
                             s.name AS student_name \
                             FROM enrollments sc \
                             LEFT JOIN courses c ON sc.course_id = c.id \
                             LEFT JOIN students s ON sc.student_id = s.student_id";

pub struct EnrollmentRepo {
   db: Arc<SqliteDatabase>,
}

impl EnrollmentRepo {
   pub fn new(db: Arc<SqliteDatabase>) -> Self {
      Self { db }
   }

   pub async fn create(&self, input: &NewEnrollment) -> Result<i64> {
      if input.student_id.trim().is_empty() {
         return Err(Error::InvalidRequest("student_id is required".to_string()));
      }
      if !student_exists(&self.db, &input.student_id).await? {
         return Err(Error::InvalidRequest("student does not exist".to_string()));
      }
      if !course_exists(&self.db, input.course_id).await? {
         return Err(Error::InvalidRequest("course does not exist".to_string()));
      }
      if self.pair_exists(&input.student_id, input.course_id, None).await? {
         return Err(Error::Conflict(
            "student already enrolled in this course".to_string(),
         ));
      }

      let computed = final_score(input.exam_score, input.daily_score);
      let result = self
         .db
         .execute_write(
            "INSERT INTO enrollments (student_id, course_id, exam_score, daily_score, \
             final_score, semester, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            &[
               input.student_id.as_str().into(),
               input.course_id.into(),
               input.exam_score.into(),
               input.daily_score.into(),
               computed.into(),
               input.semester.clone().into(),
               now_iso()?.into(),
            ],
         )
         .await
         .map_err(|e| conflict_on_unique(e.into(), "student already enrolled in this course"))?;

      Ok(result.last_insert_rowid())
   }

   pub async fn get(&self, id: i64) -> Result<Enrollment> {
      let pool = self.db.read_pool()?;
      let sql = format!("{JOINED_SELECT} WHERE sc.id = ?");
      let enrollment: Option<Enrollment> = sqlx::query_as(&sql)
         .bind(id)
         .fetch_optional(pool)
         .await?;

      enrollment.ok_or_else(|| Error::NotFound(format!("enrollment {id} does not exist")))
   }

   pub async fn update(&self, id: i64, input: &UpdateEnrollment) -> Result<()> {
      let pool = self.db.read_pool()?;
      let existing: Option<(String, i64)> =
         sqlx::query_as("SELECT student_id, course_id FROM enrollments WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
      let Some((current_student, current_course)) = existing else {
         return Err(Error::NotFound(format!("enrollment {id} does not exist")));
      };

      let student_id = input.student_id.as_deref().unwrap_or(&current_student);
      let course_id = input.course_id.unwrap_or(current_course);

      if student_id != current_student && !student_exists(&self.db, student_id).await? {
         return Err(Error::InvalidRequest("student does not exist".to_string()));
      }
      if course_id != current_course && !course_exists(&self.db, course_id).await? {
         return Err(Error::InvalidRequest("course does not exist".to_string()));
      }
      if (student_id != current_student || course_id != current_course)
         && self.pair_exists(student_id, course_id, Some(id)).await?
      {
         return Err(Error::Conflict(
            "student already enrolled in this course".to_string(),
         ));
      }

      // Scores are rewritten as a unit; an absent score means zero.
      let exam = input.exam_score.unwrap_or(0.0);
      let daily = input.daily_score.unwrap_or(0.0);

      let mut sets: Vec<(&str, BindValue)> = vec![
         ("student_id", student_id.into()),
         ("course_id", course_id.into()),
         ("exam_score", exam.into()),
         ("daily_score", daily.into()),
         ("final_score", final_score(Some(exam), Some(daily)).into()),
      ];
      if let Some(semester) = &input.semester {
         sets.push(("semester", semester.as_str().into()));
      }

      let (sql, mut args) = build_update_sql("enrollments", &sets, "id");
      args.push(id.into());

      let result = self
         .db
         .execute_write(&sql, &args)
         .await
         .map_err(|e| conflict_on_unique(e.into(), "student already enrolled in this course"))?;

      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("enrollment {id} does not exist")));
      }
      Ok(())
   }

   pub async fn delete(&self, id: i64) -> Result<()> {
      let result = self
         .db
         .execute_write("DELETE FROM enrollments WHERE id = ?", &[id.into()])
         .await?;

      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("enrollment {id} does not exist")));
      }
      Ok(())
   }

   pub async fn list(
      &self,
      student_id: Option<&str>,
      course_id: Option<i64>,
      params: PageParams,
   ) -> Result<Page<Enrollment>> {
      let query = ListQuery::new(JOINED_SELECT)
         .filter_eq("sc.student_id", student_id)?
         .filter_eq("sc.course_id", course_id)?;
      fetch_page(&self.db, &query, "sc.created_at DESC", params).await
   }

   async fn pair_exists(
      &self,
      student_id: &str,
      course_id: i64,
      exclude_id: Option<i64>,
   ) -> Result<bool> {
      let pool = self.db.read_pool()?;
      let found: Option<i64> = match exclude_id {
         Some(id) => {
            sqlx::query_scalar(
               "SELECT 1 FROM enrollments WHERE student_id = ? AND course_id = ? AND id != ?",
            )
            .bind(student_id)
            .bind(course_id)
            .bind(id)
            .fetch_optional(pool)
            .await?
         }
         None => {
            sqlx::query_scalar("SELECT 1 FROM enrollments WHERE student_id = ? AND course_id = ?")
               .bind(student_id)
               .bind(course_id)
               .fetch_optional(pool)
               .await?
         }
      };
      Ok(found.is_some())
   }
}
