//! Course repository.

use std::sync::Arc;

use school_conn::SqliteDatabase;

use crate::error::{Error, Result};
use crate::models::{Course, NewCourse, UpdateCourse, now_iso};
use crate::query::{ListQuery, Page, PageParams};
use crate::repo::{conflict_on_unique, fetch_page};

pub struct CourseRepo {
   db: Arc<SqliteDatabase>,
}

impl CourseRepo {
   pub fn new(db: Arc<SqliteDatabase>) -> Self {
      Self { db }
   }

   pub async fn create(&self, input: &NewCourse) -> Result<i64> {
      if input.course_name.trim().is_empty() {
         return Err(Error::InvalidRequest("course_name is required".to_string()));
      }

      let result = self
         .db
         .execute_write(
            "INSERT INTO courses (course_code, course_name, teacher, credits, created_at) \
             VALUES (?, ?, ?, ?, ?)",
            &[
               input.course_code.clone().into(),
               input.course_name.as_str().into(),
               input.teacher.clone().into(),
               input.credits.into(),
               now_iso()?.into(),
            ],
         )
         .await
         .map_err(|e| conflict_on_unique(e.into(), "course code already exists"))?;

      Ok(result.last_insert_rowid())
   }

   pub async fn get(&self, id: i64) -> Result<Course> {
      let pool = self.db.read_pool()?;
      let course: Option<Course> = sqlx::query_as("SELECT * FROM courses WHERE id = ?")
         .bind(id)
         .fetch_optional(pool)
         .await?;

      course.ok_or_else(|| Error::NotFound(format!("course {id} does not exist")))
   }

   pub async fn update(&self, id: i64, input: &UpdateCourse) -> Result<()> {
      if input.course_name.trim().is_empty() {
         return Err(Error::InvalidRequest("course_name is required".to_string()));
      }

      let result = self
         .db
         .execute_write(
            "UPDATE courses SET course_name = ?, teacher = ?, credits = ? WHERE id = ?",
            &[
               input.course_name.as_str().into(),
               input.teacher.clone().into(),
               input.credits.into(),
               id.into(),
            ],
         )
         .await?;

      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("course {id} does not exist")));
      }
      Ok(())
   }

   pub async fn delete(&self, id: i64) -> Result<()> {
      let result = self
         .db
         .execute_write("DELETE FROM courses WHERE id = ?", &[id.into()])
         .await?;

      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("course {id} does not exist")));
      }
      Ok(())
   }

   pub async fn list(&self, params: PageParams) -> Result<Page<Course>> {
      let query = ListQuery::new("SELECT * FROM courses");
      fetch_page(&self.db, &query, "created_at DESC", params).await
   }
}
