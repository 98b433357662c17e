//! Student repository.
//!
//! Students are keyed by the `student_id` business key; all dependent tables
//! reference it. Deleting a student deliberately does not cascade to
//! enrollments, attendance, disciplinary records, or guardians — orphaned
//! references are a preserved property of the current data model.

use std::sync::Arc;

use school_conn::SqliteDatabase;

use crate::contact::GuardianContact;
use crate::error::{Error, Result};
use crate::models::{NewStudent, Student, StudentRow, UpdateStudent, now_iso};
use crate::query::{ListQuery, Page, PageParams};
use crate::repo::{conflict_on_unique, fetch_page};

pub struct StudentRepo {
   db: Arc<SqliteDatabase>,
}

impl StudentRepo {
   pub fn new(db: Arc<SqliteDatabase>) -> Self {
      Self { db }
   }

   pub async fn create(&self, input: &NewStudent) -> Result<i64> {
      if input.student_id.trim().is_empty()
         || input.name.trim().is_empty()
         || input.gender.trim().is_empty()
      {
         return Err(Error::InvalidRequest(
            "student_id, name and gender are required".to_string(),
         ));
      }

      let family_info = GuardianContact::new(
         input.email.clone().unwrap_or_default(),
         input.address.clone().unwrap_or_default(),
      )
      .encode();

      let result = self
         .db
         .execute_write(
            "INSERT INTO students (student_id, name, gender, age, contact, family_info, \
             class_name, teacher, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            &[
               input.student_id.as_str().into(),
               input.name.as_str().into(),
               input.gender.as_str().into(),
               input.age.into(),
               input.phone.clone().unwrap_or_default().into(),
               family_info.into(),
               input.class_name.clone().into(),
               input.teacher_name.clone().unwrap_or_default().into(),
               now_iso()?.into(),
            ],
         )
         .await
         .map_err(|e| conflict_on_unique(e.into(), "student id already exists"))?;

      Ok(result.last_insert_rowid())
   }

   pub async fn get(&self, student_id: &str) -> Result<Student> {
      let pool = self.db.read_pool()?;
      let row: Option<StudentRow> =
         sqlx::query_as("SELECT * FROM students WHERE student_id = ?")
            .bind(student_id)
            .fetch_optional(pool)
            .await?;

      row.map(Student::from)
         .ok_or_else(|| Error::NotFound(format!("student {student_id} does not exist")))
   }

   pub async fn update(&self, student_id: &str, input: &UpdateStudent) -> Result<()> {
      if input.name.trim().is_empty() || input.gender.trim().is_empty() {
         return Err(Error::InvalidRequest("name and gender are required".to_string()));
      }

      let family_info = GuardianContact::new(
         input.email.clone().unwrap_or_default(),
         input.address.clone().unwrap_or_default(),
      )
      .encode();

      let result = self
         .db
         .execute_write(
            "UPDATE students SET name = ?, gender = ?, age = ?, contact = ?, \
             family_info = ?, class_name = ?, teacher = ? WHERE student_id = ?",
            &[
               input.name.as_str().into(),
               input.gender.as_str().into(),
               input.age.into(),
               input.phone.clone().unwrap_or_default().into(),
               family_info.into(),
               input.class_name.clone().into(),
               input.teacher_name.clone().unwrap_or_default().into(),
               student_id.into(),
            ],
         )
         .await?;

      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("student {student_id} does not exist")));
      }
      Ok(())
   }

   /// Hard delete. Dependent rows are intentionally left in place.
   pub async fn delete(&self, student_id: &str) -> Result<()> {
      let result = self
         .db
         .execute_write("DELETE FROM students WHERE student_id = ?", &[student_id.into()])
         .await?;

      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("student {student_id} does not exist")));
      }
      Ok(())
   }

   /// Most-recently-created first, with the guardian-contact blob decoded
   /// into each row's email/address fields.
   pub async fn list(&self, params: PageParams) -> Result<Page<Student>> {
      let query = ListQuery::new("SELECT * FROM students");
      let page: Page<StudentRow> =
         fetch_page(&self.db, &query, "created_at DESC", params).await?;

      Ok(Page {
         total: page.total,
         data: page.data.into_iter().map(Student::from).collect(),
         page: page.page,
         limit: page.limit,
      })
   }
}
