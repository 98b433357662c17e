//! Guardian repository.

use std::sync::Arc;

use school_conn::SqliteDatabase;

use crate::error::{Error, Result};
use crate::models::{Guardian, NewGuardian, UpdateGuardian, now_iso};
use crate::query::{ListQuery, Page, PageParams};
use crate::repo::{fetch_page, student_exists};

const JOINED_SELECT: &str = "SELECT g.*, s.name AS student_name \
                             FROM guardians g \
                             JOIN students s ON g.student_id = s.student_id";

pub struct GuardianRepo {
   db: Arc<SqliteDatabase>,
}

impl GuardianRepo {
   pub fn new(db: Arc<SqliteDatabase>) -> Self {
      Self { db }
   }

   pub async fn create(&self, input: &NewGuardian) -> Result<i64> {
      if input.student_id.trim().is_empty()
         || input.name.trim().is_empty()
         || input.relationship.trim().is_empty()
         || input.phone.trim().is_empty()
      {
         return Err(Error::InvalidRequest(
            "student_id, name, relationship and phone are required".to_string(),
         ));
      }
      if !student_exists(&self.db, &input.student_id).await? {
         return Err(Error::InvalidRequest("student does not exist".to_string()));
      }

      let result = self
         .db
         .execute_write(
            "INSERT INTO guardians (student_id, name, relationship, phone, email, address, \
             created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            &[
               input.student_id.as_str().into(),
               input.name.as_str().into(),
               input.relationship.as_str().into(),
               input.phone.as_str().into(),
               input.email.clone().into(),
               input.address.clone().into(),
               now_iso()?.into(),
            ],
         )
         .await?;

      Ok(result.last_insert_rowid())
   }

   pub async fn get(&self, id: i64) -> Result<Guardian> {
      let pool = self.db.read_pool()?;
      let sql = format!("{JOINED_SELECT} WHERE g.id = ?");
      let guardian: Option<Guardian> = sqlx::query_as(&sql)
         .bind(id)
         .fetch_optional(pool)
         .await?;

      guardian.ok_or_else(|| Error::NotFound(format!("guardian {id} does not exist")))
   }

   pub async fn update(&self, id: i64, input: &UpdateGuardian) -> Result<()> {
      if input.name.trim().is_empty()
         || input.relationship.trim().is_empty()
         || input.phone.trim().is_empty()
      {
         return Err(Error::InvalidRequest(
            "name, relationship and phone are required".to_string(),
         ));
      }

      let result = self
         .db
         .execute_write(
            "UPDATE guardians SET name = ?, relationship = ?, phone = ?, email = ?, \
             address = ? WHERE id = ?",
            &[
               input.name.as_str().into(),
               input.relationship.as_str().into(),
               input.phone.as_str().into(),
               input.email.clone().into(),
               input.address.clone().into(),
               id.into(),
            ],
         )
         .await?;

      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("guardian {id} does not exist")));
      }
      Ok(())
   }

   pub async fn delete(&self, id: i64) -> Result<()> {
      let result = self
         .db
         .execute_write("DELETE FROM guardians WHERE id = ?", &[id.into()])
         .await?;

      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("guardian {id} does not exist")));
      }
      Ok(())
   }

   pub async fn list(
      &self,
      student_id: Option<&str>,
      params: PageParams,
   ) -> Result<Page<Guardian>> {
      let query = ListQuery::new(JOINED_SELECT).filter_eq("g.student_id", student_id)?;
      fetch_page(&self.db, &query, "g.created_at DESC", params).await
   }
}
