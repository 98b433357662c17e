//! Reward and punishment records.
//!
//! The discriminator column is named `type` in the store; the Rust field is
//! `kind`, renamed on both the sqlx and serde sides.

use std::sync::Arc;

use school_conn::SqliteDatabase;

use crate::error::{Error, Result};
use crate::models::{NewRewardPunishment, RewardPunishment, UpdateRewardPunishment, now_iso};
use crate::query::{ListQuery, Page, PageParams};
use crate::repo::{fetch_page, student_exists};

const JOINED_SELECT: &str = "SELECT rp.*, s.name AS student_name \
                             FROM rewards_punishments rp \
                             JOIN students s ON rp.student_id = s.student_id";

pub struct RewardPunishmentRepo {
   db: Arc<SqliteDatabase>,
}

impl RewardPunishmentRepo {
   pub fn new(db: Arc<SqliteDatabase>) -> Self {
      Self { db }
   }

   pub async fn create(&self, input: &NewRewardPunishment) -> Result<i64> {
      if input.student_id.trim().is_empty()
         || input.kind.trim().is_empty()
         || input.title.trim().is_empty()
         || input.date.trim().is_empty()
      {
         return Err(Error::InvalidRequest(
            "student_id, type, title and date are required".to_string(),
         ));
      }
      if !student_exists(&self.db, &input.student_id).await? {
         return Err(Error::InvalidRequest("student does not exist".to_string()));
      }

      let result = self
         .db
         .execute_write(
            "INSERT INTO rewards_punishments (student_id, type, title, description, date, \
             created_at) VALUES (?, ?, ?, ?, ?, ?)",
            &[
               input.student_id.as_str().into(),
               input.kind.as_str().into(),
               input.title.as_str().into(),
               input.description.clone().into(),
               input.date.as_str().into(),
               now_iso()?.into(),
            ],
         )
         .await?;

      Ok(result.last_insert_rowid())
   }

   pub async fn get(&self, id: i64) -> Result<RewardPunishment> {
      let pool = self.db.read_pool()?;
      let sql = format!("{JOINED_SELECT} WHERE rp.id = ?");
      let record: Option<RewardPunishment> = sqlx::query_as(&sql)
         .bind(id)
         .fetch_optional(pool)
         .await?;

      record.ok_or_else(|| Error::NotFound(format!("record {id} does not exist")))
   }

   pub async fn update(&self, id: i64, input: &UpdateRewardPunishment) -> Result<()> {
      if input.kind.trim().is_empty()
         || input.title.trim().is_empty()
         || input.date.trim().is_empty()
      {
         return Err(Error::InvalidRequest(
            "type, title and date are required".to_string(),
         ));
      }

      let result = self
         .db
         .execute_write(
            "UPDATE rewards_punishments SET type = ?, title = ?, description = ?, date = ? \
             WHERE id = ?",
            &[
               input.kind.as_str().into(),
               input.title.as_str().into(),
               input.description.clone().into(),
               input.date.as_str().into(),
               id.into(),
            ],
         )
         .await?;

      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("record {id} does not exist")));
      }
      Ok(())
   }

   pub async fn delete(&self, id: i64) -> Result<()> {
      let result = self
         .db
         .execute_write("DELETE FROM rewards_punishments WHERE id = ?", &[id.into()])
         .await?;

      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("record {id} does not exist")));
      }
      Ok(())
   }

   pub async fn list(
      &self,
      student_id: Option<&str>,
      kind: Option<&str>,
      params: PageParams,
   ) -> Result<Page<RewardPunishment>> {
      let query = ListQuery::new(JOINED_SELECT)
         .filter_eq("rp.student_id", student_id)?
         .filter_eq("rp.type", kind)?;
      fetch_page(&self.db, &query, "rp.date DESC", params).await
   }
}
