//! Account repository.
//!
//! Passwords are hashed before storage and never decoded back out; reads
//! select every column except `password`.

use std::sync::Arc;

use school_conn::{BindValue, SqliteDatabase};

use crate::error::{Error, Result};
use crate::models::{Account, NewAccount, Role, UpdateAccount, now_iso};
use crate::password::hash_password;
use crate::query::{ListQuery, Page, PageParams};
use crate::repo::{build_update_sql, conflict_on_unique, fetch_page};

const ACCOUNT_SELECT: &str = "SELECT id, username, role, created_at FROM accounts";

pub struct AccountRepo {
   db: Arc<SqliteDatabase>,
}

impl AccountRepo {
   pub fn new(db: Arc<SqliteDatabase>) -> Self {
      Self { db }
   }

   pub async fn create(&self, input: &NewAccount) -> Result<i64> {
      if input.username.trim().is_empty() || input.password.trim().is_empty() {
         return Err(Error::InvalidRequest(
            "username and password are required".to_string(),
         ));
      }

      let role = input.role.unwrap_or(Role::Admin);
      let result = self
         .db
         .execute_write(
            "INSERT INTO accounts (username, password, role, created_at) VALUES (?, ?, ?, ?)",
            &[
               input.username.as_str().into(),
               hash_password(&input.password).into(),
               role.as_str().into(),
               now_iso()?.into(),
            ],
         )
         .await
         .map_err(|e| conflict_on_unique(e.into(), "username already exists"))?;

      Ok(result.last_insert_rowid())
   }

   pub async fn get(&self, id: i64) -> Result<Account> {
      let pool = self.db.read_pool()?;
      let sql = format!("{ACCOUNT_SELECT} WHERE id = ?");
      let account: Option<Account> = sqlx::query_as(&sql)
         .bind(id)
         .fetch_optional(pool)
         .await?;

      account.ok_or_else(|| Error::NotFound(format!("account {id} does not exist")))
   }

   /// Partial update: password, role, or both. At least one field is
   /// required.
   pub async fn update(&self, id: i64, input: &UpdateAccount) -> Result<()> {
      let mut sets: Vec<(&str, BindValue)> = Vec::new();
      if let Some(password) = &input.password {
         if password.trim().is_empty() {
            return Err(Error::InvalidRequest("password must not be empty".to_string()));
         }
         sets.push(("password", hash_password(password).into()));
      }
      if let Some(role) = input.role {
         sets.push(("role", role.as_str().into()));
      }
      if sets.is_empty() {
         return Err(Error::InvalidRequest("nothing to update".to_string()));
      }

      let (sql, mut args) = build_update_sql("accounts", &sets, "id");
      args.push(id.into());

      let result = self.db.execute_write(&sql, &args).await?;
      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("account {id} does not exist")));
      }
      Ok(())
   }

   pub async fn delete(&self, id: i64) -> Result<()> {
      let result = self
         .db
         .execute_write("DELETE FROM accounts WHERE id = ?", &[id.into()])
         .await?;

      if result.rows_affected() == 0 {
         return Err(Error::NotFound(format!("account {id} does not exist")));
      }
      Ok(())
   }

   pub async fn list(&self, params: PageParams) -> Result<Page<Account>> {
      let query = ListQuery::new(ACCOUNT_SELECT);
      fetch_page(&self.db, &query, "created_at DESC", params).await
   }
}
