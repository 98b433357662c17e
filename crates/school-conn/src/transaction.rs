//! Immediate-mode write transactions

use sqlx::Sqlite;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteQueryResult, SqliteRow};
use tracing::debug;

use crate::error::Result;
use crate::value::BindValue;

/// A write transaction opened with `BEGIN IMMEDIATE`: the write lock is
/// requested at transaction start rather than lazily at the first write,
/// reducing the window for mid-transaction lock upgrades to fail.
///
/// The transaction holds the single write-pool connection for its entire
/// lifetime, so exactly one immediate transaction runs at a time in this
/// process. Once begun, it runs to [`commit`](Self::commit) or
/// [`rollback`](Self::rollback); there is no mid-transaction cancellation.
#[must_use = "if unused, the transaction is rolled back when the connection returns to the pool"]
pub struct ImmediateTransaction {
   conn: PoolConnection<Sqlite>,
   finalized: bool,
}

impl ImmediateTransaction {
   pub(crate) async fn begin(mut conn: PoolConnection<Sqlite>) -> Result<Self> {
      sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
      Ok(Self {
         conn,
         finalized: false,
      })
   }

   /// Execute a write statement within this transaction.
   pub async fn execute(&mut self, sql: &str, args: &[BindValue]) -> Result<SqliteQueryResult> {
      let mut query = sqlx::query(sql);
      for value in args {
         query = value.bind(query);
      }
      Ok(query.execute(&mut *self.conn).await?)
   }

   /// Fetch zero or one row within this transaction.
   pub async fn fetch_optional(
      &mut self,
      sql: &str,
      args: &[BindValue],
   ) -> Result<Option<SqliteRow>> {
      let mut query = sqlx::query(sql);
      for value in args {
         query = value.bind(query);
      }
      Ok(query.fetch_optional(&mut *self.conn).await?)
   }

   /// Commit this transaction.
   pub async fn commit(mut self) -> Result<()> {
      sqlx::query("COMMIT").execute(&mut *self.conn).await?;
      self.finalized = true;
      debug!("immediate transaction committed");
      Ok(())
   }

   /// Roll back this transaction.
   pub async fn rollback(mut self) -> Result<()> {
      sqlx::query("ROLLBACK").execute(&mut *self.conn).await?;
      self.finalized = true;
      debug!("immediate transaction rolled back");
      Ok(())
   }
}

impl Drop for ImmediateTransaction {
   fn drop(&mut self) {
      // When dropped without an explicit COMMIT or ROLLBACK, the connection
      // returns to the pool and SQLite rolls the open transaction back
      // before the connection is reused.
      if !self.finalized {
         debug!("immediate transaction dropped without commit (will auto-rollback)");
      }
   }
}
