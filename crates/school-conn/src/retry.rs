//! Lock-contention retry loop for single write statements

use sqlx::sqlite::SqliteQueryResult;
use sqlx::{Pool, Sqlite};
use tracing::warn;

use crate::config::RetryPolicy;
use crate::error::{Error, Result, is_locked};
use crate::value::BindValue;

/// Execute one write statement against the write pool, retrying on lock
/// contention with a fixed backoff.
///
/// Only SQLITE_BUSY / SQLITE_LOCKED failures are retried; any other error
/// propagates from the first attempt. When every attempt failed with
/// contention, the last error is surfaced as
/// [`Error::WriteRetriesExhausted`]. The sleep between attempts suspends the
/// calling task only.
pub(crate) async fn execute_with_retry(
   pool: &Pool<Sqlite>,
   policy: &RetryPolicy,
   sql: &str,
   args: &[BindValue],
) -> Result<SqliteQueryResult> {
   let mut attempt: u32 = 1;
   loop {
      let mut query = sqlx::query(sql);
      for value in args {
         query = value.bind(query);
      }

      match query.execute(pool).await {
         Ok(result) => return Ok(result),
         Err(err) if is_locked(&err) && attempt < policy.max_attempts => {
            warn!(
               "database locked, retrying in {:?} (attempt {attempt} of {})",
               policy.backoff, policy.max_attempts
            );
            tokio::time::sleep(policy.backoff).await;
            attempt += 1;
         }
         Err(err) if is_locked(&err) => {
            return Err(Error::WriteRetriesExhausted {
               attempts: policy.max_attempts,
               source: err,
            });
         }
         Err(err) => return Err(err.into()),
      }
   }
}
