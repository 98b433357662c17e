//! Error types for school-conn

use thiserror::Error;

/// Errors that may occur when working with school-conn
#[derive(Error, Debug)]
pub enum Error {
   /// Error from the sqlx library. Standard sqlx errors are converted to this variant
   #[error("Sqlx error: {0}")]
   Sqlx(#[from] sqlx::Error),

   /// Database has been closed and cannot be used
   #[error("Database has been closed")]
   DatabaseClosed,

   /// A write statement still failed with lock contention after every
   /// configured retry attempt.
   #[error("write lock retries exhausted after {attempts} attempts: {source}")]
   WriteRetriesExhausted {
      attempts: u32,
      #[source]
      source: sqlx::Error,
   },
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// True when the error is SQLite lock contention (SQLITE_BUSY or
/// SQLITE_LOCKED, primary or extended result codes).
///
/// This is the only class of error the write executor retries; integrity and
/// syntax errors would fail identically on every attempt.
pub fn is_locked(err: &sqlx::Error) -> bool {
   let sqlx::Error::Database(db_err) = err else {
      return false;
   };

   if let Some(code) = db_err.code()
      && let Ok(n) = code.as_ref().parse::<i64>()
   {
      // Primary codes: 5 = SQLITE_BUSY, 6 = SQLITE_LOCKED. Extended codes
      // (e.g. 261 SQLITE_BUSY_RECOVERY, 517 SQLITE_BUSY_SNAPSHOT) keep the
      // primary code in the low byte.
      let primary = n & 0xff;
      if primary == 5 || primary == 6 {
         return true;
      }
   }

   db_err.message().contains("database is locked")
}

/// True when the error is a SQLite uniqueness violation (UNIQUE constraint
/// or duplicate primary key).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
   let sqlx::Error::Database(db_err) = err else {
      return false;
   };

   matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
      || db_err.message().contains("UNIQUE constraint failed")
}
