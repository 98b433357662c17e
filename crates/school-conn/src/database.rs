//! SQLite database with connection pooling and serialized write access

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteQueryResult};
use sqlx::{Pool, Sqlite};
use tracing::debug;

use crate::config::SqliteDatabaseConfig;
use crate::error::{Error, Result};
use crate::retry::execute_with_retry;
use crate::transaction::ImmediateTransaction;
use crate::value::BindValue;

/// SQLite database with connection pooling for concurrent reads and
/// serialized writes.
///
/// ## Architecture
///
/// The database maintains two connection pools:
/// - **`read_pool`**: Pool of read-only connections for concurrent reads
/// - **`write_pool`**: Single-connection pool for exclusive write access
///   (enforced by max_connections=1)
///
/// Every connection sets a bounded busy timeout, so waiting on SQLite's own
/// locks fails fast rather than hanging. Connections are pooled RAII
/// handles: release happens structurally on every exit path.
#[derive(Debug)]
pub struct SqliteDatabase {
   /// Pool of read-only connections for concurrent reads
   read_pool: Pool<Sqlite>,

   /// Single read-write connection pool (max_connections=1) for serialized writes
   write_pool: Pool<Sqlite>,

   /// Marks database as closed to prevent further operations
   closed: AtomicBool,

   /// Path to database file (used for logging and cleanup)
   path: PathBuf,

   config: SqliteDatabaseConfig,
}

impl SqliteDatabase {
   /// Connect to (creating if missing) the database file at `path`.
   ///
   /// The write pool connects first so the file and WAL journal mode exist
   /// before the read-only pool opens.
   pub async fn connect(
      path: impl AsRef<Path>,
      custom_config: Option<SqliteDatabaseConfig>,
   ) -> Result<Self> {
      let config = custom_config.unwrap_or_default();
      let path = path.as_ref().to_path_buf();

      let write_options = SqliteConnectOptions::new()
         .filename(&path)
         .create_if_missing(true)
         .busy_timeout(config.busy_timeout)
         .journal_mode(SqliteJournalMode::Wal);

      let write_pool = SqlitePoolOptions::new()
         .max_connections(1)
         .acquire_timeout(config.acquire_timeout)
         .connect_with(write_options)
         .await?;

      let read_options = SqliteConnectOptions::new()
         .filename(&path)
         .read_only(true)
         .busy_timeout(config.busy_timeout);

      let read_pool = SqlitePoolOptions::new()
         .max_connections(config.max_read_connections)
         .acquire_timeout(config.acquire_timeout)
         .connect_with(read_options)
         .await?;

      debug!("connected to sqlite database at {}", path.display());

      Ok(Self {
         read_pool,
         write_pool,
         closed: AtomicBool::new(false),
         path,
         config,
      })
   }

   /// The read-only pool for concurrent queries.
   pub fn read_pool(&self) -> Result<&Pool<Sqlite>> {
      self.ensure_open()?;
      Ok(&self.read_pool)
   }

   /// Acquire the single write connection.
   ///
   /// Waits up to the configured acquire timeout for the slot, then fails
   /// fast. The returned handle releases back to the pool on drop.
   pub async fn acquire_writer(&self) -> Result<PoolConnection<Sqlite>> {
      self.ensure_open()?;
      Ok(self.write_pool.acquire().await?)
   }

   /// Execute a single write statement, retrying on lock contention
   /// according to the configured [`RetryPolicy`](crate::RetryPolicy).
   pub async fn execute_write(&self, sql: &str, args: &[BindValue]) -> Result<SqliteQueryResult> {
      self.ensure_open()?;
      execute_with_retry(&self.write_pool, &self.config.retry, sql, args).await
   }

   /// Begin a write transaction with write intent declared up front
   /// (`BEGIN IMMEDIATE`). Holds the write connection until commit,
   /// rollback, or drop.
   pub async fn begin_immediate(&self) -> Result<ImmediateTransaction> {
      let conn = self.acquire_writer().await?;
      ImmediateTransaction::begin(conn).await
   }

   /// Path of the underlying database file.
   pub fn path(&self) -> &Path {
      &self.path
   }

   /// Close both pools. Further operations fail with
   /// [`Error::DatabaseClosed`].
   pub async fn close(&self) {
      self.closed.store(true, Ordering::SeqCst);
      self.read_pool.close().await;
      self.write_pool.close().await;
      debug!("closed sqlite database at {}", self.path.display());
   }

   fn ensure_open(&self) -> Result<()> {
      if self.closed.load(Ordering::SeqCst) {
         return Err(Error::DatabaseClosed);
      }
      Ok(())
   }
}
