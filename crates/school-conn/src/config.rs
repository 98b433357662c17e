//! Configuration for SQLite database connection pools

use std::time::Duration;

/// How write statements are retried when SQLite reports lock contention.
///
/// The backoff sleep is a deliberate backpressure mechanism: it blocks the
/// calling task (never the runtime) and trades request latency for write
/// serialization against the single-writer store.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
   /// Total number of attempts, the initial try included.
   ///
   /// Default: 10
   pub max_attempts: u32,

   /// Fixed sleep between attempts.
   ///
   /// Default: 2 seconds
   pub backoff: Duration,
}

impl Default for RetryPolicy {
   fn default() -> Self {
      Self {
         max_attempts: 10,
         backoff: Duration::from_secs(2),
      }
   }
}

/// Configuration for SqliteDatabase connection pools
///
/// # Examples
///
/// ```
/// use school_conn::SqliteDatabaseConfig;
/// use std::time::Duration;
///
/// // Use defaults
/// let config = SqliteDatabaseConfig::default();
///
/// // Override just one field
/// let config = SqliteDatabaseConfig {
///     max_read_connections: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct SqliteDatabaseConfig {
   /// Maximum number of concurrent read connections
   ///
   /// This controls the size of the read-only connection pool.
   /// Higher values allow more concurrent read queries but consume more resources.
   ///
   /// Default: 6
   pub max_read_connections: u32,

   /// Bounded wait for SQLite's own locks (PRAGMA busy_timeout), applied to
   /// every connection in both pools.
   ///
   /// Default: 30 seconds
   pub busy_timeout: Duration,

   /// Bounded wait for a pool slot. Acquisition beyond this fails fast
   /// rather than queueing indefinitely.
   ///
   /// Default: 30 seconds
   pub acquire_timeout: Duration,

   /// Retry behavior for single write statements under lock contention.
   pub retry: RetryPolicy,
}

impl Default for SqliteDatabaseConfig {
   fn default() -> Self {
      Self {
         max_read_connections: 6,
         busy_timeout: Duration::from_secs(30),
         acquire_timeout: Duration::from_secs(30),
         retry: RetryPolicy::default(),
      }
   }
}
