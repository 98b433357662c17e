//! # school-conn
//!
//! Connection management for the school records store: a minimal wrapper
//! around SQLx that enforces pragmatic SQLite connection policies for a
//! single-process, single-file, single-writer deployment.
//!
//! ## Core Types
//!
//! - **[`SqliteDatabase`]**: Main database type with separate read and write
//!   connection pools
//! - **[`SqliteDatabaseConfig`]**: Pool, timeout, and retry configuration
//! - **[`RetryPolicy`]**: How lock-contention failures are retried
//! - **[`ImmediateTransaction`]**: Write transaction that declares write
//!   intent at BEGIN rather than at the first statement
//! - **[`BindValue`]**: Positional bind values for parameterized statements
//! - **[`Error`]**: Error type for database operations
//!
//! ## Architecture
//!
//! - **Dual pools**: Separate read-only pool (max 6 connections) and write
//!   pool (max 1 connection)
//! - **Exclusive writes**: The single-connection write pool serializes all
//!   writers in this process; SQLite's own locking serializes everything else
//! - **Bounded lock waits**: Every connection sets a 30 second busy timeout
//! - **Contention retries**: Single write statements are retried a bounded
//!   number of times when SQLite reports the database locked

mod config;
mod database;
mod error;
mod retry;
mod transaction;
mod value;

pub use config::{RetryPolicy, SqliteDatabaseConfig};
pub use database::SqliteDatabase;
pub use error::{Error, Result, is_locked, is_unique_violation};
pub use transaction::ImmediateTransaction;
pub use value::BindValue;
