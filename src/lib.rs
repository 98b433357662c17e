//! # school-records
//!
//! Persistence and consistency layer for school administration records
//! (students, courses, enrollments, attendance, disciplinary records,
//! guardians, accounts) backed by a single embedded SQLite store accessed
//! concurrently by multiple request handlers.
//!
//! ## Core Modules
//!
//! - **[`schema`]**: idempotent table creation, additive column migrations,
//!   and one-time default account seeding
//! - **[`repo`]**: entity repositories — CRUD plus filtered, paginated reads,
//!   each enforcing its own uniqueness and referential invariants
//! - **[`auth`]**: the auto-provisioning login protocol, which atomically
//!   reconciles account creation, uniqueness, and a linked student record
//!   under concurrent requests
//! - **[`query`]**: typed predicate and LIMIT/OFFSET pagination building
//! - **[`score`]**: weighted final-score computation
//! - **[`stats`]**: read-only aggregate statistics
//!
//! Connection pooling, immediate-mode transactions, and the lock-retry write
//! executor live in the [`school_conn`] crate and are re-exported here.

pub mod auth;
pub mod contact;
pub mod error;
pub mod models;
pub mod password;
pub mod query;
pub mod repo;
pub mod schema;
pub mod score;
pub mod stats;

pub use error::{Error, Result};
pub use school_conn::{BindValue, RetryPolicy, SqliteDatabase, SqliteDatabaseConfig};
