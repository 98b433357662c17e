//! Integration tests for connection pooling, retry classification, and
//! immediate-mode transactions.

use std::time::Duration;

use school_conn::{
   Error, RetryPolicy, SqliteDatabase, SqliteDatabaseConfig, is_locked, is_unique_violation,
};

struct TestDb {
   db: SqliteDatabase,
   _temp_file: tempfile::NamedTempFile,
}

async fn setup_test_db(config: Option<SqliteDatabaseConfig>) -> TestDb {
   // Use temp file so read pool and writer share the same database
   let temp_file = tempfile::NamedTempFile::new().unwrap();
   let db = SqliteDatabase::connect(temp_file.path(), config).await.unwrap();

   db.execute_write(
      r#"
      CREATE TABLE records (
         id INTEGER PRIMARY KEY AUTOINCREMENT,
         key TEXT UNIQUE NOT NULL,
         value TEXT
      )
      "#,
      &[],
   )
   .await
   .unwrap();

   TestDb {
      db,
      _temp_file: temp_file,
   }
}

/// Config with tiny timeouts so contention tests finish quickly.
fn impatient_config() -> SqliteDatabaseConfig {
   SqliteDatabaseConfig {
      busy_timeout: Duration::from_millis(20),
      acquire_timeout: Duration::from_millis(500),
      retry: RetryPolicy {
         max_attempts: 2,
         backoff: Duration::from_millis(20),
      },
      ..Default::default()
   }
}

// ============================================================================
// Basic read/write plumbing
// ============================================================================

#[tokio::test]
async fn writes_are_visible_to_the_read_pool() {
   let test_db = setup_test_db(None).await;

   let result = test_db
      .db
      .execute_write(
         "INSERT INTO records (key, value) VALUES (?, ?)",
         &["k1".into(), "v1".into()],
      )
      .await
      .unwrap();
   assert_eq!(result.rows_affected(), 1);

   let pool = test_db.db.read_pool().unwrap();
   let value: String = sqlx::query_scalar("SELECT value FROM records WHERE key = ?")
      .bind("k1")
      .fetch_one(pool)
      .await
      .unwrap();
   assert_eq!(value, "v1");
}

#[tokio::test]
async fn closed_database_rejects_operations() {
   let test_db = setup_test_db(None).await;
   test_db.db.close().await;

   assert!(matches!(
      test_db.db.read_pool(),
      Err(Error::DatabaseClosed)
   ));
   let err = test_db
      .db
      .execute_write("INSERT INTO records (key) VALUES ('x')", &[])
      .await
      .unwrap_err();
   assert!(matches!(err, Error::DatabaseClosed));
}

// ============================================================================
// Retry classification
// ============================================================================

#[tokio::test]
async fn unique_violation_is_not_retried_and_classified() {
   let test_db = setup_test_db(None).await;

   test_db
      .db
      .execute_write("INSERT INTO records (key) VALUES (?)", &["dup".into()])
      .await
      .unwrap();

   let start = std::time::Instant::now();
   let err = test_db
      .db
      .execute_write("INSERT INTO records (key) VALUES (?)", &["dup".into()])
      .await
      .unwrap_err();

   // An integrity error must propagate immediately, with no backoff applied.
   assert!(start.elapsed() < Duration::from_secs(1));
   match err {
      Error::Sqlx(sqlx_err) => {
         assert!(is_unique_violation(&sqlx_err));
         assert!(!is_locked(&sqlx_err));
      }
      other => panic!("expected Sqlx error, got {other:?}"),
   }
}

#[tokio::test]
async fn syntax_error_propagates_on_first_attempt() {
   let test_db = setup_test_db(None).await;

   let err = test_db
      .db
      .execute_write("INSERT INTO does_not_exist (x) VALUES (1)", &[])
      .await
      .unwrap_err();
   assert!(matches!(err, Error::Sqlx(_)));
}

#[tokio::test]
async fn lock_contention_exhausts_bounded_retries() {
   let temp_file = tempfile::NamedTempFile::new().unwrap();

   // Two independent handles on one file simulate two writer processes.
   let holder = SqliteDatabase::connect(temp_file.path(), Some(impatient_config()))
      .await
      .unwrap();
   holder
      .execute_write("CREATE TABLE t (id INTEGER PRIMARY KEY, n INTEGER)", &[])
      .await
      .unwrap();

   let contender = SqliteDatabase::connect(temp_file.path(), Some(impatient_config()))
      .await
      .unwrap();

   // Hold the write lock from the first handle.
   let mut tx = holder.begin_immediate().await.unwrap();
   tx.execute("INSERT INTO t (n) VALUES (1)", &[]).await.unwrap();

   let err = contender
      .execute_write("INSERT INTO t (n) VALUES (2)", &[])
      .await
      .unwrap_err();
   assert!(matches!(
      err,
      Error::WriteRetriesExhausted { attempts: 2, .. }
   ));

   // Once the lock is released the same write succeeds.
   tx.commit().await.unwrap();
   contender
      .execute_write("INSERT INTO t (n) VALUES (2)", &[])
      .await
      .unwrap();
}

// ============================================================================
// Immediate transactions
// ============================================================================

#[tokio::test]
async fn rolled_back_transaction_leaves_no_trace() {
   let test_db = setup_test_db(None).await;

   let mut tx = test_db.db.begin_immediate().await.unwrap();
   tx.execute(
      "INSERT INTO records (key, value) VALUES (?, ?)",
      &["ghost".into(), "v".into()],
   )
   .await
   .unwrap();
   tx.rollback().await.unwrap();

   let pool = test_db.db.read_pool().unwrap();
   let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records")
      .fetch_one(pool)
      .await
      .unwrap();
   assert_eq!(count, 0);
}

#[tokio::test]
async fn dropped_transaction_auto_rolls_back() {
   let test_db = setup_test_db(None).await;

   {
      let mut tx = test_db.db.begin_immediate().await.unwrap();
      tx.execute("INSERT INTO records (key) VALUES ('dropped')", &[])
         .await
         .unwrap();
      // Dropped without commit.
   }

   let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records")
      .fetch_one(test_db.db.read_pool().unwrap())
      .await
      .unwrap();
   assert_eq!(count, 0);

   // The write slot is usable again afterwards.
   test_db
      .db
      .execute_write("INSERT INTO records (key) VALUES ('kept')", &[])
      .await
      .unwrap();
}

#[tokio::test]
async fn committed_transaction_is_atomic() {
   let test_db = setup_test_db(None).await;

   let mut tx = test_db.db.begin_immediate().await.unwrap();
   tx.execute("INSERT INTO records (key) VALUES ('a')", &[])
      .await
      .unwrap();
   tx.execute("INSERT INTO records (key) VALUES ('b')", &[])
      .await
      .unwrap();
   tx.commit().await.unwrap();

   let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records")
      .fetch_one(test_db.db.read_pool().unwrap())
      .await
      .unwrap();
   assert_eq!(count, 2);
}
