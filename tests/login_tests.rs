//! Integration tests for the auto-provisioning login protocol.

use std::sync::Arc;

use school_records::auth::{LoginOutcome, login};
use school_records::models::Role;
use school_records::{Error, SqliteDatabase, schema};
use tempfile::TempDir;

async fn setup_db(dir: &TempDir) -> Arc<SqliteDatabase> {
   let db = SqliteDatabase::connect(dir.path().join("school.db"), None)
      .await
      .unwrap();
   schema::initialize(&db).await.unwrap();
   Arc::new(db)
}

async fn count(db: &SqliteDatabase, sql: &str) -> i64 {
   sqlx::query_scalar(sql)
      .fetch_one(db.read_pool().unwrap())
      .await
      .unwrap()
}

// ============================================================================
// First login provisions, second login reuses
// ============================================================================

#[tokio::test]
async fn unknown_username_with_default_password_provisions_student() {
   let dir = TempDir::new().unwrap();
   let db = setup_db(&dir).await;

   let outcome = login(&db, "u1", "123456").await.unwrap();
   let LoginOutcome::Authenticated { user, auto_created } = outcome else {
      panic!("expected authentication, got {outcome:?}");
   };
   assert!(auto_created);
   assert_eq!(user.username, "u1");
   assert_eq!(user.role, Role::Student);
   assert_eq!(user.student_id.as_deref(), Some("u1"));

   // The linked student record exists with the username as both key and name.
   let (name, gender): (String, String) =
      sqlx::query_as("SELECT name, gender FROM students WHERE student_id = 'u1'")
         .fetch_one(db.read_pool().unwrap())
         .await
         .unwrap();
   assert_eq!(name, "u1");
   assert_eq!(gender, "unknown");
}

#[tokio::test]
async fn repeat_login_reuses_the_provisioned_pair() {
   let dir = TempDir::new().unwrap();
   let db = setup_db(&dir).await;

   let first = login(&db, "u1", "123456").await.unwrap();
   let LoginOutcome::Authenticated { user: first_user, auto_created: true } = first else {
      panic!("expected auto-created authentication, got {first:?}");
   };

   let second = login(&db, "u1", "123456").await.unwrap();
   let LoginOutcome::Authenticated { user: second_user, auto_created } = second else {
      panic!("expected authentication, got {second:?}");
   };
   assert!(!auto_created);
   assert_eq!(second_user.id, first_user.id);
   assert_eq!(second_user.student_id, first_user.student_id);

   assert_eq!(count(&db, "SELECT COUNT(*) FROM accounts WHERE username = 'u1'").await, 1);
   assert_eq!(count(&db, "SELECT COUNT(*) FROM students WHERE student_id = 'u1'").await, 1);
}

#[tokio::test]
async fn provisioning_links_an_existing_student_by_key() {
   let dir = TempDir::new().unwrap();
   let db = setup_db(&dir).await;

   db.execute_write(
      "INSERT INTO students (student_id, name, gender, created_at) \
       VALUES ('s100', 'Jin Park', 'male', '2026-01-01T00:00:00Z')",
      &[],
   )
   .await
   .unwrap();

   let outcome = login(&db, "s100", "123456").await.unwrap();
   let LoginOutcome::Authenticated { user, auto_created: true } = outcome else {
      panic!("expected auto-created authentication, got {outcome:?}");
   };
   assert_eq!(user.student_id.as_deref(), Some("s100"));

   // No second student record was created.
   assert_eq!(count(&db, "SELECT COUNT(*) FROM students").await, 1);
}

// ============================================================================
// Rejections
// ============================================================================

#[tokio::test]
async fn wrong_password_on_existing_account_is_rejected() {
   let dir = TempDir::new().unwrap();
   let db = setup_db(&dir).await;

   let outcome = login(&db, "admin", "nope").await.unwrap();
   assert!(matches!(outcome, LoginOutcome::Rejected { .. }));

   // Default password against an existing non-default account hits the
   // username conflict check: a rejection, never an overwrite, a duplicate,
   // or an authentication.
   let outcome = login(&db, "admin", "123456").await.unwrap();
   let LoginOutcome::Rejected { message } = outcome else {
      panic!("expected rejection, got {outcome:?}");
   };
   assert_eq!(message, "username exists, password incorrect");
   assert_eq!(count(&db, "SELECT COUNT(*) FROM accounts WHERE username = 'admin'").await, 1);
}

#[tokio::test]
async fn unknown_username_with_non_default_password_is_rejected() {
   let dir = TempDir::new().unwrap();
   let db = setup_db(&dir).await;

   let outcome = login(&db, "stranger", "secret").await.unwrap();
   assert!(matches!(outcome, LoginOutcome::Rejected { .. }));
   assert_eq!(
      count(&db, "SELECT COUNT(*) FROM accounts WHERE username = 'stranger'").await,
      0
   );
}

#[tokio::test]
async fn missing_credentials_are_an_invalid_request() {
   let dir = TempDir::new().unwrap();
   let db = setup_db(&dir).await;

   let err = login(&db, "", "123456").await.unwrap_err();
   assert!(matches!(err, Error::InvalidRequest(_)));
   assert_eq!(err.http_status(), 400);

   let err = login(&db, "u1", "").await.unwrap_err();
   assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
async fn seeded_admin_account_authenticates() {
   let dir = TempDir::new().unwrap();
   let db = setup_db(&dir).await;

   let outcome = login(&db, "admin", "admin123").await.unwrap();
   let LoginOutcome::Authenticated { user, auto_created } = outcome else {
      panic!("expected authentication, got {outcome:?}");
   };
   assert!(!auto_created);
   assert_eq!(user.role, Role::Admin);
   assert_eq!(user.student_id, None);
}

// ============================================================================
// Concurrency: the uniqueness constraint is the serialization point
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_first_logins_provision_exactly_one_pair() {
   let dir = TempDir::new().unwrap();
   let db = setup_db(&dir).await;

   let mut handles = Vec::new();
   for _ in 0..8 {
      let db = Arc::clone(&db);
      handles.push(tokio::spawn(async move {
         login(&db, "u-race", "123456").await.unwrap()
      }));
   }

   let mut auto_created_count = 0;
   for handle in handles {
      match handle.await.unwrap() {
         LoginOutcome::Authenticated { auto_created, user } => {
            if auto_created {
               auto_created_count += 1;
            }
            assert_eq!(user.username, "u-race");
         }
         // Losers fail softly or are rejected by the username conflict
         // check, depending on where their reads fell relative to the
         // winner's commit. Neither is a second provisioning success.
         LoginOutcome::ProvisionFailed { .. } | LoginOutcome::Rejected { .. } => {}
      }
   }

   assert_eq!(auto_created_count, 1);
   assert_eq!(
      count(&db, "SELECT COUNT(*) FROM accounts WHERE username = 'u-race'").await,
      1
   );
   assert_eq!(
      count(&db, "SELECT COUNT(*) FROM students WHERE student_id = 'u-race'").await,
      1
   );
}
