//! Login with first-login auto-provisioning.
//!
//! A login with an unknown username and the default password atomically
//! creates a student account plus its linked student record in one immediate
//! transaction. The `username` uniqueness constraint is the sole
//! serialization point: when two such logins race, exactly one insert
//! commits and the loser is rejected or surfaces a soft provisioning
//! failure, never a second account.

use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use school_conn::SqliteDatabase;

use crate::error::{Error, Result};
use crate::models::{Role, now_iso};
use crate::password::{DEFAULT_PASSWORD, hash_password};

/// A successfully authenticated account, with the linked student key
/// resolved for student-role accounts.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
   pub id: i64,
   pub username: String,
   pub role: Role,
   pub student_id: Option<String>,
}

/// Outcome of a login attempt. Rejections and provisioning failures are
/// ordinary outcomes, not errors; [`Error`] is reserved for malformed
/// requests and store failures.
#[derive(Debug)]
pub enum LoginOutcome {
   Authenticated {
      user: AuthenticatedUser,
      auto_created: bool,
   },
   Rejected {
      message: String,
   },
   ProvisionFailed {
      message: String,
   },
}

/// Authenticate `username`/`password`, auto-provisioning a student account
/// when the username is unknown and the password is the default.
pub async fn login(db: &SqliteDatabase, username: &str, password: &str) -> Result<LoginOutcome> {
   if username.trim().is_empty() || password.is_empty() {
      return Err(Error::InvalidRequest(
         "username and password are required".to_string(),
      ));
   }

   let pool = db.read_pool()?;
   let matched: Option<(i64, String, Role)> = sqlx::query_as(
      "SELECT id, username, role FROM accounts WHERE username = ? AND password = ?",
   )
   .bind(username)
   .bind(hash_password(password))
   .fetch_optional(pool)
   .await?;

   if let Some((id, username, role)) = matched {
      let student_id = match role {
         Role::Student => resolve_linked_student(db, &username).await?,
         _ => None,
      };
      return Ok(LoginOutcome::Authenticated {
         user: AuthenticatedUser {
            id,
            username,
            role,
            student_id,
         },
         auto_created: false,
      });
   }

   if password != DEFAULT_PASSWORD {
      return Ok(LoginOutcome::Rejected {
         message: "invalid username or password".to_string(),
      });
   }

   // An existing row for this username means the stored password differs
   // from the default, so this is a rejection, never a provision. A provision
   // committed by a racing login between the two lookups also lands here and
   // is rejected; the next attempt authenticates normally.
   let username_taken: Option<i64> = sqlx::query_scalar("SELECT 1 FROM accounts WHERE username = ?")
      .bind(username)
      .fetch_optional(pool)
      .await?;
   if username_taken.is_some() {
      return Ok(LoginOutcome::Rejected {
         message: "username exists, password incorrect".to_string(),
      });
   }

   match provision_student_account(db, username).await {
      Ok(()) => {}
      Err(Error::Provision(message)) => {
         warn!(username, %message, "student auto-provisioning failed");
         return Ok(LoginOutcome::ProvisionFailed { message });
      }
      Err(other) => return Err(other),
   }

   let (id, role): (i64, Role) =
      sqlx::query_as("SELECT id, role FROM accounts WHERE username = ?")
         .bind(username)
         .fetch_one(pool)
         .await?;
   let student_id = resolve_linked_student(db, username).await?;

   Ok(LoginOutcome::Authenticated {
      user: AuthenticatedUser {
         id,
         username: username.to_string(),
         role,
         student_id,
      },
      auto_created: true,
   })
}

/// Resolve the student record linked to a student-role account: the account
/// username is matched against the student business key first, then against
/// the student name.
pub async fn resolve_linked_student(
   db: &SqliteDatabase,
   username: &str,
) -> Result<Option<String>> {
   let pool = db.read_pool()?;
   let student_id: Option<String> = sqlx::query_scalar(
      "SELECT student_id FROM students WHERE student_id = ? OR name = ? \
       ORDER BY student_id = ? DESC LIMIT 1",
   )
   .bind(username)
   .bind(username)
   .bind(username)
   .fetch_optional(pool)
   .await?;
   Ok(student_id)
}

/// Create the account row and, when no student record already answers to
/// the username, the student row, in one immediate transaction. Any failure
/// rolls the whole pair back and reports as a provisioning failure.
async fn provision_student_account(db: &SqliteDatabase, username: &str) -> Result<()> {
   let created_at = now_iso()?;
   let mut tx = db.begin_immediate().await?;

   let result = provision_in_tx(&mut tx, username, &created_at).await;
   match result {
      Ok(()) => {
         tx.commit()
            .await
            .map_err(|e| Error::Provision(format!("commit failed: {e}")))?;
         Ok(())
      }
      Err(err) => {
         if let Err(rollback_err) = tx.rollback().await {
            warn!(%rollback_err, "rollback after failed provisioning also failed");
         }
         Err(Error::Provision(err.to_string()))
      }
   }
}

async fn provision_in_tx(
   tx: &mut school_conn::ImmediateTransaction,
   username: &str,
   created_at: &str,
) -> Result<()> {
   tx.execute(
      "INSERT INTO accounts (username, password, role, created_at) VALUES (?, ?, 'student', ?)",
      &[
         username.into(),
         hash_password(DEFAULT_PASSWORD).into(),
         created_at.into(),
      ],
   )
   .await?;

   let linked = tx
      .fetch_optional(
         "SELECT student_id FROM students WHERE student_id = ? OR name = ? LIMIT 1",
         &[username.into(), username.into()],
      )
      .await?;
   if linked.is_some() {
      return Ok(());
   }

   let student_id = disambiguated_student_id(tx, username).await?;
   tx.execute(
      "INSERT INTO students (student_id, name, gender, family_info, created_at) \
       VALUES (?, ?, 'unknown', '{}', ?)",
      &[
         student_id.as_str().into(),
         username.into(),
         created_at.into(),
      ],
   )
   .await?;

   Ok(())
}

/// The username is preferred as the student key; when a student already
/// holds that key under a different name, a timestamped suffix keeps the
/// new key unique. Best effort: the suffix itself is not re-checked, the
/// key's UNIQUE constraint remains the backstop.
async fn disambiguated_student_id(
   tx: &mut school_conn::ImmediateTransaction,
   username: &str,
) -> Result<String> {
   let taken = tx
      .fetch_optional(
         "SELECT 1 FROM students WHERE student_id = ?",
         &[username.into()],
      )
      .await?;
   if taken.is_none() {
      return Ok(username.to_string());
   }

   let ts = OffsetDateTime::now_utc().unix_timestamp();
   let nonce = Uuid::new_v4().simple().to_string();
   Ok(format!("{username}_{ts}_{}", &nonce[..8]))
}
