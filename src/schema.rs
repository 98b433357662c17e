//! Idempotent schema creation, additive migrations, and seed accounts.
//!
//! [`initialize`] is the explicit initialization routine invoked once at
//! process start. Running it again is harmless: tables are created with IF
//! NOT EXISTS, migrations check column presence first, and default accounts
//! are seeded only while the accounts table is empty.

use school_conn::SqliteDatabase;
use tracing::info;

use crate::error::Result;
use crate::models::{Role, now_iso};
use crate::password::hash_password;

const CREATE_ACCOUNTS: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   username TEXT UNIQUE NOT NULL,
   password TEXT NOT NULL,
   role TEXT NOT NULL DEFAULT 'admin',
   created_at TEXT NOT NULL
)
"#;

const CREATE_STUDENTS: &str = r#"
CREATE TABLE IF NOT EXISTS students (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   student_id TEXT UNIQUE NOT NULL,
   name TEXT NOT NULL,
   gender TEXT NOT NULL,
   age INTEGER,
   contact TEXT,
   family_info TEXT,
   class_name TEXT,
   teacher TEXT,
   created_at TEXT NOT NULL
)
"#;

const CREATE_COURSES: &str = r#"
CREATE TABLE IF NOT EXISTS courses (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   course_code TEXT UNIQUE,
   course_name TEXT NOT NULL,
   teacher TEXT,
   credits INTEGER,
   created_at TEXT NOT NULL
)
"#;

const CREATE_ENROLLMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS enrollments (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   student_id TEXT NOT NULL,
   course_id INTEGER NOT NULL,
   exam_score REAL,
   daily_score REAL,
   final_score REAL,
   semester TEXT,
   created_at TEXT NOT NULL,
   UNIQUE (student_id, course_id),
   FOREIGN KEY (student_id) REFERENCES students(student_id),
   FOREIGN KEY (course_id) REFERENCES courses(id)
)
"#;

const CREATE_ATTENDANCE: &str = r#"
CREATE TABLE IF NOT EXISTS attendance (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   student_id TEXT NOT NULL,
   course_id INTEGER,
   date TEXT NOT NULL,
   status TEXT NOT NULL,
   reason TEXT,
   created_at TEXT NOT NULL,
   FOREIGN KEY (student_id) REFERENCES students(student_id),
   FOREIGN KEY (course_id) REFERENCES courses(id)
)
"#;

const CREATE_REWARDS_PUNISHMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS rewards_punishments (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   student_id TEXT NOT NULL,
   type TEXT NOT NULL,
   title TEXT NOT NULL,
   description TEXT,
   date TEXT NOT NULL,
   created_at TEXT NOT NULL,
   FOREIGN KEY (student_id) REFERENCES students(student_id)
)
"#;

const CREATE_GUARDIANS: &str = r#"
CREATE TABLE IF NOT EXISTS guardians (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   student_id TEXT NOT NULL,
   name TEXT NOT NULL,
   relationship TEXT NOT NULL,
   phone TEXT NOT NULL,
   email TEXT,
   address TEXT,
   created_at TEXT NOT NULL,
   FOREIGN KEY (student_id) REFERENCES students(student_id)
)
"#;

/// Default accounts seeded exactly once, while the accounts table is empty.
const DEFAULT_ACCOUNTS: [(&str, &str, Role); 3] = [
   ("admin", "admin123", Role::Admin),
   ("teacher", "teacher123", Role::Teacher),
   ("student", "student123", Role::Student),
];

/// Ensure all tables exist, apply additive column migrations, and seed
/// default accounts on first run.
pub async fn initialize(db: &SqliteDatabase) -> Result<()> {
   for sql in [
      CREATE_ACCOUNTS,
      CREATE_STUDENTS,
      CREATE_COURSES,
      CREATE_ENROLLMENTS,
      CREATE_ATTENDANCE,
      CREATE_REWARDS_PUNISHMENTS,
      CREATE_GUARDIANS,
   ] {
      db.execute_write(sql, &[]).await?;
   }

   migrate_attendance_course_id(db).await?;
   seed_default_accounts(db).await?;

   Ok(())
}

/// Legacy attendance tables predate the course link; add the column when it
/// is missing.
async fn migrate_attendance_course_id(db: &SqliteDatabase) -> Result<()> {
   let pool = db.read_pool()?;
   let columns: Vec<String> =
      sqlx::query_scalar("SELECT name FROM pragma_table_info('attendance')")
         .fetch_all(pool)
         .await?;

   if !columns.iter().any(|c| c == "course_id") {
      info!("migrating attendance table: adding course_id column");
      db.execute_write("ALTER TABLE attendance ADD COLUMN course_id INTEGER", &[])
         .await?;
   }

   Ok(())
}

async fn seed_default_accounts(db: &SqliteDatabase) -> Result<()> {
   let pool = db.read_pool()?;
   let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
      .fetch_one(pool)
      .await?;
   if count > 0 {
      return Ok(());
   }

   info!("seeding default accounts");
   let created_at = now_iso()?;
   for (username, password, role) in DEFAULT_ACCOUNTS {
      db.execute_write(
         "INSERT INTO accounts (username, password, role, created_at) VALUES (?, ?, ?, ?)",
         &[
            username.into(),
            hash_password(password).into(),
            role.as_str().into(),
            created_at.clone().into(),
         ],
      )
      .await?;
   }

   Ok(())
}
