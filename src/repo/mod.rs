//! Entity repositories: CRUD plus filtered, paginated reads.
//!
//! Each repository enforces its own invariants (required fields, uniqueness,
//! referential existence) before touching the store. Writes route through
//! the retrying write executor; reads use the read pool. Connections are
//! pooled RAII handles, so release happens on every exit path.

mod accounts;
mod attendance;
mod courses;
mod enrollments;
mod guardians;
mod rewards;
mod students;

pub use accounts::AccountRepo;
pub use attendance::AttendanceRepo;
pub use courses::CourseRepo;
pub use enrollments::EnrollmentRepo;
pub use guardians::GuardianRepo;
pub use rewards::RewardPunishmentRepo;
pub use students::StudentRepo;

use school_conn::{BindValue, SqliteDatabase, is_unique_violation};

use crate::error::{Error, Result};
use crate::query::{ListQuery, Page, PageParams};

/// Map a store-level uniqueness violation to a domain conflict; any other
/// error passes through unchanged. Integrity errors are never retried, so
/// this sees them on the first attempt.
pub(crate) fn conflict_on_unique(err: Error, message: &str) -> Error {
   if let Error::Store(school_conn::Error::Sqlx(sqlx_err)) = &err
      && is_unique_violation(sqlx_err)
   {
      return Error::Conflict(message.to_string());
   }
   err
}

pub(crate) async fn student_exists(db: &SqliteDatabase, student_id: &str) -> Result<bool> {
   let pool = db.read_pool()?;
   let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM students WHERE student_id = ?")
      .bind(student_id)
      .fetch_optional(pool)
      .await?;
   Ok(found.is_some())
}

pub(crate) async fn course_exists(db: &SqliteDatabase, course_id: i64) -> Result<bool> {
   let pool = db.read_pool()?;
   let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM courses WHERE id = ?")
      .bind(course_id)
      .fetch_optional(pool)
      .await?;
   Ok(found.is_some())
}

/// Run a built list query: total under the predicate, then the requested
/// page of typed rows.
pub(crate) async fn fetch_page<T>(
   db: &SqliteDatabase,
   query: &ListQuery,
   order_by: &str,
   params: PageParams,
) -> Result<Page<T>>
where
   T: for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin,
{
   params.validate()?;
   let pool = db.read_pool()?;

   let count_sql = query.count_sql();
   let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
   for value in query.args() {
      count_query = value.bind_scalar(count_query);
   }
   let total = count_query.fetch_one(pool).await?;

   let page_sql = query.page_sql(order_by, &params);
   let mut page_query = sqlx::query_as::<_, T>(&page_sql);
   for value in query.args() {
      page_query = value.bind_as(page_query);
   }
   let data = page_query.fetch_all(pool).await?;

   Ok(Page {
      total,
      data,
      page: params.page,
      limit: params.limit,
   })
}

/// Build a partial UPDATE from (column, value) pairs. Columns are
/// repository constants; values are bound.
pub(crate) fn build_update_sql(
   table: &str,
   sets: &[(&str, BindValue)],
   key_column: &str,
) -> (String, Vec<BindValue>) {
   let fragments: Vec<String> = sets.iter().map(|(column, _)| format!("{column} = ?")).collect();
   let sql = format!(
      "UPDATE {table} SET {} WHERE {key_column} = ?",
      fragments.join(", ")
   );
   let args = sets.iter().map(|(_, value)| value.clone()).collect();
   (sql, args)
}
