//! Aggregate statistics over the whole store.

use serde::Serialize;

use school_conn::SqliteDatabase;

use crate::error::Result;
use crate::models::STATUS_PRESENT;

/// Store-wide headline numbers plus a per-course breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
   pub student_count: i64,
   pub course_count: i64,
   pub avg_score: f64,
   pub attendance_rate: f64,
   pub course_statistics: Vec<CourseStatistics>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CourseStatistics {
   pub course_id: i64,
   pub course_code: Option<String>,
   pub course_name: String,
   pub avg_score: f64,
   pub attendance_rate: f64,
}

/// Compute the overview. Rates and averages are rounded to two decimals;
/// an empty denominator yields zero rather than NULL.
pub async fn overview(db: &SqliteDatabase) -> Result<Overview> {
   let pool = db.read_pool()?;

   let student_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
      .fetch_one(pool)
      .await?;
   let course_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
      .fetch_one(pool)
      .await?;

   let avg_score: Option<f64> =
      sqlx::query_scalar("SELECT AVG(final_score) FROM enrollments WHERE final_score IS NOT NULL")
         .fetch_one(pool)
         .await?;

   let (present, attendance_total): (i64, i64) = sqlx::query_as(
      "SELECT COALESCE(SUM(status = ?), 0), COUNT(*) FROM attendance",
   )
   .bind(STATUS_PRESENT)
   .fetch_one(pool)
   .await?;
   let attendance_rate = if attendance_total > 0 {
      present as f64 / attendance_total as f64 * 100.0
   } else {
      0.0
   };

   let course_statistics: Vec<CourseStatistics> = sqlx::query_as(
      "SELECT c.id AS course_id, c.course_code, c.course_name, \
       COALESCE((SELECT AVG(sc.final_score) FROM enrollments sc \
                 WHERE sc.course_id = c.id AND sc.final_score IS NOT NULL), 0.0) AS avg_score, \
       COALESCE((SELECT SUM(a.status = ?) * 100.0 / COUNT(*) FROM attendance a \
                 WHERE a.course_id = c.id), 0.0) AS attendance_rate \
       FROM courses c ORDER BY c.id",
   )
   .bind(STATUS_PRESENT)
   .fetch_all(pool)
   .await?;

   Ok(Overview {
      student_count,
      course_count,
      avg_score: round2(avg_score.unwrap_or(0.0)),
      attendance_rate: round2(attendance_rate),
      course_statistics: course_statistics
         .into_iter()
         .map(|c| CourseStatistics {
            avg_score: round2(c.avg_score),
            attendance_rate: round2(c.attendance_rate),
            ..c
         })
         .collect(),
   })
}

fn round2(value: f64) -> f64 {
   (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
   use super::round2;

   #[test]
   fn round2_keeps_two_decimals() {
      assert_eq!(round2(83.333333), 83.33);
      assert_eq!(round2(66.666666), 66.67);
      assert_eq!(round2(0.0), 0.0);
   }
}
