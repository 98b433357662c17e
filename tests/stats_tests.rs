//! Integration tests for the aggregate statistics overview.

use std::sync::Arc;

use school_records::models::{NewAttendance, NewCourse, NewEnrollment, NewStudent};
use school_records::repo::{AttendanceRepo, CourseRepo, EnrollmentRepo, StudentRepo};
use school_records::{SqliteDatabase, schema, stats};
use tempfile::TempDir;

async fn setup_db(dir: &TempDir) -> Arc<SqliteDatabase> {
   let db = SqliteDatabase::connect(dir.path().join("school.db"), None)
      .await
      .unwrap();
   schema::initialize(&db).await.unwrap();
   Arc::new(db)
}

#[tokio::test]
async fn empty_store_yields_zeroes() {
   let dir = TempDir::new().unwrap();
   let db = setup_db(&dir).await;

   let overview = stats::overview(&db).await.unwrap();
   assert_eq!(overview.student_count, 0);
   assert_eq!(overview.course_count, 0);
   assert_eq!(overview.avg_score, 0.0);
   assert_eq!(overview.attendance_rate, 0.0);
   assert!(overview.course_statistics.is_empty());
}

#[tokio::test]
async fn overview_aggregates_scores_and_attendance() {
   let dir = TempDir::new().unwrap();
   let db = setup_db(&dir).await;
   let students = StudentRepo::new(Arc::clone(&db));
   let courses = CourseRepo::new(Arc::clone(&db));
   let enrollments = EnrollmentRepo::new(Arc::clone(&db));
   let attendance = AttendanceRepo::new(Arc::clone(&db));

   for (sid, name) in [("S001", "One"), ("S002", "Two")] {
      students
         .create(&NewStudent {
            student_id: sid.to_string(),
            name: name.to_string(),
            gender: "female".to_string(),
            ..Default::default()
         })
         .await
         .unwrap();
   }
   let math = courses
      .create(&NewCourse {
         course_code: Some("MATH1".to_string()),
         course_name: "Math".to_string(),
         teacher: None,
         credits: Some(4),
      })
      .await
      .unwrap();

   // Final scores 83 and 53 for an average of 68.
   for (sid, exam, daily) in [("S001", 80.0, 90.0), ("S002", 50.0, 60.0)] {
      enrollments
         .create(&NewEnrollment {
            student_id: sid.to_string(),
            course_id: math,
            exam_score: Some(exam),
            daily_score: Some(daily),
            semester: None,
         })
         .await
         .unwrap();
   }

   // Three records, two present: a 66.67% rate after rounding.
   for (sid, date, status) in [
      ("S001", "2026-03-02", "present"),
      ("S001", "2026-03-03", "absent"),
      ("S002", "2026-03-02", "present"),
   ] {
      attendance
         .create(&NewAttendance {
            student_id: sid.to_string(),
            date: date.to_string(),
            status: status.to_string(),
            course_id: Some(math),
            reason: None,
         })
         .await
         .unwrap();
   }

   let overview = stats::overview(&db).await.unwrap();
   assert_eq!(overview.student_count, 2);
   assert_eq!(overview.course_count, 1);
   assert_eq!(overview.avg_score, 68.0);
   assert_eq!(overview.attendance_rate, 66.67);

   assert_eq!(overview.course_statistics.len(), 1);
   let math_stats = &overview.course_statistics[0];
   assert_eq!(math_stats.course_id, math);
   assert_eq!(math_stats.course_code.as_deref(), Some("MATH1"));
   assert_eq!(math_stats.avg_score, 68.0);
   assert_eq!(math_stats.attendance_rate, 66.67);
}

#[tokio::test]
async fn course_without_data_reports_zero_rates() {
   let dir = TempDir::new().unwrap();
   let db = setup_db(&dir).await;
   let courses = CourseRepo::new(Arc::clone(&db));

   courses
      .create(&NewCourse {
         course_code: None,
         course_name: "Empty Elective".to_string(),
         teacher: None,
         credits: None,
      })
      .await
      .unwrap();

   let overview = stats::overview(&db).await.unwrap();
   assert_eq!(overview.course_statistics.len(), 1);
   assert_eq!(overview.course_statistics[0].avg_score, 0.0);
   assert_eq!(overview.course_statistics[0].attendance_rate, 0.0);
}
