//! Weighted final-score computation.

/// Weighted final score: 70% exam, 30% daily work. Absent inputs count as
/// zero. Computed server-side on every enrollment write; a client-supplied
/// final score is never trusted.
pub fn final_score(exam: Option<f64>, daily: Option<f64>) -> f64 {
   exam.unwrap_or(0.0) * 0.7 + daily.unwrap_or(0.0) * 0.3
}

#[cfg(test)]
mod tests {
   use super::*;

   const TOLERANCE: f64 = 1e-9;

   #[test]
   fn weights_exam_seventy_daily_thirty() {
      assert!((final_score(Some(80.0), Some(90.0)) - 83.0).abs() < TOLERANCE);
      assert!((final_score(Some(100.0), Some(0.0)) - 70.0).abs() < TOLERANCE);
   }

   #[test]
   fn absent_inputs_count_as_zero() {
      assert!((final_score(None, None)).abs() < TOLERANCE);
      assert!((final_score(Some(50.0), None) - 35.0).abs() < TOLERANCE);
      assert!((final_score(None, Some(50.0)) - 15.0).abs() < TOLERANCE);
   }
}
