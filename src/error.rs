//! Domain error taxonomy.
//!
//! A small closed enumeration propagated as explicit result values, so the
//! write executor can retry strictly on lock contention and repositories can
//! map uniqueness violations without string matching at call sites.
//! Validation errors are produced at repository boundaries and never reach
//! the store.

use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds for the school records domain layer.
#[derive(Debug, Error)]
pub enum Error {
   /// Missing or malformed required fields. Recovered locally; never
   /// reaches the store.
   #[error("invalid request: {0}")]
   InvalidRequest(String),

   /// The target row does not exist.
   #[error("not found: {0}")]
   NotFound(String),

   /// A uniqueness invariant would be violated.
   #[error("conflict: {0}")]
   Conflict(String),

   /// The auto-provisioning transaction failed; everything it did was
   /// rolled back.
   #[error("provisioning failed: {0}")]
   Provision(String),

   /// Store-level fault: lock-retry exhaustion, pool unavailability, or any
   /// other database error. No partial writes are visible.
   #[error(transparent)]
   Store(#[from] school_conn::Error),

   /// Timestamp formatting failure.
   #[error("timestamp error: {0}")]
   Time(#[from] time::error::Format),
}

impl From<sqlx::Error> for Error {
   fn from(err: sqlx::Error) -> Self {
      Error::Store(school_conn::Error::Sqlx(err))
   }
}

impl Error {
   /// HTTP status code the route layer should map this error to.
   pub fn http_status(&self) -> u16 {
      match self {
         Error::InvalidRequest(_) | Error::Conflict(_) => 400,
         Error::NotFound(_) => 404,
         Error::Provision(_) | Error::Store(_) | Error::Time(_) => 500,
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn status_mapping_follows_api_convention() {
      assert_eq!(Error::InvalidRequest("x".into()).http_status(), 400);
      assert_eq!(Error::Conflict("x".into()).http_status(), 400);
      assert_eq!(Error::NotFound("x".into()).http_status(), 404);
      assert_eq!(
         Error::Store(school_conn::Error::DatabaseClosed).http_status(),
         500
      );
   }
}
