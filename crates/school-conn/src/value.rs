//! Positional bind values for parameterized statements.
//!
//! Statement text never contains interpolated values; everything dynamic is
//! carried as a [`BindValue`] and bound positionally at execution time.

use sqlx::Sqlite;
use sqlx::query::{Query, QueryAs, QueryScalar};
use sqlx::sqlite::SqliteArguments;

/// A single positional bind value.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
   Null,
   Integer(i64),
   Real(f64),
   Text(String),
}

impl BindValue {
   /// Bind this value to a plain query.
   pub fn bind<'q>(
      &self,
      query: Query<'q, Sqlite, SqliteArguments<'q>>,
   ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
      match self {
         BindValue::Null => query.bind(Option::<i64>::None),
         BindValue::Integer(v) => query.bind(*v),
         BindValue::Real(v) => query.bind(*v),
         BindValue::Text(v) => query.bind(v.clone()),
      }
   }

   /// Bind this value to a typed `query_as` query.
   pub fn bind_as<'q, T>(
      &self,
      query: QueryAs<'q, Sqlite, T, SqliteArguments<'q>>,
   ) -> QueryAs<'q, Sqlite, T, SqliteArguments<'q>> {
      match self {
         BindValue::Null => query.bind(Option::<i64>::None),
         BindValue::Integer(v) => query.bind(*v),
         BindValue::Real(v) => query.bind(*v),
         BindValue::Text(v) => query.bind(v.clone()),
      }
   }

   /// Bind this value to a `query_scalar` query.
   pub fn bind_scalar<'q, O>(
      &self,
      query: QueryScalar<'q, Sqlite, O, SqliteArguments<'q>>,
   ) -> QueryScalar<'q, Sqlite, O, SqliteArguments<'q>> {
      match self {
         BindValue::Null => query.bind(Option::<i64>::None),
         BindValue::Integer(v) => query.bind(*v),
         BindValue::Real(v) => query.bind(*v),
         BindValue::Text(v) => query.bind(v.clone()),
      }
   }
}

impl From<i64> for BindValue {
   fn from(v: i64) -> Self {
      BindValue::Integer(v)
   }
}

impl From<f64> for BindValue {
   fn from(v: f64) -> Self {
      BindValue::Real(v)
   }
}

impl From<&str> for BindValue {
   fn from(v: &str) -> Self {
      BindValue::Text(v.to_string())
   }
}

impl From<String> for BindValue {
   fn from(v: String) -> Self {
      BindValue::Text(v)
   }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
   fn from(v: Option<T>) -> Self {
      match v {
         Some(inner) => inner.into(),
         None => BindValue::Null,
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn from_option_maps_none_to_null() {
      assert_eq!(BindValue::from(Option::<i64>::None), BindValue::Null);
      assert_eq!(BindValue::from(Some(3_i64)), BindValue::Integer(3));
   }

   #[test]
   fn from_str_owns_text() {
      assert_eq!(BindValue::from("abc"), BindValue::Text("abc".to_string()));
   }
}
