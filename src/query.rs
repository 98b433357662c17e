//! Typed predicate and pagination building for filtered list queries.
//!
//! Replaces ad hoc string-built filters with a list of (column, value)
//! equality predicates compiled into parameterized fragments. Values are
//! always bound positionally; column identifiers are validated and quoted
//! before interpolation. Pagination is plain LIMIT/OFFSET with the total
//! computed under the same predicate, so an out-of-range page yields an
//! empty data array with the total unchanged.

use school_conn::BindValue;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Page selector for list operations.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
   #[serde(default = "default_page")]
   pub page: i64,
   #[serde(default = "default_limit")]
   pub limit: i64,
}

fn default_page() -> i64 {
   1
}

fn default_limit() -> i64 {
   10
}

impl Default for PageParams {
   fn default() -> Self {
      Self { page: 1, limit: 10 }
   }
}

impl PageParams {
   pub fn new(page: i64, limit: i64) -> Self {
      Self { page, limit }
   }

   /// Page and limit must both be positive integers.
   pub fn validate(&self) -> Result<()> {
      if self.page < 1 || self.limit < 1 {
         return Err(Error::InvalidRequest(
            "page and limit must be positive integers".to_string(),
         ));
      }
      Ok(())
   }

   pub fn offset(&self) -> i64 {
      (self.page - 1) * self.limit
   }
}

/// One page of results plus the total row count under the same predicate.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
   pub total: i64,
   pub data: Vec<T>,
   pub page: i64,
   pub limit: i64,
}

/// Builder composing equality predicates into parameterized SQL fragments.
#[derive(Debug)]
pub struct ListQuery {
   base: String,
   conditions: Vec<String>,
   args: Vec<BindValue>,
}

impl ListQuery {
   /// Start from a base SELECT with no top-level WHERE clause.
   pub fn new(base: impl Into<String>) -> Self {
      Self {
         base: base.into(),
         conditions: Vec::new(),
         args: Vec::new(),
      }
   }

   /// Add `column = ?` when the filter value is present; absence means no
   /// filter on that field.
   pub fn filter_eq(mut self, column: &str, value: Option<impl Into<BindValue>>) -> Result<Self> {
      if let Some(value) = value {
         validate_column_name(column)?;
         self.conditions.push(format!("{} = ?", quote_identifier(column)));
         self.args.push(value.into());
      }
      Ok(self)
   }

   /// Bind values, in predicate order.
   pub fn args(&self) -> &[BindValue] {
      &self.args
   }

   /// COUNT query over the same predicate as the data query.
   pub fn count_sql(&self) -> String {
      format!("SELECT COUNT(*) FROM ({}{})", self.base, self.where_clause())
   }

   /// Data query with ordering and LIMIT/OFFSET applied.
   ///
   /// `order_by` is a repository-supplied constant, never caller input.
   pub fn page_sql(&self, order_by: &str, params: &PageParams) -> String {
      format!(
         "{}{} ORDER BY {} LIMIT {} OFFSET {}",
         self.base,
         self.where_clause(),
         order_by,
         params.limit,
         params.offset()
      )
   }

   fn where_clause(&self) -> String {
      if self.conditions.is_empty() {
         String::new()
      } else {
         format!(" WHERE {}", self.conditions.join(" AND "))
      }
   }
}

/// Validate that a column name is safe for SQL interpolation.
///
/// Accepts names matching `[a-zA-Z_][a-zA-Z0-9_.]*`, which covers plain
/// column names and qualified names (e.g., `table.column`).
pub(crate) fn validate_column_name(name: &str) -> Result<()> {
   let mut chars = name.chars();
   let Some(first) = chars.next() else {
      return Err(Error::InvalidRequest("empty column name".to_string()));
   };
   if !first.is_ascii_alphabetic() && first != '_' {
      return Err(Error::InvalidRequest(format!("invalid column name '{name}'")));
   }
   for ch in chars {
      if !ch.is_ascii_alphanumeric() && ch != '_' && ch != '.' {
         return Err(Error::InvalidRequest(format!("invalid column name '{name}'")));
      }
   }
   Ok(())
}

/// Quote a column name with double-quote identifiers for defense-in-depth.
/// Qualified names are quoted per segment so the dot keeps its meaning.
pub(crate) fn quote_identifier(name: &str) -> String {
   name
      .split('.')
      .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
      .collect::<Vec<_>>()
      .join(".")
}
