use std::sync::Arc;

use crate::error::{Result, SqlFluentError};
use crate::types::{FromSqlValue, SqlValue};

/// Driver-agnostic raw result from a statement execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row holds one value per column in column order
    pub rows: Vec<Vec<SqlValue>>,
    /// Rows inserted, updated or deleted by the statement
    pub rows_affected: u64,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            columns,
            rows,
            rows_affected: 0,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Splits the result into rows sharing one set of column names.
    pub fn into_rows(self) -> Vec<Row> {
        let columns: Arc<[String]> = self.columns.into();
        self.rows
            .into_iter()
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect()
    }
}

/// Lookup key for a column of a [`Row`]: a zero-based position or a name.
pub trait ColumnIndex {
    fn index_in(&self, columns: &[String]) -> Option<usize>;

    /// Human readable form, used in error messages.
    fn describe(&self) -> String;
}

impl ColumnIndex for usize {
    fn index_in(&self, columns: &[String]) -> Option<usize> {
        (*self < columns.len()).then_some(*self)
    }

    fn describe(&self) -> String {
        format!("#{}", self)
    }
}

impl ColumnIndex for str {
    fn index_in(&self, columns: &[String]) -> Option<usize> {
        columns
            .iter()
            .position(|c| c == self)
            .or_else(|| columns.iter().position(|c| c.eq_ignore_ascii_case(self)))
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl ColumnIndex for String {
    fn index_in(&self, columns: &[String]) -> Option<usize> {
        self.as_str().index_in(columns)
    }

    fn describe(&self) -> String {
        self.clone()
    }
}

impl<T: ColumnIndex + ?Sized> ColumnIndex for &T {
    fn index_in(&self, columns: &[String]) -> Option<usize> {
        (**self).index_in(columns)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// A single row of a result set.
/// Values are accessed by column name or position.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Gets the raw value of a column.
    pub fn value<I: ColumnIndex>(&self, index: I) -> Result<&SqlValue> {
        index
            .index_in(&self.columns)
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| SqlFluentError::ColumnNotFound(index.describe()))
    }

    /// Gets a column converted to `T`.
    ///
    /// ```ignore
    /// let id: i64 = row.get("id")?;
    /// let name: Option<String> = row.get(1)?;
    /// ```
    pub fn get<T: FromSqlValue, I: ColumnIndex>(&self, index: I) -> Result<T> {
        let value = self.value(&index)?;
        T::from_sql_value(value).ok_or_else(|| SqlFluentError::InvalidColumnType {
            column: index.describe(),
            expected: std::any::type_name::<T>(),
            actual: value.type_name(),
        })
    }

    /// Returns all column names in this row, in result-set order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns all values in this row, in column order.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
