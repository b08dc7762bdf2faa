use crate::error::Result;
use crate::types::Row;

/// Types that can be built from a single result row.
///
/// # Example
/// ```ignore
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl RowDecodable for User {
///     fn decode(row: &Row) -> Result<Self> {
///         Ok(Self {
///             id: row.get("id")?,
///             name: row.get("name")?,
///         })
///     }
/// }
/// ```
pub trait RowDecodable: Sized {
    fn decode(row: &Row) -> Result<Self>;
}
