mod query_result;
mod row;
mod sql_value;

pub use query_result::{PendingResult, QueryResult};
pub use row::{ColumnIndex, RawQueryResult, Row};
pub use sql_value::{FromSqlValue, SqlValue};
