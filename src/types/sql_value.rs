/// Represents a SQL value in a driver-agnostic way.
/// Used both for bound parameters and for the cells of result rows.
/// Drivers are responsible for converting these to and from their native types.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Short name of the value kind, used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "NULL",
            SqlValue::Bool(_) => "a boolean",
            SqlValue::Int32(_) | SqlValue::Int64(_) => "an integer",
            SqlValue::Float64(_) => "a floating point number",
            SqlValue::Text(_) => "text",
            SqlValue::Bytes(_) => "bytes",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int32(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int64(value)
    }
}

impl From<f32> for SqlValue {
    fn from(value: f32) -> Self {
        SqlValue::Float64(value.into())
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float64(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Bytes(value)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(value: &[u8]) -> Self {
        SqlValue::Bytes(value.to_vec())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

/// Conversion from a result cell into a Rust value.
///
/// Conversions are lenient across the representations backends actually
/// return: SQLite stores booleans as integers and MySQL may hand back numbers
/// as text, so numeric targets also accept numeric text.
pub trait FromSqlValue: Sized {
    /// Returns `None` when the value cannot represent `Self`.
    fn from_sql_value(value: &SqlValue) -> Option<Self>;
}

fn as_text(value: &SqlValue) -> Option<&str> {
    match value {
        SqlValue::Text(s) => Some(s.as_str()),
        SqlValue::Bytes(b) => std::str::from_utf8(b).ok(),
        _ => None,
    }
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Int32(v) => Some((*v).into()),
            SqlValue::Int64(v) => Some(*v),
            SqlValue::Bool(v) => Some(*v as i64),
            other => as_text(other).and_then(|s| s.trim().parse().ok()),
        }
    }
}

impl FromSqlValue for i32 {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        i64::from_sql_value(value).and_then(|v| i32::try_from(v).ok())
    }
}

impl FromSqlValue for u64 {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Text(_) | SqlValue::Bytes(_) => {
                as_text(value).and_then(|s| s.trim().parse().ok())
            }
            other => i64::from_sql_value(other).and_then(|v| u64::try_from(v).ok()),
        }
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Float64(v) => Some(*v),
            SqlValue::Int32(v) => Some((*v).into()),
            SqlValue::Int64(v) => Some(*v as f64),
            other => as_text(other).and_then(|s| s.trim().parse().ok()),
        }
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Bool(v) => Some(*v),
            SqlValue::Int32(v) => Some(*v != 0),
            SqlValue::Int64(v) => Some(*v != 0),
            other => match as_text(other)? {
                "1" | "true" | "TRUE" => Some(true),
                "0" | "false" | "FALSE" => Some(false),
                _ => None,
            },
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        as_text(value).map(str::to_string)
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Bytes(b) => Some(b.clone()),
            SqlValue::Text(s) => Some(s.clone().into_bytes()),
            _ => None,
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Null => Some(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_option() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("a")), SqlValue::Text("a".to_string()));
    }

    #[test]
    fn test_integer_widening_and_narrowing() {
        assert_eq!(i64::from_sql_value(&SqlValue::Int32(7)), Some(7));
        assert_eq!(i32::from_sql_value(&SqlValue::Int64(7)), Some(7));
        assert_eq!(i32::from_sql_value(&SqlValue::Int64(i64::MAX)), None);
        assert_eq!(u64::from_sql_value(&SqlValue::Int64(-1)), None);
    }

    #[test]
    fn test_numeric_text() {
        assert_eq!(i64::from_sql_value(&SqlValue::Bytes(b"42".to_vec())), Some(42));
        assert_eq!(f64::from_sql_value(&SqlValue::Text("1.5".into())), Some(1.5));
        assert_eq!(i64::from_sql_value(&SqlValue::Text("abc".into())), None);
    }

    #[test]
    fn test_bool_from_integer() {
        assert_eq!(bool::from_sql_value(&SqlValue::Int64(1)), Some(true));
        assert_eq!(bool::from_sql_value(&SqlValue::Int64(0)), Some(false));
        assert_eq!(bool::from_sql_value(&SqlValue::Float64(1.0)), None);
    }

    #[test]
    fn test_null_handling() {
        assert_eq!(Option::<String>::from_sql_value(&SqlValue::Null), Some(None));
        assert_eq!(String::from_sql_value(&SqlValue::Null), None);
        assert!(SqlValue::Null.is_null());
    }
}
