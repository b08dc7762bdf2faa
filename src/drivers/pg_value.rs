use std::error::Error;

use bytes::BytesMut;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
use tokio_postgres::types::{to_sql_checked, FromSql, IsNull, Kind, ToSql, Type};
use uuid::Uuid;

use crate::types::SqlValue;

type BoxError = Box<dyn Error + Sync + Send>;

/// A [`SqlValue`] written to or read from a PostgreSQL value of any type.
///
/// Bound values are coerced to the placeholder's declared type, so `bind(18)`
/// works against `INT2`, `INT8` or `NUMERIC` alike. Column types `SqlValue`
/// has no variant for (numeric, temporal, uuid, json) are read as text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PgValue(pub(crate) SqlValue);

impl ToSql for PgValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match &self.0 {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(v) => match *ty {
                Type::BOOL => v.to_sql(ty, out),
                _ => write_integer(i64::from(*v), ty, out),
            },
            SqlValue::Int32(v) => write_integer((*v).into(), ty, out),
            SqlValue::Int64(v) => write_integer(*v, ty, out),
            SqlValue::Float64(v) => write_float(*v, ty, out),
            SqlValue::Text(v) => write_text(v, ty, out),
            SqlValue::Bytes(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn write_integer(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::BOOL => (v != 0).to_sql(ty, out),
        Type::CHAR => i8::try_from(v)?.to_sql(ty, out),
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::INT8 => v.to_sql(ty, out),
        Type::OID => u32::try_from(v)?.to_sql(ty, out),
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        Type::NUMERIC => Decimal::from(v).to_sql(ty, out),
        _ => write_text(&v.to_string(), ty, out),
    }
}

fn write_float(v: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => v.to_sql(ty, out),
        Type::NUMERIC => Decimal::from_f64(v)
            .ok_or_else(|| format!("{} cannot be stored as numeric", v))?
            .to_sql(ty, out),
        _ => write_text(&v.to_string(), ty, out),
    }
}

fn write_text(v: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    let trimmed = v.trim();
    match *ty {
        Type::BOOL => match trimmed {
            "t" | "true" | "TRUE" | "1" => true.to_sql(ty, out),
            "f" | "false" | "FALSE" | "0" => false.to_sql(ty, out),
            _ => Err(format!("`{}` is not a boolean", v).into()),
        },
        Type::CHAR | Type::INT2 | Type::INT4 | Type::INT8 | Type::OID => {
            write_integer(trimmed.parse()?, ty, out)
        }
        Type::FLOAT4 | Type::FLOAT8 => write_float(trimmed.parse()?, ty, out),
        Type::NUMERIC => trimmed.parse::<Decimal>()?.to_sql(ty, out),
        Type::UUID => Uuid::parse_str(trimmed)?.to_sql(ty, out),
        Type::DATE => Date::parse(trimmed, format_description!("[year]-[month]-[day]"))?
            .to_sql(ty, out),
        Type::TIME => parse_time(trimmed)?.to_sql(ty, out),
        Type::TIMESTAMP => parse_timestamp(trimmed)?.to_sql(ty, out),
        Type::TIMESTAMPTZ => OffsetDateTime::parse(trimmed, &Rfc3339)?.to_sql(ty, out),
        Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(v)?.to_sql(ty, out),
        Type::BYTEA => v.as_bytes().to_sql(ty, out),
        _ if <&str as ToSql>::accepts(ty) || matches!(ty.kind(), Kind::Enum(_)) => {
            v.to_sql(ty, out)
        }
        _ => Err(format!("cannot bind text to a value of type {}", ty).into()),
    }
}

fn parse_time(v: &str) -> Result<Time, BoxError> {
    Ok(
        Time::parse(v, format_description!("[hour]:[minute]:[second].[subsecond]"))
            .or_else(|_| Time::parse(v, format_description!("[hour]:[minute]:[second]")))?,
    )
}

fn parse_timestamp(v: &str) -> Result<PrimitiveDateTime, BoxError> {
    Ok(PrimitiveDateTime::parse(
        v,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            v,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        )
    })?)
}

impl<'a> FromSql<'a> for PgValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let value = match *ty {
            Type::BOOL => SqlValue::Bool(bool::from_sql(ty, raw)?),
            Type::CHAR => SqlValue::Int32(i8::from_sql(ty, raw)?.into()),
            Type::INT2 => SqlValue::Int32(i16::from_sql(ty, raw)?.into()),
            Type::INT4 => SqlValue::Int32(i32::from_sql(ty, raw)?),
            Type::INT8 => SqlValue::Int64(i64::from_sql(ty, raw)?),
            Type::OID => SqlValue::Int64(u32::from_sql(ty, raw)?.into()),
            Type::FLOAT4 => SqlValue::Float64(f32::from_sql(ty, raw)?.into()),
            Type::FLOAT8 => SqlValue::Float64(f64::from_sql(ty, raw)?),
            Type::NUMERIC => SqlValue::Text(Decimal::from_sql(ty, raw)?.to_string()),
            Type::BYTEA => SqlValue::Bytes(raw.to_vec()),
            Type::DATE => SqlValue::Text(format_date(Date::from_sql(ty, raw)?)),
            Type::TIME => SqlValue::Text(format_time(Time::from_sql(ty, raw)?)),
            Type::TIMESTAMP => {
                let v = PrimitiveDateTime::from_sql(ty, raw)?;
                SqlValue::Text(format!("{} {}", format_date(v.date()), format_time(v.time())))
            }
            Type::TIMESTAMPTZ => {
                let v = OffsetDateTime::from_sql(ty, raw)?.to_offset(UtcOffset::UTC);
                SqlValue::Text(format!(
                    "{} {}+00:00",
                    format_date(v.date()),
                    format_time(v.time())
                ))
            }
            Type::UUID => SqlValue::Text(Uuid::from_sql(ty, raw)?.to_string()),
            Type::JSON | Type::JSONB => {
                SqlValue::Text(serde_json::Value::from_sql(ty, raw)?.to_string())
            }
            _ if <&str as FromSql>::accepts(ty) || matches!(ty.kind(), Kind::Enum(_)) => {
                SqlValue::Text(<&str>::from_sql(ty, raw)?.to_string())
            }
            _ => {
                log::debug!("Reading column of type {} as raw bytes", ty);
                SqlValue::Bytes(raw.to_vec())
            }
        };
        Ok(PgValue(value))
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(PgValue(SqlValue::Null))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn format_time(time: Time) -> String {
    let mut text = format!(
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    );
    if time.microsecond() > 0 {
        text.push_str(&format!(".{:06}", time.microsecond()));
    }
    text
}
