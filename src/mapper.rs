use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Result, SqlFluentError};
use crate::traits::RowDecodable;
use crate::types::Row;

type DecodeFn = dyn Fn(&Row) -> Result<Box<dyn Any + Send>> + Send + Sync;

/// Registry of row decoders, one per target type.
///
/// Lets callers pick the target type per query without the type having to
/// implement [`RowDecodable`] at the call site. A type with no registered
/// decoder fails with [`SqlFluentError::NoRowDecoder`] when its first row is
/// converted.
#[derive(Default)]
pub struct RowMapper {
    decoders: RwLock<HashMap<TypeId, Arc<DecodeFn>>>,
}

impl RowMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`'s [`RowDecodable`] implementation.
    pub fn register<T>(&self) -> &Self
    where
        T: RowDecodable + Send + 'static,
    {
        self.register_fn(T::decode)
    }

    /// Register a decoding function for `T`, replacing any previous one.
    pub fn register_fn<T, F>(&self, decode: F) -> &Self
    where
        T: Send + 'static,
        F: Fn(&Row) -> Result<T> + Send + Sync + 'static,
    {
        let decoder: Arc<DecodeFn> =
            Arc::new(move |row: &Row| decode(row).map(|v| Box::new(v) as Box<dyn Any + Send>));
        self.decoders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<T>(), decoder);
        self
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }

    /// Decode one row into `T` through its registered decoder.
    pub fn decode<T: Send + 'static>(&self, row: &Row) -> Result<T> {
        let decoder = self
            .decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .cloned()
            .ok_or(SqlFluentError::NoRowDecoder(type_name::<T>()))?;
        let value = decoder(row).map_err(construction_failed::<T>)?;
        value
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| SqlFluentError::NoRowDecoder(type_name::<T>()))
    }

    /// Decode every row, in order. The first failure discards all values.
    pub fn decode_all<T: Send + 'static>(&self, rows: Vec<Row>) -> Result<Vec<T>> {
        rows.iter().map(|row| self.decode(row)).collect()
    }
}

/// Decode one row through `T`'s [`RowDecodable`] implementation.
pub fn decode_row<T: RowDecodable>(row: &Row) -> Result<T> {
    T::decode(row).map_err(construction_failed::<T>)
}

pub(crate) fn decode_rows<T: RowDecodable>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.iter().map(decode_row).collect()
}

fn construction_failed<T>(source: SqlFluentError) -> SqlFluentError {
    SqlFluentError::Construction {
        type_name: type_name::<T>(),
        source: Box::new(source),
    }
}
