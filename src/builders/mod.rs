mod query;

pub use query::QueryBuilder;
