mod decodable;
mod driver;

pub use decodable::RowDecodable;
pub use driver::DatabaseDriver;
