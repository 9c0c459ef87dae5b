//! In-memory, strongly typed tables.
//!
//! A [`Table`](table::Table) holds one [`Column`](column::Column) per field of
//! its [`Schema`](schema::Schema). Rows are addressed by index or through
//! [`Tuple`](tuple::Tuple) handles that notice when their row is deleted, and
//! [`Expression`](expression::Expression) trees filter and derive values over
//! them.

pub mod column;
pub mod config;
pub mod error;
pub mod event;
pub mod expression;
pub mod loader;
pub mod schema;
pub mod table;
pub mod tuple;
pub mod value;

pub use error::{DataError, DataResult};
pub use schema::Schema;
pub use table::{Field, Table};
pub use tuple::Tuple;
pub use value::{DataType, Value};
