//! Engine-side data model for the jstables bridge: logical types and their
//! textual names, values, output schemas, and the batches a scan fills.

mod chunk;
mod err;
mod kind;
mod schema;
mod utils;
pub mod value;

pub use self::chunk::{DataChunk, STANDARD_VECTOR_SIZE};
pub use self::err::Error;
pub use self::kind::LogicalType;
pub use self::schema::{Column, ColumnSchema};
pub use self::value::Value;
