//! Binding JavaScript functions and exposing them to the host engine.

mod binding;
mod scalar;
pub mod schema;
mod table;

pub use self::binding::{Bound, Callable, FunctionBinding, Specifier, parse_specifier};
pub use self::scalar::{JsScalarFunction, ScalarBindData};
pub use self::table::{JsTableFunction, TableBindData, TableGlobalState, TableLocalState};
