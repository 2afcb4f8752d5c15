//! The contract between a host query engine and the functions it calls.
//!
//! A table function is bound once per query, then scanned repeatedly until
//! it returns an empty chunk. A scalar function is bound once and executed
//! for every input chunk.

use std::collections::BTreeMap;

use jstables_types::{ColumnSchema, DataChunk, LogicalType, Value};

use crate::err::Error;

/// The arguments a table function is called with in a query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableFunctionBindInput {
	pub inputs: Vec<Value>,
	pub named_parameters: BTreeMap<String, Value>,
}

impl TableFunctionBindInput {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a positional argument
	pub fn with_input(mut self, value: impl Into<Value>) -> Self {
		self.inputs.push(value.into());
		self
	}

	/// Sets a named parameter, replacing an earlier value
	pub fn with_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.named_parameters.insert(name.into(), value.into());
		self
	}

	pub fn named(&self, name: &str) -> Option<&Value> {
		self.named_parameters.get(name)
	}
}

/// The output schema of a bound function along with its bind data.
#[derive(Debug)]
pub struct BindResult<T> {
	pub schema: ColumnSchema,
	pub data: T,
}

/// State shared by every worker scanning one query.
pub trait GlobalState {
	/// The number of workers which may scan at once
	fn max_threads(&self) -> usize;
}

/// A function which produces a table.
pub trait TableFunction {
	type BindData;
	type GlobalState: GlobalState;
	type LocalState;

	/// The name the function is called by in queries
	fn name(&self) -> &str;

	/// Resolves the function and its output schema.
	fn bind(&self, input: &TableFunctionBindInput) -> Result<BindResult<Self::BindData>, Error>;

	fn init_global(&self, data: &Self::BindData) -> Result<Self::GlobalState, Error>;

	fn init_local(
		&self,
		data: &Self::BindData,
		global: &Self::GlobalState,
	) -> Result<Self::LocalState, Error>;

	/// Fills `output` with the next batch of rows.
	///
	/// An empty chunk signals that the function is done.
	fn scan(
		&self,
		data: &Self::BindData,
		local: &mut Self::LocalState,
		output: &mut DataChunk,
	) -> Result<(), Error>;
}

/// The arguments a scalar function is bound with.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarFunctionBindInput {
	/// A constant `module:function` specifier, when given as the first argument
	pub specifier: Option<Value>,
	pub named_parameters: BTreeMap<String, Value>,
	pub return_type: LogicalType,
}

impl ScalarFunctionBindInput {
	pub fn new(return_type: LogicalType) -> Self {
		ScalarFunctionBindInput {
			specifier: None,
			named_parameters: BTreeMap::new(),
			return_type,
		}
	}

	pub fn with_specifier(mut self, specifier: impl Into<Value>) -> Self {
		self.specifier = Some(specifier.into());
		self
	}

	pub fn with_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.named_parameters.insert(name.into(), value.into());
		self
	}
}

/// A function producing one value per input row.
pub trait ScalarFunction {
	type BindData;

	fn name(&self) -> &str;

	fn bind(&self, input: &ScalarFunctionBindInput) -> Result<Self::BindData, Error>;

	/// Evaluates the function for every row of `input`.
	fn execute(&self, data: &Self::BindData, input: &DataChunk) -> Result<Vec<Value>, Error>;
}
