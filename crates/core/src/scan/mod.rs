//! Drives a JavaScript table function from bind to exhaustion.
//!
//! The function is invoked once when the scan is bound. Every later call to
//! [`ScanState::scan`] pulls rows from the returned iterator until the output
//! chunk is full or the iterator is done.

use std::fmt;
use std::sync::Arc;

use jstables_types::{ColumnSchema, DataChunk, Value};

use crate::conv::{Arguments, convert_row};
use crate::err::Error;
use crate::fnc::{Bound, FunctionBinding, Specifier, schema};
use crate::host::TableFunctionBindInput;
use crate::rt::{ForeignIterator, Runtime, Stored};

const TARGET: &str = "jstables::core::scan";

/// The named parameters a table function accepts
pub const NAMED_PARAMETERS: [&str; 4] = ["module", "func", "columns", "kwargs"];

/// Where a scan stands in its lifecycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScanStatus {
	/// No function has been bound yet
	Unbound,
	/// The function was invoked and its iterator acquired
	Bound,
	/// At least one batch has been produced
	Scanning,
	/// The iterator is done or failed, further scans produce nothing
	Exhausted,
}

impl ScanStatus {
	fn as_str(&self) -> &'static str {
		match self {
			ScanStatus::Unbound => "unbound",
			ScanStatus::Bound => "bound",
			ScanStatus::Scanning => "scanning",
			ScanStatus::Exhausted => "exhausted",
		}
	}
}

impl fmt::Display for ScanStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What to bind: the function, its arguments and optionally its columns.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanRequest {
	pub specifier: Specifier,
	pub arguments: Vec<Value>,
	pub keywords: Option<Value>,
	pub columns: Option<Value>,
}

impl ScanRequest {
	pub fn new(specifier: Specifier) -> Self {
		ScanRequest {
			specifier,
			arguments: Vec::new(),
			keywords: None,
			columns: None,
		}
	}

	/// Reads the request from the arguments of a table function call.
	///
	/// The function is named either with the `module` and `func` parameters or
	/// with a leading `module:function` argument. The remaining positional
	/// arguments are passed on to the function.
	pub fn from_input(input: &TableFunctionBindInput) -> Result<Self, Error> {
		if let Some(name) =
			input.named_parameters.keys().find(|name| !NAMED_PARAMETERS.contains(&name.as_str()))
		{
			return Err(Error::InvalidArgument {
				name: name.clone(),
				message: format!("unknown parameter, expected one of {}", NAMED_PARAMETERS.join(", ")),
			});
		}
		let (specifier, consumed) = Specifier::from_parameters(
			input.named("module"),
			input.named("func"),
			input.inputs.first(),
		)?;
		let skip = usize::from(consumed);
		Ok(ScanRequest {
			specifier,
			arguments: input.inputs[skip..].to_vec(),
			keywords: input.named("kwargs").filter(|v| !v.is_null()).cloned(),
			columns: input.named("columns").filter(|v| !v.is_null()).cloned(),
		})
	}

	pub fn with_argument(mut self, value: impl Into<Value>) -> Self {
		self.arguments.push(value.into());
		self
	}

	pub fn with_keywords(mut self, keywords: Value) -> Self {
		self.keywords = Some(keywords);
		self
	}

	pub fn with_columns(mut self, columns: Value) -> Self {
		self.columns = Some(columns);
		self
	}
}

/// The iterator returned by the bound function, kept between scans.
struct Cursor {
	iterator: Stored,
	next: Stored,
}

/// The state of one table function scan.
pub struct ScanState {
	runtime: Arc<Runtime>,
	status: ScanStatus,
	binding: Option<FunctionBinding>,
	schema: ColumnSchema,
	cursor: Option<Cursor>,
	rows: u64,
}

impl ScanState {
	pub fn new(runtime: Arc<Runtime>) -> Self {
		ScanState {
			runtime,
			status: ScanStatus::Unbound,
			binding: None,
			schema: ColumnSchema::new(),
			cursor: None,
			rows: 0,
		}
	}

	pub fn status(&self) -> ScanStatus {
		self.status
	}

	/// The output columns, empty until bound
	pub fn schema(&self) -> &ColumnSchema {
		&self.schema
	}

	/// The bound function, released once the scan is exhausted
	pub fn binding(&self) -> Option<&FunctionBinding> {
		self.binding.as_ref()
	}

	/// The number of rows produced so far
	pub fn rows(&self) -> u64 {
		self.rows
	}

	/// Resolves the function and its schema, then invokes it once.
	pub fn bind(&mut self, request: &ScanRequest) -> Result<&ColumnSchema, Error> {
		if self.status != ScanStatus::Unbound {
			return Err(Error::InvalidScanState {
				operation: "bind",
				status: self.status.as_str(),
			});
		}
		let runtime = &self.runtime;
		let (binding, schema, cursor) = runtime.with(|ctx| {
			// Resolve and wrap the function
			let bound = Bound::resolve(&ctx, &request.specifier)?
				.wrap(&ctx, runtime.config().decorator())?;
			// Marshal the call arguments
			let args = Arguments::marshal(&ctx, &request.arguments, request.keywords.as_ref())?;
			// Declared columns take precedence over discovered ones
			let schema = match &request.columns {
				Some(columns) => schema::declared(columns)?,
				None => schema::discover(&bound, &args)?,
			};
			if schema.is_empty() {
				return Err(Error::EmptySchema {
					function: request.specifier.to_string(),
				});
			}
			// Invoke the function and acquire its iterator
			let result = args.apply(bound.active())?;
			let iterator = result.iterate().map_err(|e| match e {
				Error::NotIterable {
					..
				} => Error::ResultNotIterable {
					function: request.specifier.to_string(),
				},
				e => e,
			})?;
			let (iterator, next) = iterator.into_parts();
			let cursor = Cursor {
				iterator: Stored::new(runtime, &ctx, iterator),
				next: Stored::new(runtime, &ctx, next),
			};
			Ok::<_, Error>((bound.store(runtime, &ctx), schema, cursor))
		})?;
		debug!(
			target: TARGET,
			function = %request.specifier,
			wrapped = binding.is_wrapped(),
			schema = %schema,
			"Bound table function"
		);
		self.binding = Some(binding);
		self.schema = schema;
		self.cursor = Some(cursor);
		self.status = ScanStatus::Bound;
		Ok(&self.schema)
	}

	/// Fills `output` with up to its capacity of rows.
	///
	/// An empty chunk is returned once the iterator is done. Any error ends
	/// the scan: the iterator is released and the output is left empty.
	pub fn scan(&mut self, output: &mut DataChunk) -> Result<(), Error> {
		output.reset();
		let cursor = match (&self.status, &self.cursor) {
			(ScanStatus::Unbound, _) => {
				return Err(Error::InvalidScanState {
					operation: "scan",
					status: self.status.as_str(),
				});
			}
			(ScanStatus::Exhausted, _) | (_, None) => return Ok(()),
			(_, Some(cursor)) => cursor,
		};
		// An empty output would read as the end of the scan
		if output.capacity() == 0 {
			return Err(Error::InvalidArgument {
				name: "output".to_owned(),
				message: "the output chunk has no capacity for rows".to_owned(),
			});
		}
		let schema = &self.schema;
		let outcome = self.runtime.with(|ctx| {
			let iterator = cursor.iterator.restore(&ctx)?;
			let next = cursor.next.restore(&ctx)?;
			let mut iterator = ForeignIterator::from_parts(iterator, next)?;
			while !output.is_full() {
				let Some(row) = iterator.pull()? else {
					return Ok(true);
				};
				output.append_row(convert_row(&row, schema)?)?;
			}
			Ok::<_, Error>(false)
		});
		self.rows += output.size() as u64;
		match outcome {
			Ok(false) => {
				trace!(target: TARGET, rows = output.size(), "Produced a full batch");
				self.status = ScanStatus::Scanning;
				Ok(())
			}
			Ok(true) => {
				self.finish();
				Ok(())
			}
			Err(e) => {
				self.rows -= output.size() as u64;
				output.reset();
				debug!(target: TARGET, error = %e, "Table function failed");
				self.finish();
				Err(e)
			}
		}
	}

	/// Marks the scan exhausted, releases the iterator and function, and
	/// collects any cycles they leave behind.
	fn finish(&mut self) {
		debug!(target: TARGET, rows = self.rows, "Table function exhausted");
		self.status = ScanStatus::Exhausted;
		self.cursor = None;
		self.binding = None;
		self.runtime.run_gc();
	}
}

impl fmt::Debug for ScanState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ScanState")
			.field("status", &self.status)
			.field("schema", &self.schema)
			.field("rows", &self.rows)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use jstables_types::LogicalType;

	use super::*;
	use crate::fnc::parse_specifier;
	use crate::rt::RuntimeConfig;

	const UDFS: &str = "
		export function* numbers(n) {
			for (let i = 0; i < n; i++) yield [i];
		}
		numbers.columns = ['n'];
		numbers.types = ['BIGINT'];

		export function* faulty(n) {
			for (let i = 1; i <= n; i++) {
				if (i === 5) throw new RangeError(`row ${i} is cursed`);
				yield [i];
			}
		}
		faulty.columns = ['n'];
		faulty.types = ['INTEGER'];

		export function scalar() { return 5; }
		scalar.columns = ['n'];
	";

	fn runtime() -> Arc<Runtime> {
		Runtime::new(RuntimeConfig::from_env().with_module("udfs", UDFS)).unwrap()
	}

	fn request(specifier: &str) -> ScanRequest {
		ScanRequest::new(parse_specifier(specifier).unwrap())
	}

	#[test]
	fn request_from_a_leading_specifier() {
		let input = TableFunctionBindInput::new()
			.with_input("udfs:numbers")
			.with_input(3i64)
			.with_named("kwargs", Value::Struct(vec![("x".to_owned(), Value::from(1))]));
		let request = ScanRequest::from_input(&input).unwrap();
		assert_eq!(request.specifier.to_string(), "udfs:numbers");
		assert_eq!(request.arguments, vec![Value::BigInt(3)]);
		assert!(request.keywords.is_some());
		assert!(request.columns.is_none());
	}

	#[test]
	fn request_from_named_parameters() {
		let input = TableFunctionBindInput::new()
			.with_input("udfs:numbers")
			.with_named("module", "udfs")
			.with_named("func", "numbers");
		let request = ScanRequest::from_input(&input).unwrap();
		assert_eq!(request.arguments, vec![Value::from("udfs:numbers")]);
		let input = TableFunctionBindInput::new().with_named("module", "udfs");
		assert!(matches!(ScanRequest::from_input(&input), Err(Error::PartialSpecifier { .. })));
		let input = TableFunctionBindInput::new().with_input("udfs:numbers").with_named("limit", 1);
		let err = ScanRequest::from_input(&input).unwrap_err();
		assert!(matches!(err, Error::InvalidArgument { ref name, .. } if name == "limit"));
	}

	#[test]
	fn lifecycle() {
		let mut state = ScanState::new(runtime());
		assert_eq!(state.status(), ScanStatus::Unbound);
		let mut output = DataChunk::new(vec![LogicalType::BigInt], 2);
		assert!(matches!(state.scan(&mut output), Err(Error::InvalidScanState { .. })));
		let schema = state.bind(&request("udfs:numbers").with_argument(3i64)).unwrap();
		assert_eq!(schema.to_string(), "(n BIGINT)");
		assert_eq!(state.status(), ScanStatus::Bound);
		state.scan(&mut output).unwrap();
		assert_eq!(output.size(), 2);
		assert_eq!(state.status(), ScanStatus::Scanning);
		state.scan(&mut output).unwrap();
		assert_eq!(output.column(0), Some(&[Value::BigInt(2)][..]));
		assert_eq!(state.status(), ScanStatus::Exhausted);
		assert!(state.binding().is_none());
		state.scan(&mut output).unwrap();
		assert!(output.is_empty());
		assert_eq!(state.rows(), 3);
		let err = state.bind(&request("udfs:numbers")).unwrap_err();
		assert_eq!(err.to_string(), "Unable to bind a scan which is exhausted");
	}

	#[test]
	fn faults_exhaust_the_scan() {
		let mut state = ScanState::new(runtime());
		state.bind(&request("udfs:faulty").with_argument(10i64)).unwrap();
		let mut output = DataChunk::new(vec![LogicalType::Integer], 16);
		let err = state.scan(&mut output).unwrap_err();
		assert_eq!(err.to_string(), "row 5 is cursed");
		assert_eq!(err.foreign().and_then(|e| e.kind()), Some("RangeError"));
		assert_eq!(state.status(), ScanStatus::Exhausted);
		assert!(output.is_empty());
		assert_eq!(state.rows(), 0);
		state.scan(&mut output).unwrap();
		assert!(output.is_empty());
	}

	#[test]
	fn outputs_need_room_for_a_row() {
		let mut state = ScanState::new(runtime());
		state.bind(&request("udfs:numbers").with_argument(3i64)).unwrap();
		let mut output = DataChunk::new(vec![LogicalType::BigInt], 0);
		let err = state.scan(&mut output).unwrap_err();
		assert!(matches!(err, Error::InvalidArgument { ref name, .. } if name == "output"));
		// The rows are still there for a usable output
		assert_eq!(state.status(), ScanStatus::Bound);
		let mut output = DataChunk::new(vec![LogicalType::BigInt], 8);
		state.scan(&mut output).unwrap();
		assert_eq!(output.size(), 3);
	}

	#[test]
	fn results_must_be_iterable() {
		let mut state = ScanState::new(runtime());
		let err = state.bind(&request("udfs:scalar")).unwrap_err();
		assert_eq!(err.to_string(), "The function 'udfs:scalar' did not return an iterable value");
		assert_eq!(state.status(), ScanStatus::Unbound);
	}
}
