use std::sync::Arc;

use jstables_core::err::Error;
use jstables_core::fnc::JsTableFunction;
use jstables_core::host::{GlobalState, TableFunction, TableFunctionBindInput};
use jstables_core::rt::{Runtime, RuntimeConfig};
use jstables_core::scan::ScanStatus;
use jstables_core::types::{DataChunk, LogicalType, Value};

const UDFS: &str = include_str!("fixtures/udfs.js");

fn runtime() -> Arc<Runtime> {
	Runtime::new(RuntimeConfig::from_env().with_module("udfs", UDFS)).unwrap()
}

fn columns(columns: &[(&str, &str)]) -> Value {
	Value::Struct(columns.iter().map(|(name, kind)| (name.to_string(), Value::from(*kind))).collect())
}

/// Binds and scans to the end, returning every batch produced.
fn scan_all(
	function: &JsTableFunction,
	input: TableFunctionBindInput,
	capacity: usize,
) -> Result<Vec<Vec<Vec<Value>>>, Error> {
	let bound = function.bind(&input)?;
	let global = function.init_global(&bound.data)?;
	let mut local = function.init_local(&bound.data, &global)?;
	let mut output = DataChunk::for_schema(&bound.schema, capacity);
	let mut batches = Vec::new();
	loop {
		function.scan(&bound.data, &mut local, &mut output)?;
		if output.is_empty() {
			return Ok(batches);
		}
		batches.push(output.rows().collect());
	}
}

#[test_log::test]
fn scans_the_table_fixture() {
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new()
		.with_input("udfs:table")
		.with_input("")
		.with_named("columns", columns(&[("char", "VARCHAR")]));
	let batches = scan_all(&function, input, 2048).unwrap();
	let chars: String = batches
		.concat()
		.into_iter()
		.map(|row| row[0].as_str().unwrap().to_owned())
		.collect();
	assert_eq!(chars, "a very long string");
}

#[test]
fn passes_every_positional_argument() {
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new()
		.with_named("module", "udfs")
		.with_named("func", "table2")
		.with_input("foo")
		.with_input("bar")
		.with_input(16i64)
		.with_named("columns", columns(&[("c", "VARCHAR")]));
	let rows = scan_all(&function, input, 4).unwrap().concat();
	let values: Vec<String> = rows.iter().map(|row| row[0].to_string()).collect();
	assert_eq!(values, ["f", "o", "o", "b", "a", "r", "16"]);
}

#[test]
fn index_chars_with_two_columns() {
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new()
		.with_input("udfs:index_chars")
		.with_input("foo")
		.with_named("columns", columns(&[("i", "BIGINT"), ("val", "VARCHAR")]));
	let rows = scan_all(&function, input, 16).unwrap().concat();
	assert_eq!(
		rows,
		vec![
			vec![Value::BigInt(0), Value::from("f")],
			vec![Value::BigInt(1), Value::from("o")],
			vec![Value::BigInt(2), Value::from("o")],
		]
	);
}

#[test]
fn wide_rows() {
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new()
		.with_input("udfs:num_columns")
		.with_input("x")
		.with_input(2i64)
		.with_input(3i64)
		.with_named("columns", columns(&[("a", "TEXT"), ("b", "TEXT"), ("c", "TEXT")]));
	let rows = scan_all(&function, input, 16).unwrap().concat();
	assert_eq!(rows, vec![vec![Value::from("x"); 3]; 2]);
}

#[test]
fn fills_batches_to_capacity() {
	const CAPACITY: usize = 16;
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new()
		.with_input("udfs:counter")
		.with_input(CAPACITY as i64 + 1)
		.with_named("columns", columns(&[("n", "INTEGER")]));
	let bound = function.bind(&input).unwrap();
	let global = function.init_global(&bound.data).unwrap();
	let mut local = function.init_local(&bound.data, &global).unwrap();
	let mut output = DataChunk::for_schema(&bound.schema, CAPACITY);
	// The first scan fills the whole batch
	function.scan(&bound.data, &mut local, &mut output).unwrap();
	assert_eq!(output.size(), CAPACITY);
	assert_eq!(bound.data.status(), ScanStatus::Scanning);
	// The second scan produces the last row
	function.scan(&bound.data, &mut local, &mut output).unwrap();
	assert_eq!(output.size(), 1);
	assert_eq!(output.value(0, 0), Some(&Value::Integer(CAPACITY as i32)));
	assert_eq!(bound.data.status(), ScanStatus::Exhausted);
	// Further scans are empty
	function.scan(&bound.data, &mut local, &mut output).unwrap();
	assert!(output.is_empty());
}

#[test]
fn default_batch_capacity() {
	let function = JsTableFunction::new(runtime());
	let capacity = *jstables_core::cnf::BATCH_CAPACITY;
	let input = TableFunctionBindInput::new()
		.with_input("udfs:counter")
		.with_input(capacity as i64 * 2 + 1)
		.with_named("columns", columns(&[("n", "BIGINT")]));
	let batches = scan_all(&function, input, capacity).unwrap();
	let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
	assert_eq!(sizes, [capacity, capacity, 1]);
}

#[test_log::test]
fn faults_end_the_scan() {
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new()
		.with_input("udfs:fault_at")
		.with_input(5i64)
		.with_named("columns", columns(&[("n", "INTEGER")]));
	let bound = function.bind(&input).unwrap();
	let global = function.init_global(&bound.data).unwrap();
	let mut local = function.init_local(&bound.data, &global).unwrap();
	let mut output = DataChunk::for_schema(&bound.schema, 2);
	function.scan(&bound.data, &mut local, &mut output).unwrap();
	function.scan(&bound.data, &mut local, &mut output).unwrap();
	assert_eq!(output.rows().collect::<Vec<_>>(), vec![vec![Value::Integer(3)], vec![Value::Integer(4)]]);
	let err = function.scan(&bound.data, &mut local, &mut output).unwrap_err();
	assert!(matches!(err, Error::ForeignCall(_)));
	assert_eq!(err.to_string(), "row 5 failed");
	assert!(err.traceback().is_some());
	assert_eq!(bound.data.status(), ScanStatus::Exhausted);
	assert!(output.is_empty());
	function.scan(&bound.data, &mut local, &mut output).unwrap();
	assert!(output.is_empty());
}

#[test]
fn faults_on_a_later_row() {
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new()
		.with_input("udfs:iterator_throws_exception")
		.with_input("")
		.with_named("columns", columns(&[("v", "VARCHAR")]));
	let err = scan_all(&function, input, 64).unwrap_err();
	assert_eq!(err.to_string(), "Third record raises an exception");
}

#[test]
fn faults_when_called() {
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new()
		.with_input("udfs:table_throws_exception")
		.with_input("")
		.with_named("columns", columns(&[("v", "VARCHAR")]));
	let err = function.bind(&input).unwrap_err();
	assert_eq!(err.to_string(), "This function raises an exception");
}

#[test]
fn mismatched_fields_become_null() {
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new().with_input("udfs:mixed").with_named(
		"columns",
		columns(&[("a", "INTEGER"), ("b", "VARCHAR"), ("c", "DOUBLE"), ("d", "BOOLEAN")]),
	);
	let rows = scan_all(&function, input, 16).unwrap().concat();
	assert_eq!(
		rows,
		vec![
			vec![Value::Integer(1), Value::from("one"), Value::Double(1.5), Value::Boolean(true)],
			vec![Value::Null, Value::Null, Value::Null, Value::Null],
			vec![Value::Null, Value::Null, Value::Null, Value::Boolean(false)],
		]
	);
}

#[test]
fn row_arity_is_checked() {
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new()
		.with_input("udfs:num_columns")
		.with_input("x")
		.with_input(1i64)
		.with_input(3i64)
		.with_named("columns", columns(&[("a", "TEXT"), ("b", "TEXT")]));
	let err = scan_all(&function, input, 16).unwrap_err();
	assert_eq!(err.to_string(), "A row with 3 values was detected though 2 columns were expected");
	let input = TableFunctionBindInput::new()
		.with_input("udfs:num_columns")
		.with_input("x")
		.with_input(1i64)
		.with_input(1i64)
		.with_named("columns", columns(&[("a", "TEXT"), ("b", "TEXT")]));
	let err = scan_all(&function, input, 16).unwrap_err();
	assert_eq!(err.to_string(), "A row with 1 values was detected though 2 columns were expected");
}

#[test]
fn rows_must_be_iterable() {
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new()
		.with_input("udfs:people")
		.with_named("columns", columns(&[("name", "VARCHAR"), ("age", "INTEGER")]));
	let err = scan_all(&function, input, 16).unwrap_err();
	assert!(matches!(err, Error::RowNotIterable { .. }), "{err}");
}

#[test]
fn keyword_arguments() {
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new()
		.with_input("udfs:with_options")
		.with_input(2i64)
		.with_named("kwargs", Value::Struct(vec![("prefix".to_owned(), Value::from("row-"))]))
		.with_named("columns", columns(&[("v", "VARCHAR")]));
	let rows = scan_all(&function, input, 16).unwrap().concat();
	assert_eq!(rows, vec![vec![Value::from("row-0")], vec![Value::from("row-1")]]);
}

#[test]
fn parallel_scans_are_single_threaded() {
	let function = JsTableFunction::new(runtime());
	let input = TableFunctionBindInput::new()
		.with_input("udfs:counter")
		.with_input(1i64)
		.with_named("columns", columns(&[("n", "INTEGER")]));
	let bound = function.bind(&input).unwrap();
	assert_eq!(function.init_global(&bound.data).unwrap().max_threads(), 1);
	assert_eq!(bound.schema.types(), vec![LogicalType::Integer]);
}

#[test]
fn concurrent_queries_share_the_runtime() {
	let runtime = runtime();
	let handles: Vec<_> = (0..4)
		.map(|n| {
			let function = JsTableFunction::new(runtime.clone());
			std::thread::spawn(move || {
				let input = TableFunctionBindInput::new()
					.with_input("udfs:counter")
					.with_input(100i64 + n)
					.with_named("columns", columns(&[("n", "BIGINT")]));
				scan_all(&function, input, 7).unwrap().concat().len()
			})
		})
		.collect();
	let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
	assert_eq!(counts, [100, 101, 102, 103]);
}
