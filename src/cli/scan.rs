use std::io::Write;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use jstables_core::cnf::BATCH_CAPACITY;
use jstables_core::fnc::JsTableFunction;
use jstables_core::host::{TableFunction, TableFunctionBindInput};
use jstables_core::types::{ColumnSchema, DataChunk, Value};

use super::literal::{parse_column, parse_kwarg, parse_literal};
use super::runtime::RuntimeArguments;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum Format {
	/// Tab separated values with a header line
	#[default]
	Table,
	/// One JSON object per row
	Json,
}

#[derive(Args, Debug)]
pub struct ScanCommandArguments {
	#[arg(help = "The function to scan, written module:function")]
	specifier: String,
	#[arg(help = "Arguments passed to the function, typed by their literal syntax")]
	arguments: Vec<String>,
	#[arg(help = "Declare an output column instead of asking the function, may be repeated")]
	#[arg(short = 'c', long = "column", value_name = "NAME=TYPE")]
	#[arg(value_parser = parse_column)]
	columns: Vec<(String, String)>,
	#[arg(help = "Pass a keyword argument in the trailing options object, may be repeated")]
	#[arg(short = 'k', long = "kwarg", value_name = "KEY=VALUE")]
	#[arg(value_parser = parse_kwarg)]
	kwargs: Vec<(String, Value)>,
	#[arg(help = "The maximum number of rows in each batch")]
	#[arg(short = 'b', long = "batch", value_name = "ROWS")]
	batch: Option<usize>,
	#[arg(help = "How rows are printed")]
	#[arg(short = 'f', long = "format", value_enum, default_value_t)]
	format: Format,
	#[command(flatten)]
	runtime: RuntimeArguments,
}

pub fn init(args: ScanCommandArguments) -> Result<()> {
	let ScanCommandArguments {
		specifier,
		arguments,
		columns,
		kwargs,
		batch,
		format,
		runtime,
	} = args;
	// Build the bind input as a query would
	let mut input = TableFunctionBindInput::new().with_input(specifier.as_str());
	for argument in &arguments {
		input = input.with_input(parse_literal(argument));
	}
	if !columns.is_empty() {
		let columns = columns.into_iter().map(|(name, kind)| (name, Value::Varchar(kind))).collect();
		input = input.with_named("columns", Value::Struct(columns));
	}
	if !kwargs.is_empty() {
		input = input.with_named("kwargs", Value::Struct(kwargs));
	}
	// Bind the table function
	let function = JsTableFunction::new(runtime.runtime()?);
	let bound = function.bind(&input).with_context(|| format!("Unable to bind '{specifier}'"))?;
	let global = function.init_global(&bound.data)?;
	let mut local = function.init_local(&bound.data, &global)?;
	// Scan until an empty batch is returned
	let capacity = batch.unwrap_or(*BATCH_CAPACITY).max(1);
	let mut output = DataChunk::for_schema(&bound.schema, capacity);
	let stdout = std::io::stdout();
	let mut stdout = stdout.lock();
	if let Format::Table = format {
		writeln!(stdout, "{}", bound.schema.names().collect::<Vec<_>>().join("\t"))?;
	}
	let mut batches = 0usize;
	loop {
		function
			.scan(&bound.data, &mut local, &mut output)
			.with_context(|| format!("Unable to scan '{specifier}'"))?;
		if output.is_empty() {
			break;
		}
		batches += 1;
		debug!(batch = batches, rows = output.size(), "Received a batch");
		print_rows(&mut stdout, &bound.schema, &output, format)?;
	}
	stdout.flush()?;
	Ok(())
}

fn print_rows(out: &mut impl Write, schema: &ColumnSchema, chunk: &DataChunk, format: Format) -> Result<()> {
	for row in chunk.rows() {
		match format {
			Format::Table => {
				let cells: Vec<String> = row.iter().map(Value::to_string).collect();
				writeln!(out, "{}", cells.join("\t"))?;
			}
			Format::Json => {
				let object: serde_json::Map<_, _> = schema
					.names()
					.map(str::to_owned)
					.zip(row.into_iter().map(Value::into_json_value))
					.collect();
				writeln!(out, "{}", serde_json::Value::Object(object))?;
			}
		}
	}
	Ok(())
}
