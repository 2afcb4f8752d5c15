use anyhow::{Context, Result};
use clap::Args;
use jstables_core::fnc::JsScalarFunction;
use jstables_core::host::{ScalarFunction, ScalarFunctionBindInput};
use jstables_core::types::{DataChunk, LogicalType, Value};

use super::literal::parse_literal;
use super::runtime::RuntimeArguments;

#[derive(Args, Debug)]
pub struct CallCommandArguments {
	#[arg(help = "The function to call, written module:function")]
	specifier: String,
	#[arg(help = "Arguments passed to the function, typed by their literal syntax")]
	arguments: Vec<String>,
	#[arg(help = "The type the result is read as")]
	#[arg(short = 'r', long = "returns", value_name = "TYPE", default_value = "VARCHAR")]
	returns: LogicalType,
	#[command(flatten)]
	runtime: RuntimeArguments,
}

pub fn init(args: CallCommandArguments) -> Result<()> {
	let CallCommandArguments {
		specifier,
		arguments,
		returns,
		runtime,
	} = args;
	// Bind the function once
	let function = JsScalarFunction::new(runtime.runtime()?);
	let input = ScalarFunctionBindInput::new(returns).with_specifier(specifier.as_str());
	let data = function.bind(&input).with_context(|| format!("Unable to bind '{specifier}'"))?;
	// Evaluate it for a single row
	let row: Vec<Value> = arguments.iter().map(String::as_str).map(parse_literal).collect();
	let types = row.iter().map(Value::logical_type).collect();
	let chunk = DataChunk::from_rows(types, vec![row])?;
	let output = function.execute(&data, &chunk).with_context(|| format!("Unable to call '{specifier}'"))?;
	for value in output {
		println!("{value}");
	}
	Ok(())
}
