mod call;
mod literal;
mod runtime;
mod scan;
pub(crate) mod validator;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::telemetry;
use validator::parser::tracing::{CustomFilter, CustomFilterParser};

const INFO: &str = "
Call JavaScript functions the way a query engine does.

`scan` binds a table function and prints the rows it yields, batch by batch.
`call` evaluates a scalar function once.

Functions are named `module:function`, where the module is found on the
module search path (--module-path or JSTABLES_MODULE_PATH).
";

#[derive(Parser, Debug)]
#[command(name = "jstables", bin_name = "jstables")]
#[command(about = INFO, before_help = "jstables command-line interface")]
#[command(version, arg_required_else_help = true)]
struct Cli {
	#[arg(help = "The logging level for the command-line tool")]
	#[arg(env = "JSTABLES_LOG", short = 'l', long = "log")]
	#[arg(default_value = "warn")]
	#[arg(value_parser = CustomFilterParser::new())]
	#[arg(global = true)]
	log: CustomFilter,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
	#[command(about = "Bind a table function and print the rows it produces")]
	Scan(scan::ScanCommandArguments),
	#[command(about = "Call a scalar function once and print its result")]
	Call(call::CallCommandArguments),
}

pub fn init() -> ExitCode {
	// Parse the CLI arguments
	let args = Cli::parse();
	// Initialize logging
	telemetry::builder().with_filter(args.log).init();
	// Run the subcommand
	let output = match args.command {
		Commands::Scan(args) => scan::init(args),
		Commands::Call(args) => call::init(args),
	};
	// Error and exit the programme
	if let Err(e) = output {
		eprintln!("Error: {e:#}");
		return ExitCode::FAILURE;
	}
	ExitCode::SUCCESS
}
