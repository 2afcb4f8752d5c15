//! The jstables command-line tool, which binds and drives JavaScript
//! functions through the same contract a query engine uses.

#[macro_use]
extern crate tracing;

mod cli;
mod telemetry;

use std::process::ExitCode;

fn main() -> ExitCode {
	// Initiate the command line
	cli::init()
}
