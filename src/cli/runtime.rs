use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use jstables_core::rt::{Runtime, RuntimeConfig};

/// Options shared by every command which starts a JavaScript runtime.
#[derive(Args, Debug)]
pub struct RuntimeArguments {
	#[arg(help = "A directory to search for JavaScript modules, may be repeated")]
	#[arg(short = 'm', long = "module-path", value_name = "DIR")]
	module_paths: Vec<PathBuf>,
	#[arg(help = "Do not wrap functions with the schema decorator")]
	#[arg(long = "no-decorator")]
	no_decorator: bool,
	#[arg(help = "The memory limit of the JavaScript runtime in bytes, 0 for no limit")]
	#[arg(env = "JSTABLES_MEMORY_LIMIT", long = "memory-limit")]
	memory_limit: Option<usize>,
}

impl RuntimeArguments {
	pub fn runtime(&self) -> Result<Arc<Runtime>> {
		let mut config = RuntimeConfig::from_env();
		for path in &self.module_paths {
			config = config.with_module_path(path);
		}
		if self.no_decorator {
			config = config.without_decorator();
		}
		if let Some(limit) = self.memory_limit {
			config = config.with_memory_limit(limit);
		}
		debug!(paths = ?config.module_paths(), "Starting the JavaScript runtime");
		Runtime::new(config).context("Unable to start the JavaScript runtime")
	}
}
