use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cnf;

/// Where the schema decorator is imported from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Decorator {
	pub module: String,
	pub name: String,
}

/// Configuration of a JavaScript runtime.
///
/// The defaults are read from the `JSTABLES_*` environment variables.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
	pub(crate) module_paths: Vec<PathBuf>,
	pub(crate) modules: BTreeMap<String, String>,
	pub(crate) decorator: Option<Decorator>,
	pub(crate) companion: bool,
	pub(crate) memory_limit: usize,
	pub(crate) max_stack_size: usize,
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		Self::from_env()
	}
}

impl RuntimeConfig {
	pub fn from_env() -> Self {
		RuntimeConfig {
			module_paths: cnf::MODULE_PATH.clone(),
			modules: BTreeMap::new(),
			decorator: Some(Decorator {
				module: cnf::DECORATOR_MODULE.clone(),
				name: cnf::DECORATOR_NAME.clone(),
			}),
			companion: true,
			memory_limit: *cnf::MEMORY_LIMIT,
			max_stack_size: *cnf::MAX_STACK_SIZE,
		}
	}

	/// Appends a directory to the module search path
	pub fn with_module_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.module_paths.push(path.into());
		self
	}

	/// Registers an in-memory module, which takes precedence over modules on disk
	pub fn with_module(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
		self.modules.insert(name.into(), source.into());
		self
	}

	/// Imports the schema decorator `name` from `module`
	pub fn with_decorator(mut self, module: impl Into<String>, name: impl Into<String>) -> Self {
		self.decorator = Some(Decorator {
			module: module.into(),
			name: name.into(),
		});
		self
	}

	/// Never wraps bound functions with a schema decorator
	pub fn without_decorator(mut self) -> Self {
		self.decorator = None;
		self
	}

	/// Does not register the builtin companion module
	pub fn without_companion(mut self) -> Self {
		self.companion = false;
		self
	}

	/// Limits the runtime heap to `bytes`, 0 means unlimited
	pub fn with_memory_limit(mut self, bytes: usize) -> Self {
		self.memory_limit = bytes;
		self
	}

	/// Limits the runtime stack to `bytes`, 0 means unlimited
	pub fn with_max_stack_size(mut self, bytes: usize) -> Self {
		self.max_stack_size = bytes;
		self
	}

	pub fn decorator(&self) -> Option<&Decorator> {
		self.decorator.as_ref()
	}

	pub fn module_paths(&self) -> &[PathBuf] {
		&self.module_paths
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder() {
		let config = RuntimeConfig::from_env()
			.with_module("udfs", "export const x = 1;")
			.with_module_path("/opt/udfs")
			.with_decorator("schema", "table")
			.with_memory_limit(1 << 20);
		assert!(config.modules.contains_key("udfs"));
		assert_eq!(config.module_paths().last(), Some(&PathBuf::from("/opt/udfs")));
		assert_eq!(
			config.decorator(),
			Some(&Decorator {
				module: "schema".to_owned(),
				name: "table".to_owned(),
			})
		);
		assert_eq!(config.memory_limit, 1 << 20);
		assert!(config.without_decorator().decorator().is_none());
	}
}
