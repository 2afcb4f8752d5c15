use std::path::PathBuf;
use std::sync::LazyLock;

use jstables_types::STANDARD_VECTOR_SIZE;

/// The maximum number of rows a single scan call produces (defaults to 2048)
pub static BATCH_CAPACITY: LazyLock<usize> =
	lazy_env_parse!("JSTABLES_BATCH_CAPACITY", usize, STANDARD_VECTOR_SIZE);

/// Directories searched, in order, when importing a JavaScript module from disk
pub static MODULE_PATH: LazyLock<Vec<PathBuf>> = LazyLock::new(|| {
	std::env::var_os("JSTABLES_MODULE_PATH")
		.map(|paths| std::env::split_paths(&paths).collect())
		.unwrap_or_default()
});

/// The memory limit of each JavaScript runtime in bytes (defaults to 0, unlimited)
pub static MEMORY_LIMIT: LazyLock<usize> =
	lazy_env_parse!(bytes, "JSTABLES_MEMORY_LIMIT", usize, 0);

/// The maximum stack size of each JavaScript runtime in bytes (defaults to 256 KiB)
pub static MAX_STACK_SIZE: LazyLock<usize> =
	lazy_env_parse!(bytes, "JSTABLES_MAX_STACK_SIZE", usize, 256 * 1024);

/// The module providing the schema decorator (defaults to `jstables`)
pub static DECORATOR_MODULE: LazyLock<String> =
	lazy_env_parse!("JSTABLES_DECORATOR_MODULE", String, || "jstables".to_owned());

/// The name of the schema decorator inside its module (defaults to `jstable`)
pub static DECORATOR_NAME: LazyLock<String> =
	lazy_env_parse!("JSTABLES_DECORATOR_NAME", String, || "jstable".to_owned());
