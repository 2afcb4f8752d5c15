//! The embedded JavaScript runtime and the handles used to reach into it.

mod config;
mod exception;
mod handle;
mod iter;
mod modules;

use std::cell::Cell;
use std::sync::Arc;

use js::{Ctx, Persistent, Value};
use parking_lot::ReentrantMutex;

pub use self::config::{Decorator, RuntimeConfig};
pub use self::handle::{Handle, Stored};
pub use self::iter::ForeignIterator;
use crate::err::Error;

const TARGET: &str = "jstables::core::rt";

/// A QuickJS runtime with a single execution context.
///
/// All work with JavaScript values happens inside [`Runtime::with`], which
/// holds the runtime lock for its duration. Values which must outlive a call
/// are kept as [`Stored`] handles and released under the same lock.
pub struct Runtime {
	// The context must be dropped before the runtime
	context: js::Context,
	runtime: js::Runtime,
	config: RuntimeConfig,
	entered: ReentrantMutex<Cell<bool>>,
}

impl Runtime {
	pub fn new(config: RuntimeConfig) -> Result<Arc<Self>, Error> {
		// Create a new JavaScript runtime
		let runtime = js::Runtime::new()?;
		// Apply the configured resource limits
		if config.memory_limit > 0 {
			runtime.set_memory_limit(config.memory_limit);
		}
		if config.max_stack_size > 0 {
			runtime.set_max_stack_size(config.max_stack_size);
		}
		// Set the module resolver and loader
		runtime.set_loader(modules::resolver(&config), modules::loader(&config));
		// Create an execution context
		let context = js::Context::full(&runtime)?;
		debug!(
			target: TARGET,
			modules = config.modules.len(),
			paths = ?config.module_paths,
			memory_limit = config.memory_limit,
			"Created a JavaScript runtime"
		);
		Ok(Arc::new(Runtime {
			context,
			runtime,
			config,
			entered: ReentrantMutex::new(Cell::new(false)),
		}))
	}

	pub fn config(&self) -> &RuntimeConfig {
		&self.config
	}

	/// Runs `f` with exclusive access to the JavaScript context.
	///
	/// Must not be called from within `f`.
	pub fn with<F, R>(&self, f: F) -> R
	where
		F: for<'js> FnOnce(Ctx<'js>) -> R,
	{
		let entered = self.entered.lock();
		debug_assert!(!entered.get(), "the JavaScript runtime was entered twice");
		entered.set(true);
		let _exit = Exit(&entered);
		self.context.with(f)
	}

	/// Runs the cycle collector.
	pub fn run_gc(&self) {
		let _entered = self.entered.lock();
		self.runtime.run_gc();
	}

	/// Releases a stored value, entering the runtime unless this thread is already inside it.
	fn release(&self, value: Persistent<Value<'static>>) {
		let entered = self.entered.lock();
		if entered.get() {
			drop(value);
			return;
		}
		drop(entered);
		self.with(move |_| drop(value));
	}
}

/// Clears the entered flag when leaving [`Runtime::with`], also on unwind.
struct Exit<'a>(&'a Cell<bool>);

impl Drop for Exit<'_> {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn evaluates_in_the_context() {
		let runtime = Runtime::new(RuntimeConfig::from_env()).unwrap();
		let sum: i32 = runtime.with(|ctx| ctx.eval("1 + 2").unwrap());
		assert_eq!(sum, 3);
	}

	#[test]
	fn stored_values_outlive_the_entry() {
		let runtime = Runtime::new(RuntimeConfig::from_env()).unwrap();
		let stored = runtime.with(|ctx| {
			let value: Value = ctx.eval("({ answer: 42 })").unwrap();
			Stored::new(&runtime, &ctx, Handle::from_owned(value))
		});
		let answer = runtime.with(|ctx| {
			let handle = stored.restore(&ctx).unwrap();
			handle.attribute("answer").unwrap().value().unwrap().as_int()
		});
		assert_eq!(answer, Some(42));
		// Released outside the runtime
		drop(stored);
		runtime.run_gc();
	}

	#[test]
	fn stored_values_can_be_released_inside_the_runtime() {
		let runtime = Runtime::new(RuntimeConfig::from_env()).unwrap();
		let stored = runtime.with(|ctx| {
			let value: Value = ctx.eval("[1, 2, 3]").unwrap();
			Stored::new(&runtime, &ctx, Handle::from_owned(value))
		});
		runtime.with(move |_| drop(stored));
		assert_eq!(runtime.with(|ctx| ctx.eval::<i32, _>("7").unwrap()), 7);
	}
}
