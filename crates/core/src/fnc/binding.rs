use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use js::{CatchResultExt, Ctx, Module};
use jstables_types::Value;

use crate::err::{Error, ForeignError};
use crate::rt::{Decorator, Handle, Runtime, Stored};

const TARGET: &str = "jstables::core::fnc";

/// A reference to an exported function, written `module:function`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Specifier {
	pub module: String,
	pub function: String,
}

/// Splits `text` at its first `:` into module and function names.
pub fn parse_specifier(text: &str) -> Result<Specifier, Error> {
	match text.split_once(':') {
		Some((module, function)) => Ok(Specifier {
			module: module.to_owned(),
			function: function.to_owned(),
		}),
		None => Err(Error::MalformedSpecifier(text.to_owned())),
	}
}

impl FromStr for Specifier {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_specifier(s)
	}
}

impl fmt::Display for Specifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.module, self.function)
	}
}

impl Specifier {
	/// Determines the specifier from the `module` and `func` parameters, or
	/// else from the leading positional argument.
	///
	/// Returns whether the leading argument was consumed. Nothing is imported
	/// here, so a partial specifier fails before any JavaScript runs.
	pub fn from_parameters(
		module: Option<&Value>,
		func: Option<&Value>,
		leading: Option<&Value>,
	) -> Result<(Self, bool), Error> {
		let module = text_parameter("module", module)?;
		let func = text_parameter("func", func)?;
		match (module, func) {
			(Some(module), Some(function)) => Ok((
				Specifier {
					module: module.to_owned(),
					function: function.to_owned(),
				},
				false,
			)),
			(Some(_), None) => Err(Error::PartialSpecifier {
				given: "module",
				missing: "func",
			}),
			(None, Some(_)) => Err(Error::PartialSpecifier {
				given: "func",
				missing: "module",
			}),
			(None, None) => match leading {
				Some(Value::Varchar(text)) => Ok((parse_specifier(text)?, true)),
				Some(other) => Err(Error::MalformedSpecifier(other.to_string())),
				None => Err(Error::InvalidArgument {
					name: "module".to_owned(),
					message: "no function was specified, pass 'module:function' as the first argument"
						.to_owned(),
				}),
			},
		}
	}
}

fn text_parameter<'a>(name: &str, value: Option<&'a Value>) -> Result<Option<&'a str>, Error> {
	match value {
		None | Some(Value::Null) => Ok(None),
		Some(Value::Varchar(text)) => Ok(Some(text)),
		Some(other) => Err(Error::InvalidArgument {
			name: name.to_owned(),
			message: format!("expected VARCHAR, found {}", other.logical_type()),
		}),
	}
}

/// Imports a module, returning its namespace object.
pub(crate) fn import<'js>(ctx: &Ctx<'js>, name: &str) -> Result<Handle<'js>, ForeignError> {
	let namespace = Module::import(ctx, name)
		.and_then(|promise| promise.finish::<js::Value>())
		.catch(ctx)
		.map_err(Error::from);
	match namespace {
		Ok(namespace) => Ok(Handle::from_owned(namespace)),
		Err(Error::ForeignCall(e)) => Err(e),
		Err(e) => Err(ForeignError::new(e.to_string())),
	}
}

/// A resolved function inside a runtime entry.
#[derive(Debug)]
pub struct Bound<'js> {
	specifier: Specifier,
	function: Handle<'js>,
	wrapped: Option<Handle<'js>>,
}

impl<'js> Bound<'js> {
	/// Imports the module and looks up the callable export.
	pub fn resolve(ctx: &Ctx<'js>, specifier: &Specifier) -> Result<Self, Error> {
		let module = import(ctx, &specifier.module).map_err(|error| Error::ModuleNotFound {
			module: specifier.module.clone(),
			error,
		})?;
		let function = match module.attribute(&specifier.function) {
			Ok(function) => function,
			Err(Error::AttributeError {
				..
			}) => {
				return Err(Error::FunctionNotFound {
					module: specifier.module.clone(),
					function: specifier.function.clone(),
				});
			}
			Err(e) => return Err(e),
		};
		if !function.is_callable() {
			return Err(Error::NotCallable {
				module: specifier.module.clone(),
				function: specifier.function.clone(),
			});
		}
		debug!(target: TARGET, function = %specifier, "Resolved function");
		Ok(Bound {
			specifier: specifier.clone(),
			function,
			wrapped: None,
		})
	}

	/// Wraps the function with the schema decorator, when one is available.
	///
	/// A missing decorator module or attribute is not an error, the function
	/// is then used as exported. A decorator which throws is.
	pub fn wrap(mut self, ctx: &Ctx<'js>, decorator: Option<&Decorator>) -> Result<Self, Error> {
		let Some(decorator) = decorator else {
			return Ok(self);
		};
		let module = match import(ctx, &decorator.module) {
			Ok(module) => module,
			Err(error) => {
				debug!(target: TARGET, module = %decorator.module, %error, "Decorator module is unavailable, not wrapping");
				return Ok(self);
			}
		};
		let decorate = match module.attribute(&decorator.name) {
			Ok(decorate) if decorate.is_callable() => decorate,
			Ok(_) | Err(Error::AttributeError {
				..
			}) => {
				debug!(target: TARGET, module = %decorator.module, name = %decorator.name, "Decorator is not a function, not wrapping");
				return Ok(self);
			}
			Err(e) => return Err(e),
		};
		let wrapped = match decorate.call(std::slice::from_ref(&self.function)) {
			Ok(wrapped) if wrapped.is_callable() => wrapped,
			Ok(wrapped) => {
				return Err(Error::WrapFailed {
					function: self.specifier.to_string(),
					error: ForeignError::new(format!(
						"the decorator returned '{wrapped}', which is not a function"
					)),
				});
			}
			Err(Error::ForeignCall(error)) => {
				return Err(Error::WrapFailed {
					function: self.specifier.to_string(),
					error,
				});
			}
			Err(e) => return Err(e),
		};
		debug!(target: TARGET, function = %self.specifier, decorator = %decorator.name, "Wrapped function");
		self.wrapped = Some(wrapped);
		Ok(self)
	}

	pub fn specifier(&self) -> &Specifier {
		&self.specifier
	}

	/// The callable which is invoked: the wrapper if there is one.
	pub fn active(&self) -> &Handle<'js> {
		self.wrapped.as_ref().unwrap_or(&self.function)
	}

	pub fn is_wrapped(&self) -> bool {
		self.wrapped.is_some()
	}

	/// Keeps the resolved function alive beyond this runtime entry.
	pub fn store(self, runtime: &Arc<Runtime>, ctx: &Ctx<'js>) -> FunctionBinding {
		let raw = Stored::new(runtime, ctx, self.function);
		let callable = match self.wrapped {
			Some(wrapped) => Callable::Wrapped {
				raw,
				wrapped: Stored::new(runtime, ctx, wrapped),
			},
			None => Callable::Plain(raw),
		};
		FunctionBinding {
			specifier: self.specifier,
			callable,
		}
	}
}

/// A bound function kept across runtime entries.
#[derive(Debug)]
pub enum Callable {
	/// The function as exported by its module
	Plain(Stored),
	/// The exported function and the decorator's wrapper around it
	Wrapped {
		raw: Stored,
		wrapped: Stored,
	},
}

impl Callable {
	/// The function as exported by its module
	pub fn raw(&self) -> &Stored {
		match self {
			Callable::Plain(raw)
			| Callable::Wrapped {
				raw,
				..
			} => raw,
		}
	}
}

/// The result of binding a specifier: the resolved and possibly wrapped function.
#[derive(Debug)]
pub struct FunctionBinding {
	specifier: Specifier,
	callable: Callable,
}

impl FunctionBinding {
	pub fn specifier(&self) -> &Specifier {
		&self.specifier
	}

	pub fn callable(&self) -> &Callable {
		&self.callable
	}

	pub fn is_wrapped(&self) -> bool {
		matches!(self.callable, Callable::Wrapped { .. })
	}

	/// Restores the binding into the current runtime entry.
	pub fn restore<'js>(&self, ctx: &Ctx<'js>) -> Result<Bound<'js>, Error> {
		let wrapped = match &self.callable {
			Callable::Plain(_) => None,
			Callable::Wrapped {
				wrapped,
				..
			} => Some(wrapped.restore(ctx)?),
		};
		Ok(Bound {
			specifier: self.specifier.clone(),
			function: self.callable.raw().restore(ctx)?,
			wrapped,
		})
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;
	use crate::rt::RuntimeConfig;

	const UDFS: &str = "
		export function add(a, b) { return a + b; }
		export const answer = 42;
	";

	#[rstest]
	#[case("udfs:add", "udfs", "add")]
	#[case("pkg/udfs.js:add", "pkg/udfs.js", "add")]
	#[case("a:b:c", "a", "b:c")]
	#[case(":", "", "")]
	fn parses_specifiers(#[case] text: &str, #[case] module: &str, #[case] function: &str) {
		let specifier = parse_specifier(text).unwrap();
		assert_eq!(specifier.module, module);
		assert_eq!(specifier.function, function);
	}

	#[test]
	fn rejects_specifiers_without_a_delimiter() {
		let err = parse_specifier("udfs.add").unwrap_err();
		assert_eq!(
			err.to_string(),
			"Function specifier 'udfs.add' lacks a ':' to delineate module and function"
		);
	}

	#[test]
	fn specifier_from_parameters() {
		let module = Value::from("udfs");
		let func = Value::from("add");
		let leading = Value::from("other:fn");
		let (specifier, consumed) =
			Specifier::from_parameters(Some(&module), Some(&func), Some(&leading)).unwrap();
		assert_eq!(specifier.to_string(), "udfs:add");
		assert!(!consumed);
		let (specifier, consumed) = Specifier::from_parameters(None, None, Some(&leading)).unwrap();
		assert_eq!(specifier.to_string(), "other:fn");
		assert!(consumed);
		let err = Specifier::from_parameters(Some(&module), None, Some(&leading)).unwrap_err();
		assert!(matches!(err, Error::PartialSpecifier { missing: "func", .. }));
		let err = Specifier::from_parameters(None, Some(&func), None).unwrap_err();
		assert!(matches!(err, Error::PartialSpecifier { missing: "module", .. }));
		let err = Specifier::from_parameters(None, None, Some(&Value::from(1))).unwrap_err();
		assert!(matches!(err, Error::MalformedSpecifier(_)));
		let err = Specifier::from_parameters(Some(&Value::from(1)), Some(&func), None).unwrap_err();
		assert!(matches!(err, Error::InvalidArgument { .. }));
	}

	fn resolve(specifier: &str) -> Result<bool, Error> {
		let config = RuntimeConfig::from_env().without_decorator().with_module("udfs", UDFS);
		let runtime = Runtime::new(config).unwrap();
		let specifier = parse_specifier(specifier)?;
		runtime.with(|ctx| Bound::resolve(&ctx, &specifier).map(|bound| bound.is_wrapped()))
	}

	#[test]
	fn resolves_exports() {
		assert!(!resolve("udfs:add").unwrap());
		assert!(matches!(resolve("udfs:missing"), Err(Error::FunctionNotFound { .. })));
		assert!(matches!(resolve("udfs:answer"), Err(Error::NotCallable { .. })));
		let err = resolve("nowhere:add").unwrap_err();
		assert!(matches!(err, Error::ModuleNotFound { .. }), "{err}");
	}

	#[test]
	fn syntax_errors_fail_the_import() {
		let config = RuntimeConfig::from_env().with_module("broken", "export function (");
		let runtime = Runtime::new(config).unwrap();
		let specifier = parse_specifier("broken:f").unwrap();
		let err = runtime.with(|ctx| Bound::resolve(&ctx, &specifier).map(|_| ())).unwrap_err();
		let Error::ModuleNotFound {
			module,
			error,
		} = err
		else {
			panic!("expected a module error, found {err}");
		};
		assert_eq!(module, "broken");
		assert!(!error.message().is_empty());
	}

	#[test_log::test]
	fn wraps_with_the_companion_decorator() {
		let config = RuntimeConfig::from_env()
			.with_decorator("jstables", "jstable")
			.with_module("udfs", UDFS);
		let runtime = Runtime::new(config.clone()).unwrap();
		let specifier = parse_specifier("udfs:add").unwrap();
		let binding = runtime.with(|ctx| {
			let bound = Bound::resolve(&ctx, &specifier)?.wrap(&ctx, config.decorator())?;
			assert!(bound.is_wrapped());
			assert!(bound.active().attribute("column_names").unwrap().is_callable());
			Ok::<_, Error>(bound.store(&runtime, &ctx))
		});
		let binding = binding.unwrap();
		assert!(binding.is_wrapped());
		let sum = runtime.with(|ctx| {
			let bound = binding.restore(&ctx).unwrap();
			let args = [
				Handle::from_owned(js::Value::new_int(ctx.clone(), 2)),
				Handle::from_owned(js::Value::new_int(ctx.clone(), 3)),
			];
			bound.active().call(&args).unwrap().to_display_string()
		});
		assert_eq!(sum, "5");
	}

	#[test_log::test]
	fn missing_decorators_are_skipped() {
		let config = RuntimeConfig::from_env()
			.with_decorator("absent", "jstable")
			.without_companion()
			.with_module("udfs", UDFS);
		let runtime = Runtime::new(config.clone()).unwrap();
		let specifier = parse_specifier("udfs:add").unwrap();
		let wrapped = runtime.with(|ctx| {
			Bound::resolve(&ctx, &specifier)
				.and_then(|bound| bound.wrap(&ctx, config.decorator()))
				.map(|bound| bound.is_wrapped())
		});
		assert!(!wrapped.unwrap());
		let config = config.with_decorator("udfs", "answer");
		let runtime = Runtime::new(config.clone()).unwrap();
		let wrapped = runtime.with(|ctx| {
			Bound::resolve(&ctx, &specifier)
				.and_then(|bound| bound.wrap(&ctx, config.decorator()))
				.map(|bound| bound.is_wrapped())
		});
		assert!(!wrapped.unwrap());
	}

	#[test]
	fn throwing_decorators_fail_the_bind() {
		let config = RuntimeConfig::from_env()
			.with_decorator("strict", "jstable")
			.with_module("strict", "export function jstable(f) { throw new Error('no schema'); }")
			.with_module("udfs", UDFS);
		let runtime = Runtime::new(config.clone()).unwrap();
		let specifier = parse_specifier("udfs:add").unwrap();
		let err = runtime
			.with(|ctx| {
				Bound::resolve(&ctx, &specifier)
					.and_then(|bound| bound.wrap(&ctx, config.decorator()))
					.map(|_| ())
			})
			.unwrap_err();
		assert_eq!(err.to_string(), "The decorator failed to wrap 'udfs:add': no schema");
	}
}
