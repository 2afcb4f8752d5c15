use std::fmt::{self, Display};

use jstables_types::{Error as TypesError, LogicalType};
use thiserror::Error;

/// An exception thrown by JavaScript code, captured from the runtime.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ForeignError {
	kind: Option<String>,
	message: String,
	traceback: Option<String>,
}

impl ForeignError {
	pub fn new(message: impl Into<String>) -> Self {
		ForeignError {
			kind: None,
			message: message.into(),
			traceback: None,
		}
	}

	pub(crate) fn with_kind(mut self, kind: Option<String>) -> Self {
		self.kind = kind.filter(|k| !k.is_empty());
		self
	}

	pub(crate) fn with_traceback(mut self, traceback: Option<String>) -> Self {
		self.traceback = traceback.filter(|t| !t.trim().is_empty());
		self
	}

	/// The name of the thrown error class, such as `TypeError`
	pub fn kind(&self) -> Option<&str> {
		self.kind.as_deref()
	}

	/// The message of the thrown value
	pub fn message(&self) -> &str {
		&self.message
	}

	/// The JavaScript stack trace at the point the value was thrown
	pub fn traceback(&self) -> Option<&str> {
		self.traceback.as_deref()
	}
}

impl Display for ForeignError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.message)?;
		if f.alternate() {
			if let Some(traceback) = &self.traceback {
				write!(f, "\n{traceback}")?;
			}
		}
		Ok(())
	}
}

impl std::error::Error for ForeignError {}

/// An error raised while binding or running a JavaScript function.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// An operation was attempted on a handle which holds no value
	#[error("Attempted to use an empty JavaScript handle")]
	InvalidHandle,

	/// The value does not have the requested property
	#[error("The value has no attribute '{name}'")]
	AttributeError {
		name: String,
	},

	/// The value does not implement the iterator protocol
	#[error("The value '{value}' is not iterable")]
	NotIterable {
		value: String,
	},

	/// The module could not be resolved, loaded or evaluated
	#[error("Unable to import module '{module}': {error}")]
	ModuleNotFound {
		module: String,
		error: ForeignError,
	},

	/// The module does not export the requested function
	#[error("Unable to find function '{function}' in module '{module}'")]
	FunctionNotFound {
		module: String,
		function: String,
	},

	/// The exported value can not be called
	#[error("The export '{function}' of module '{module}' is not callable")]
	NotCallable {
		module: String,
		function: String,
	},

	/// The function specifier does not have the form `module:function`
	#[error("Function specifier '{0}' lacks a ':' to delineate module and function")]
	MalformedSpecifier(String),

	/// Only one of the `module` and `func` parameters was given
	#[error("The '{given}' parameter was given without the '{missing}' parameter")]
	PartialSpecifier {
		given: &'static str,
		missing: &'static str,
	},

	/// The declared or discovered output columns are not usable
	#[error("Invalid column declaration: {0}")]
	SchemaDeclarationError(String),

	/// No output columns were declared or discovered
	#[error(
		"Unable to determine the output columns of '{function}', declare them with the 'columns' parameter or a column_names() hook"
	)]
	EmptySchema {
		function: String,
	},

	/// The table function returned something which can not be iterated
	#[error("The function '{function}' did not return an iterable value")]
	ResultNotIterable {
		function: String,
	},

	/// The schema decorator threw while wrapping the function
	#[error("The decorator failed to wrap '{function}': {error}")]
	WrapFailed {
		function: String,
		error: ForeignError,
	},

	/// A produced row can not be iterated
	#[error("A row was produced which is not iterable: '{value}'")]
	RowNotIterable {
		value: String,
	},

	/// A produced row has more or fewer values than the output has columns
	#[error("A row with {found} values was detected though {expected} columns were expected")]
	RowArity {
		found: usize,
		expected: usize,
	},

	/// A scan was driven out of order, such as scanning before binding
	#[error("Unable to {operation} a scan which is {status}")]
	InvalidScanState {
		operation: &'static str,
		status: &'static str,
	},

	/// JavaScript code threw an exception
	#[error("{0}")]
	ForeignCall(ForeignError),

	/// The value can not be passed to JavaScript
	#[error("Values of type {0} can not be passed to JavaScript")]
	UnsupportedType(LogicalType),

	/// A value does not match the type it was declared with
	#[error("Expected a value of type {expected}, found '{value}'")]
	TypeMismatch {
		expected: LogicalType,
		value: String,
	},

	/// A bind parameter has the wrong engine type or is unknown
	#[error("Invalid argument '{name}': {message}")]
	InvalidArgument {
		name: String,
		message: String,
	},

	/// A type name, schema or batch could not be built
	#[error(transparent)]
	Types(#[from] TypesError),

	/// The JavaScript engine failed outside of a thrown exception
	#[error("The JavaScript runtime failed: {0}")]
	Js(#[from] js::Error),
}

impl Error {
	/// The captured exception, if this error was thrown by JavaScript code.
	pub fn foreign(&self) -> Option<&ForeignError> {
		match self {
			Error::ForeignCall(e)
			| Error::ModuleNotFound {
				error: e,
				..
			}
			| Error::WrapFailed {
				error: e,
				..
			} => Some(e),
			_ => None,
		}
	}

	/// The JavaScript stack trace attached to this error, if any.
	pub fn traceback(&self) -> Option<&str> {
		self.foreign().and_then(ForeignError::traceback)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn foreign_message_is_verbatim() {
		let error = ForeignError::new("boom")
			.with_kind(Some("TypeError".to_owned()))
			.with_traceback(Some("    at f (udfs:3)".to_owned()));
		let error = Error::ForeignCall(error);
		assert_eq!(error.to_string(), "boom");
		assert_eq!(error.traceback(), Some("    at f (udfs:3)"));
		assert_eq!(error.foreign().and_then(ForeignError::kind), Some("TypeError"));
		assert_eq!(format!("{:#}", error.foreign().unwrap()), "boom\n    at f (udfs:3)");
	}

	#[test]
	fn blank_parts_are_dropped() {
		let error = ForeignError::new("x").with_kind(Some(String::new())).with_traceback(Some(" \n".to_owned()));
		assert_eq!(error.kind(), None);
		assert_eq!(error.traceback(), None);
	}

	#[test]
	fn arity_message() {
		let error = Error::RowArity {
			found: 4,
			expected: 3,
		};
		assert_eq!(
			error.to_string(),
			"A row with 4 values was detected though 3 columns were expected"
		);
	}
}
