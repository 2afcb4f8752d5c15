use js::prelude::Coerced;
use js::{CaughtError, Exception, Object, Value};

use crate::err::{Error, ForeignError};

impl From<CaughtError<'_>> for Error {
	fn from(e: CaughtError) -> Error {
		match e {
			CaughtError::Exception(e) => Error::ForeignCall(capture(&e)),
			CaughtError::Value(v) => Error::ForeignCall(ForeignError::new(display(&v))),
			CaughtError::Error(e) => Error::Js(e),
		}
	}
}

/// Builds the foreign error of a thrown `Error` object.
///
/// The `name`, `message` and `stack` properties are read independently, any
/// of them may be missing or may throw when read.
pub(crate) fn capture(e: &Exception<'_>) -> ForeignError {
	let object = e.as_object();
	let message =
		property(object, "message").unwrap_or_else(|| display(&object.clone().into_value()));
	ForeignError::new(message)
		.with_kind(property(object, "name"))
		.with_traceback(property(object, "stack"))
}

fn property(object: &Object<'_>, key: &str) -> Option<String> {
	match object.get::<_, Option<Coerced<String>>>(key) {
		Ok(value) => value.map(|Coerced(v)| v),
		Err(_) => {
			// A throwing getter leaves an exception behind
			drop(object.ctx().catch());
			None
		}
	}
}

/// Renders a value with JavaScript's string conversion.
pub(crate) fn display(value: &Value<'_>) -> String {
	match value.get::<Coerced<String>>() {
		Ok(Coerced(s)) => s,
		Err(_) => {
			drop(value.ctx().catch());
			format!("<{:?}>", value.type_of())
		}
	}
}
