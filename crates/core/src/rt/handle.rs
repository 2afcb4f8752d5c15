use std::fmt;
use std::sync::Arc;

use js::function::{Rest, This};
use js::{CatchResultExt, Ctx, Persistent, Symbol, Value};

use super::Runtime;
use super::exception::display;
use super::iter::ForeignIterator;
use crate::err::{Error, ForeignError};

/// An owned reference to a JavaScript value.
///
/// Cloning a handle takes another reference to the value and dropping it
/// releases one. A handle may be empty, in which case every operation fails
/// with [`Error::InvalidHandle`].
#[derive(Clone, Debug, Default)]
pub struct Handle<'js> {
	value: Option<Value<'js>>,
}

impl<'js> Handle<'js> {
	pub fn empty() -> Self {
		Self::default()
	}

	/// Takes a new reference to a value owned elsewhere.
	pub fn from_borrowed(value: &Value<'js>) -> Self {
		Handle {
			value: Some(value.clone()),
		}
	}

	/// Adopts a reference the caller already owns.
	pub fn from_owned(value: Value<'js>) -> Self {
		Handle {
			value: Some(value),
		}
	}

	/// Moves the reference out, leaving this handle empty.
	pub fn take(&mut self) -> Self {
		Handle {
			value: self.value.take(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.value.is_none()
	}

	pub fn value(&self) -> Result<&Value<'js>, Error> {
		self.value.as_ref().ok_or(Error::InvalidHandle)
	}

	pub fn into_value(self) -> Result<Value<'js>, Error> {
		self.value.ok_or(Error::InvalidHandle)
	}

	/// Whether the value is `undefined` or `null`
	pub fn is_none(&self) -> Result<bool, Error> {
		let value = self.value()?;
		Ok(value.is_undefined() || value.is_null())
	}

	pub fn is_callable(&self) -> bool {
		self.value.as_ref().is_some_and(Value::is_function)
	}

	/// Looks up a property, including inherited ones.
	pub fn attribute(&self, name: &str) -> Result<Handle<'js>, Error> {
		let value = self.value()?;
		let ctx = value.ctx();
		let missing = || Error::AttributeError {
			name: name.to_owned(),
		};
		let Some(object) = value.as_object() else {
			return Err(missing());
		};
		if !object.contains_key(name).catch(ctx)? {
			return Err(missing());
		}
		let attribute: Value<'js> = object.get(name).catch(ctx)?;
		Ok(Handle::from_owned(attribute))
	}

	/// Calls the value with positional arguments.
	pub fn call(&self, args: &[Handle<'js>]) -> Result<Handle<'js>, Error> {
		self.invoke(args, None)
	}

	/// Calls the value with positional arguments followed by an options object.
	pub fn call_with_kwargs(
		&self,
		args: &[Handle<'js>],
		kwargs: &Handle<'js>,
	) -> Result<Handle<'js>, Error> {
		self.invoke(args, Some(kwargs))
	}

	fn invoke(&self, args: &[Handle<'js>], kwargs: Option<&Handle<'js>>) -> Result<Handle<'js>, Error> {
		let value = self.value()?;
		let Some(function) = value.as_function() else {
			let error = ForeignError::new(format!("{} is not a function", display(value)))
				.with_kind(Some("TypeError".to_owned()));
			return Err(Error::ForeignCall(error));
		};
		let mut rest = Vec::with_capacity(args.len() + 1);
		for arg in args.iter().chain(kwargs) {
			rest.push(arg.value()?.clone());
		}
		let result: Value<'js> = function.call((Rest(rest),)).catch(value.ctx())?;
		Ok(Handle::from_owned(result))
	}

	/// Starts iterating the value with the JavaScript iterator protocol.
	pub fn iterate(&self) -> Result<ForeignIterator<'js>, Error> {
		let value = self.value()?;
		let ctx = value.ctx();
		let not_iterable = || Error::NotIterable {
			value: display(value),
		};
		let Some(object) = value.as_object() else {
			return Err(not_iterable());
		};
		let key = Symbol::iterator(ctx.clone()).into_value();
		let method: Value<'js> = object.get(key).catch(ctx)?;
		let Some(method) = method.as_function() else {
			return Err(not_iterable());
		};
		let iterator: Value<'js> = method.call((This(value.clone()),)).catch(ctx)?;
		ForeignIterator::new(Handle::from_owned(iterator))
	}

	/// Renders the value with JavaScript's string conversion, never failing.
	pub fn to_display_string(&self) -> String {
		match &self.value {
			Some(value) => display(value),
			None => "<empty>".to_owned(),
		}
	}
}

impl fmt::Display for Handle<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_display_string())
	}
}

/// A JavaScript value kept alive across runtime entries.
///
/// The value is restored into a [`Handle`] inside [`Runtime::with`], and is
/// released under the runtime lock when dropped.
pub struct Stored {
	value: Option<Persistent<Value<'static>>>,
	runtime: Arc<Runtime>,
}

impl Stored {
	pub fn new<'js>(runtime: &Arc<Runtime>, ctx: &Ctx<'js>, handle: Handle<'js>) -> Self {
		Stored {
			value: handle.value.map(|value| Persistent::save(ctx, value)),
			runtime: runtime.clone(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.value.is_none()
	}

	/// Takes a new reference to the stored value in the current entry.
	pub fn restore<'js>(&self, ctx: &Ctx<'js>) -> Result<Handle<'js>, Error> {
		match &self.value {
			Some(value) => Ok(Handle::from_owned(value.clone().restore(ctx)?)),
			None => Ok(Handle::empty()),
		}
	}
}

impl fmt::Debug for Stored {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Stored").field("empty", &self.is_empty()).finish_non_exhaustive()
	}
}

impl Drop for Stored {
	fn drop(&mut self) {
		if let Some(value) = self.value.take() {
			self.runtime.release(value);
		}
	}
}
