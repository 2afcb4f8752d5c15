use js::function::This;
use js::prelude::Coerced;
use js::{CatchResultExt, Value};

use super::exception::display;
use super::handle::Handle;
use crate::err::{Error, ForeignError};

/// A JavaScript iterator together with its `next` method.
#[derive(Debug)]
pub struct ForeignIterator<'js> {
	iterator: Handle<'js>,
	next: Handle<'js>,
}

impl<'js> ForeignIterator<'js> {
	pub(crate) fn new(iterator: Handle<'js>) -> Result<Self, Error> {
		match iterator.attribute("next") {
			Ok(next) if next.is_callable() => Ok(ForeignIterator {
				iterator,
				next,
			}),
			Ok(_) | Err(Error::AttributeError {
				..
			}) => Err(Error::NotIterable {
				value: iterator.to_display_string(),
			}),
			Err(e) => Err(e),
		}
	}

	/// Reassembles an iterator previously split with [`ForeignIterator::into_parts`].
	pub fn from_parts(iterator: Handle<'js>, next: Handle<'js>) -> Result<Self, Error> {
		if iterator.is_empty() || !next.is_callable() {
			return Err(Error::InvalidHandle);
		}
		Ok(ForeignIterator {
			iterator,
			next,
		})
	}

	pub fn into_parts(self) -> (Handle<'js>, Handle<'js>) {
		(self.iterator, self.next)
	}

	/// Advances the iterator, returning `None` once it is done.
	pub fn pull(&mut self) -> Result<Option<Handle<'js>>, Error> {
		let iterator = self.iterator.value()?;
		let ctx = iterator.ctx();
		let Some(next) = self.next.value()?.as_function() else {
			return Err(Error::InvalidHandle);
		};
		let outcome: Value<'js> = next.call((This(iterator.clone()),)).catch(ctx)?;
		let Some(result) = outcome.as_object() else {
			let error =
				ForeignError::new(format!("Iterator result {} is not an object", display(&outcome)))
					.with_kind(Some("TypeError".to_owned()));
			return Err(Error::ForeignCall(error));
		};
		let Coerced(done) = result.get::<_, Coerced<bool>>("done").catch(ctx)?;
		if done {
			return Ok(None);
		}
		let value: Value<'js> = result.get("value").catch(ctx)?;
		Ok(Some(Handle::from_owned(value)))
	}
}
