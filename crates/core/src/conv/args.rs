use js::Ctx;
use jstables_types::Value;

use super::into::to_foreign;
use crate::err::Error;
use crate::rt::Handle;

/// Marshaled call arguments: positional values and optional keyword values.
///
/// Keyword arguments are passed as a trailing options object.
#[derive(Debug, Default)]
pub struct Arguments<'js> {
	positional: Vec<Handle<'js>>,
	keywords: Option<Handle<'js>>,
}

impl<'js> Arguments<'js> {
	/// Converts each value with its own logical type.
	///
	/// `keywords` must be a STRUCT value, its fields become the properties of the options object.
	pub fn marshal(ctx: &Ctx<'js>, positional: &[Value], keywords: Option<&Value>) -> Result<Self, Error> {
		let positional = positional
			.iter()
			.map(|value| to_foreign(ctx, value, &value.logical_type()))
			.collect::<Result<Vec<_>, _>>()?;
		let keywords = match keywords {
			Some(value @ Value::Struct(_)) => Some(to_foreign(ctx, value, &value.logical_type())?),
			Some(value) => {
				return Err(Error::InvalidArgument {
					name: "kwargs".to_owned(),
					message: format!("expected a STRUCT of keyword arguments, found '{value}'"),
				});
			}
			None => None,
		};
		Ok(Arguments {
			positional,
			keywords,
		})
	}

	/// Calls `callable` with these arguments.
	pub fn apply(&self, callable: &Handle<'js>) -> Result<Handle<'js>, Error> {
		match &self.keywords {
			Some(keywords) => callable.call_with_kwargs(&self.positional, keywords),
			None => callable.call(&self.positional),
		}
	}
}
