use js::{BigInt, CatchResultExt, Ctx, Object};
use jstables_types::{LogicalType, Value};

use super::{F64_INT_MAX, F64_INT_MIN};
use crate::err::Error;
use crate::rt::Handle;

/// Converts an engine value of the given logical type into a new JavaScript value.
///
/// NULL becomes `null`. Types without a JavaScript representation fail with
/// [`Error::UnsupportedType`], even for NULL values.
pub fn to_foreign<'js>(
	ctx: &Ctx<'js>,
	value: &Value,
	kind: &LogicalType,
) -> Result<Handle<'js>, Error> {
	if let Some(unsupported) = kind.unsupported() {
		return Err(Error::UnsupportedType(unsupported.clone()));
	}
	convert(ctx, value, kind).map(Handle::from_owned)
}

fn convert<'js>(ctx: &Ctx<'js>, value: &Value, kind: &LogicalType) -> Result<js::Value<'js>, Error> {
	let mismatch = || Error::TypeMismatch {
		expected: kind.clone(),
		value: value.to_string(),
	};
	match (kind, value) {
		(_, Value::Null) | (LogicalType::Null, _) => Ok(js::Value::new_null(ctx.clone())),
		(LogicalType::Boolean, Value::Boolean(v)) => Ok(js::Value::new_bool(ctx.clone(), *v)),
		(kind, value) if kind.is_integer() => {
			let v = value.as_i64().ok_or_else(mismatch)?;
			let (min, max) = kind.integer_range().ok_or_else(mismatch)?;
			if !(min..=max).contains(&v) {
				return Err(mismatch());
			}
			if ((i32::MIN as i64)..=(i32::MAX as i64)).contains(&v) {
				Ok(js::Value::new_int(ctx.clone(), v as i32))
			} else if (F64_INT_MIN..=F64_INT_MAX).contains(&v) {
				Ok(js::Value::new_float(ctx.clone(), v as f64))
			} else {
				Ok(js::Value::from(BigInt::from_i64(ctx.clone(), v).catch(ctx)?))
			}
		}
		(kind, value) if kind.is_floating() => {
			let v = value.as_f64().ok_or_else(mismatch)?;
			Ok(js::Value::new_float(ctx.clone(), v))
		}
		(LogicalType::Varchar, Value::Varchar(v)) => {
			Ok(js::String::from_str(ctx.clone(), v).catch(ctx)?.into_value())
		}
		(LogicalType::Struct(children), Value::Struct(_)) => {
			let object = Object::new(ctx.clone()).catch(ctx)?;
			for (name, child) in children {
				let field = value.field(name).unwrap_or(&Value::Null);
				object.set(name.as_str(), convert(ctx, field, child)?).catch(ctx)?;
			}
			Ok(object.into_value())
		}
		_ => Err(mismatch()),
	}
}
