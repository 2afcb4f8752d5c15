use js::{CatchResultExt, Type};
use jstables_types::{LogicalType, Value};

use super::{F64_INT_MAX, F64_INT_MIN, text};
use crate::err::Error;
use crate::rt::Handle;

/// Converts a JavaScript value into an engine value of the given logical type.
///
/// `undefined`, `null`, strings without a UTF-8 form, and any value which
/// does not fit the target type become NULL. Only an empty handle or an exception thrown while reading a
/// STRUCT field is an error.
pub fn from_foreign(handle: &Handle<'_>, kind: &LogicalType) -> Result<Value, Error> {
	convert(handle.value()?, kind)
}

fn convert(value: &js::Value<'_>, kind: &LogicalType) -> Result<Value, Error> {
	if value.is_undefined() || value.is_null() {
		return Ok(Value::Null);
	}
	let converted = match kind {
		LogicalType::Boolean => value.as_bool().map(Value::Boolean),
		LogicalType::TinyInt => integer(value).and_then(|v| i8::try_from(v).ok()).map(Value::TinyInt),
		LogicalType::SmallInt => {
			integer(value).and_then(|v| i16::try_from(v).ok()).map(Value::SmallInt)
		}
		LogicalType::Integer => integer(value).and_then(|v| i32::try_from(v).ok()).map(Value::Integer),
		LogicalType::BigInt => integer(value).map(Value::BigInt),
		LogicalType::Float => value.as_number().map(|v| Value::Float(v as f32)),
		LogicalType::Double => value.as_number().map(Value::Double),
		LogicalType::Varchar => match value.as_string() {
			Some(s) => text(s)?.map(Value::Varchar),
			None => None,
		},
		LogicalType::Struct(children) => return structure(value, children),
		LogicalType::Null
		| LogicalType::Date
		| LogicalType::Timestamp
		| LogicalType::Blob
		| LogicalType::List(_) => None,
	};
	Ok(converted.unwrap_or_default())
}

/// Reads an integral JavaScript number or BigInt.
fn integer(value: &js::Value<'_>) -> Option<i64> {
	match value.type_of() {
		Type::Int => value.as_int().map(i64::from),
		Type::Float => value
			.as_float()
			.filter(|v| v.fract() == 0.0 && (F64_INT_MIN as f64..=F64_INT_MAX as f64).contains(v))
			.map(|v| v as i64),
		Type::BigInt => value.as_big_int().and_then(|v| v.clone().to_i64().ok()),
		_ => None,
	}
}

fn structure(value: &js::Value<'_>, children: &[(String, LogicalType)]) -> Result<Value, Error> {
	let Some(object) = value.as_object().filter(|_| !value.is_array() && !value.is_function()) else {
		return Ok(Value::Null);
	};
	let mut fields = Vec::with_capacity(children.len());
	for (name, kind) in children {
		let field: js::Value = object.get(name.as_str()).catch(value.ctx())?;
		fields.push((name.clone(), convert(&field, kind)?));
	}
	Ok(Value::Struct(fields))
}
