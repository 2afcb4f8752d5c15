use serde_json::{Map, Number as JsonNumber, Value as JsonValue};

use crate::Value;

impl Value {
	/// Converts the value into a json representation of the value.
	pub fn into_json_value(self) -> JsonValue {
		match self {
			Value::Null => JsonValue::Null,
			Value::Boolean(boolean) => JsonValue::Bool(boolean),
			Value::TinyInt(int) => JsonValue::Number(int.into()),
			Value::SmallInt(int) => JsonValue::Number(int.into()),
			Value::Integer(int) => JsonValue::Number(int.into()),
			Value::BigInt(int) => JsonValue::Number(int.into()),
			Value::Float(float) => float_into_json_value(float.into()),
			Value::Double(float) => float_into_json_value(float),
			Value::Varchar(string) => JsonValue::String(string),
			Value::Struct(fields) => {
				let mut map = Map::with_capacity(fields.len());
				for (k, v) in fields {
					map.insert(k, v.into_json_value());
				}
				JsonValue::Object(map)
			}
			Value::Date(days) => JsonValue::Number(days.into()),
			Value::Timestamp(micros) => JsonValue::Number(micros.into()),
			Value::Blob(bytes) => {
				JsonValue::Array(bytes.into_iter().map(|x| JsonValue::Number(x.into())).collect())
			}
			Value::List(_, items) => {
				JsonValue::Array(items.into_iter().map(Value::into_json_value).collect())
			}
		}
	}
}

fn float_into_json_value(float: f64) -> JsonValue {
	// f64 converts to null if it is either NaN or infinity, like serde_json::to_string.
	match JsonNumber::from_f64(float) {
		Some(number) => JsonValue::Number(number),
		None => JsonValue::Null,
	}
}
