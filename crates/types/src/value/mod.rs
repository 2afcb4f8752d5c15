/// JSON rendering of engine values
pub mod into_json;

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::LogicalType;
use crate::utils::display::{Quoted, format_separated};

/// A single engine value.
///
/// Each variant corresponds to one [`LogicalType`]. `Null` is the absence of
/// a value and can stand in for any type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
	/// The absence of a value
	#[default]
	Null,
	/// A boolean value
	Boolean(bool),
	/// An 8-bit signed integer
	TinyInt(i8),
	/// A 16-bit signed integer
	SmallInt(i16),
	/// A 32-bit signed integer
	Integer(i32),
	/// A 64-bit signed integer
	BigInt(i64),
	/// A single precision float
	Float(f32),
	/// A double precision float
	Double(f64),
	/// A UTF-8 string
	Varchar(String),
	/// Named children, in declaration order
	Struct(Vec<(String, Value)>),
	/// Days since the unix epoch
	Date(i32),
	/// Microseconds since the unix epoch
	Timestamp(i64),
	/// Raw bytes
	Blob(Vec<u8>),
	/// A list of values sharing the child type
	List(LogicalType, Vec<Value>),
}

impl Value {
	/// Whether this is the null value
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// The logical type this value carries.
	pub fn logical_type(&self) -> LogicalType {
		match self {
			Value::Null => LogicalType::Null,
			Value::Boolean(_) => LogicalType::Boolean,
			Value::TinyInt(_) => LogicalType::TinyInt,
			Value::SmallInt(_) => LogicalType::SmallInt,
			Value::Integer(_) => LogicalType::Integer,
			Value::BigInt(_) => LogicalType::BigInt,
			Value::Float(_) => LogicalType::Float,
			Value::Double(_) => LogicalType::Double,
			Value::Varchar(_) => LogicalType::Varchar,
			Value::Struct(fields) => LogicalType::Struct(
				fields.iter().map(|(name, value)| (name.clone(), value.logical_type())).collect(),
			),
			Value::Date(_) => LogicalType::Date,
			Value::Timestamp(_) => LogicalType::Timestamp,
			Value::Blob(_) => LogicalType::Blob,
			Value::List(child, _) => LogicalType::List(Box::new(child.clone())),
		}
	}

	/// Returns the value as an `i64` if it is an integer.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::TinyInt(v) => Some((*v).into()),
			Value::SmallInt(v) => Some((*v).into()),
			Value::Integer(v) => Some((*v).into()),
			Value::BigInt(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the value as an `f64` if it is numeric.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Float(v) => Some((*v).into()),
			Value::Double(v) => Some(*v),
			v => v.as_i64().map(|v| v as f64),
		}
	}

	/// Returns the string slice if this is a VARCHAR value.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Varchar(v) => Some(v),
			_ => None,
		}
	}

	/// Looks up a child of a STRUCT value by name.
	pub fn field(&self, name: &str) -> Option<&Value> {
		match self {
			Value::Struct(fields) => {
				fields.iter().find(|(field, _)| field == name).map(|(_, value)| value)
			}
			_ => None,
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Boolean(v)
	}
}

impl From<i8> for Value {
	fn from(v: i8) -> Self {
		Value::TinyInt(v)
	}
}

impl From<i16> for Value {
	fn from(v: i16) -> Self {
		Value::SmallInt(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Integer(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::BigInt(v)
	}
}

impl From<f32> for Value {
	fn from(v: f32) -> Self {
		Value::Float(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Double(v)
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Varchar(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Varchar(v.to_owned())
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map(Into::into).unwrap_or_default()
	}
}

struct Entry<'a>(&'a str, &'a Value);

impl Display for Entry<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", Quoted::single(self.0), self.1)
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("NULL"),
			Value::Boolean(v) => Display::fmt(v, f),
			Value::TinyInt(v) => Display::fmt(v, f),
			Value::SmallInt(v) => Display::fmt(v, f),
			Value::Integer(v) => Display::fmt(v, f),
			Value::BigInt(v) => Display::fmt(v, f),
			Value::Float(v) => Display::fmt(v, f),
			Value::Double(v) => Display::fmt(v, f),
			Value::Varchar(v) => f.write_str(v),
			Value::Struct(fields) => {
				let entries: Vec<Entry> =
					fields.iter().map(|(name, value)| Entry(name, value)).collect();
				write!(f, "{{{}}}", format_separated(&entries, ", "))
			}
			Value::Date(days) => write!(f, "DATE {days}"),
			Value::Timestamp(micros) => write!(f, "TIMESTAMP {micros}"),
			Value::Blob(bytes) => {
				f.write_str("\\x")?;
				for b in bytes {
					write!(f, "{b:02X}")?;
				}
				Ok(())
			}
			Value::List(_, items) => write!(f, "[{}]", format_separated(items, ", ")),
		}
	}
}
