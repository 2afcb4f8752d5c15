use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::err::Error;
use crate::utils::display::{Quoted, format_separated};

/// The logical type of an engine column or value.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum LogicalType {
	/// The type of an untyped NULL literal
	Null,
	Boolean,
	TinyInt,
	SmallInt,
	Integer,
	BigInt,
	Float,
	Double,
	Varchar,
	/// An ordered list of named children
	Struct(Vec<(String, LogicalType)>),
	/// Days since the unix epoch
	Date,
	/// Microseconds since the unix epoch
	Timestamp,
	Blob,
	List(Box<LogicalType>),
}

impl LogicalType {
	/// Whether the type is one of the fixed width integer types
	pub fn is_integer(&self) -> bool {
		matches!(
			self,
			LogicalType::TinyInt
				| LogicalType::SmallInt
				| LogicalType::Integer
				| LogicalType::BigInt
		)
	}

	/// Whether the type is one of the floating point types
	pub fn is_floating(&self) -> bool {
		matches!(self, LogicalType::Float | LogicalType::Double)
	}

	/// Returns the first type nested in `self` which values can not be
	/// passed to JavaScript, if any.
	pub fn unsupported(&self) -> Option<&LogicalType> {
		match self {
			LogicalType::Date
			| LogicalType::Timestamp
			| LogicalType::Blob
			| LogicalType::List(_) => Some(self),
			LogicalType::Struct(children) => {
				children.iter().find_map(|(_, kind)| kind.unsupported())
			}
			_ => None,
		}
	}

	/// The inclusive range of an integer type
	pub fn integer_range(&self) -> Option<(i64, i64)> {
		match self {
			LogicalType::TinyInt => Some((i8::MIN.into(), i8::MAX.into())),
			LogicalType::SmallInt => Some((i16::MIN.into(), i16::MAX.into())),
			LogicalType::Integer => Some((i32::MIN.into(), i32::MAX.into())),
			LogicalType::BigInt => Some((i64::MIN, i64::MAX)),
			_ => None,
		}
	}
}

struct Field<'a>(&'a str, &'a LogicalType);

impl Display for Field<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", Quoted::ident(self.0), self.1)
	}
}

impl Display for LogicalType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			LogicalType::Null => f.write_str("NULL"),
			LogicalType::Boolean => f.write_str("BOOLEAN"),
			LogicalType::TinyInt => f.write_str("TINYINT"),
			LogicalType::SmallInt => f.write_str("SMALLINT"),
			LogicalType::Integer => f.write_str("INTEGER"),
			LogicalType::BigInt => f.write_str("BIGINT"),
			LogicalType::Float => f.write_str("FLOAT"),
			LogicalType::Double => f.write_str("DOUBLE"),
			LogicalType::Varchar => f.write_str("VARCHAR"),
			LogicalType::Struct(children) => {
				let fields: Vec<Field> =
					children.iter().map(|(name, kind)| Field(name, kind)).collect();
				write!(f, "STRUCT({})", format_separated(&fields, ", "))
			}
			LogicalType::Date => f.write_str("DATE"),
			LogicalType::Timestamp => f.write_str("TIMESTAMP"),
			LogicalType::Blob => f.write_str("BLOB"),
			LogicalType::List(child) => write!(f, "{child}[]"),
		}
	}
}

impl FromStr for LogicalType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut parser = Parser::new(s);
		let kind = parser.parse_type()?;
		parser.skip_whitespace();
		if !parser.is_done() {
			return Err(Error::Trailing {
				trailing: parser.rest().to_owned(),
				input: s.to_owned(),
			});
		}
		Ok(kind)
	}
}

/// A small recursive descent parser for textual type names.
struct Parser<'a> {
	input: &'a str,
	pos: usize,
}

impl<'a> Parser<'a> {
	fn new(input: &'a str) -> Self {
		Parser {
			input,
			pos: 0,
		}
	}

	fn rest(&self) -> &'a str {
		&self.input[self.pos..]
	}

	fn is_done(&self) -> bool {
		self.pos >= self.input.len()
	}

	fn peek(&self) -> Option<char> {
		self.rest().chars().next()
	}

	fn skip_whitespace(&mut self) {
		let rest = self.rest();
		self.pos += rest.len() - rest.trim_start().len();
	}

	fn eat(&mut self, token: &str) -> bool {
		self.skip_whitespace();
		if self.rest().starts_with(token) {
			self.pos += token.len();
			true
		} else {
			false
		}
	}

	fn expect(&mut self, token: &str, expected: &'static str) -> Result<(), Error> {
		if self.eat(token) {
			Ok(())
		} else {
			Err(self.expected(expected))
		}
	}

	fn expected(&self, expected: &'static str) -> Error {
		Error::Expected {
			expected,
			position: self.pos,
			input: self.input.to_owned(),
		}
	}

	fn ident(&mut self) -> Option<&'a str> {
		self.skip_whitespace();
		let rest = self.rest();
		let len = rest
			.char_indices()
			.find(|&(idx, c)| {
				!(c.is_ascii_alphabetic() || c == '_' || (idx > 0 && c.is_ascii_digit()))
			})
			.map(|(idx, _)| idx)
			.unwrap_or(rest.len());
		if len == 0 {
			return None;
		}
		self.pos += len;
		Some(&rest[..len])
	}

	/// Consumes `word` if it is the next identifier, case-insensitively.
	fn keyword(&mut self, word: &str) -> bool {
		let start = self.pos;
		match self.ident() {
			Some(ident) if ident.eq_ignore_ascii_case(word) => true,
			_ => {
				self.pos = start;
				false
			}
		}
	}

	fn field_name(&mut self) -> Result<String, Error> {
		self.skip_whitespace();
		if self.peek() != Some('"') {
			return self.ident().map(str::to_owned).ok_or_else(|| self.expected("a field name"));
		}
		self.pos += 1;
		let mut name = String::new();
		loop {
			let Some(c) = self.peek() else {
				return Err(self.expected("a closing '\"'"));
			};
			self.pos += c.len_utf8();
			if c == '"' {
				if self.peek() == Some('"') {
					self.pos += 1;
				} else {
					return Ok(name);
				}
			}
			name.push(c);
		}
	}

	fn parse_type(&mut self) -> Result<LogicalType, Error> {
		let name = self.ident().ok_or_else(|| self.expected("a type name"))?;
		let mut kind = match name.to_ascii_uppercase().as_str() {
			"NULL" => LogicalType::Null,
			"BOOLEAN" | "BOOL" | "LOGICAL" => LogicalType::Boolean,
			"TINYINT" | "INT1" => LogicalType::TinyInt,
			"SMALLINT" | "INT2" | "SHORT" => LogicalType::SmallInt,
			"INTEGER" | "INT" | "INT4" | "SIGNED" => LogicalType::Integer,
			"BIGINT" | "INT8" | "LONG" => LogicalType::BigInt,
			"FLOAT" | "REAL" | "FLOAT4" => LogicalType::Float,
			"DOUBLE" => {
				self.keyword("PRECISION");
				LogicalType::Double
			}
			"FLOAT8" => LogicalType::Double,
			"VARCHAR" | "TEXT" | "STRING" | "CHAR" | "BPCHAR" => {
				self.length_modifier()?;
				LogicalType::Varchar
			}
			"STRUCT" | "ROW" => self.parse_struct()?,
			"DATE" => LogicalType::Date,
			"TIMESTAMP" | "DATETIME" => LogicalType::Timestamp,
			"BLOB" | "BYTEA" | "BINARY" | "VARBINARY" => LogicalType::Blob,
			_ => return Err(Error::UnknownType(name.to_owned())),
		};
		while self.eat("[]") {
			kind = LogicalType::List(Box::new(kind));
		}
		Ok(kind)
	}

	fn length_modifier(&mut self) -> Result<(), Error> {
		if !self.eat("(") {
			return Ok(());
		}
		self.skip_whitespace();
		let digits = self.rest().bytes().take_while(u8::is_ascii_digit).count();
		if digits == 0 {
			return Err(self.expected("a length"));
		}
		self.pos += digits;
		self.expect(")", "')'")
	}

	fn parse_struct(&mut self) -> Result<LogicalType, Error> {
		self.expect("(", "'('")?;
		let mut children: Vec<(String, LogicalType)> = Vec::new();
		loop {
			let name = self.field_name()?;
			if children.iter().any(|(existing, _)| *existing == name) {
				return Err(Error::DuplicateField(name));
			}
			let kind = self.parse_type()?;
			children.push((name, kind));
			if self.eat(",") {
				continue;
			}
			self.expect(")", "',' or ')'")?;
			return Ok(LogicalType::Struct(children));
		}
	}
}
