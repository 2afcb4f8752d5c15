use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::LogicalType;
use crate::err::Error;
use crate::utils::display::{Quoted, format_separated};

/// A named, typed output column.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Column {
	pub name: String,
	pub kind: LogicalType,
}

impl Column {
	pub fn new(name: impl Into<String>, kind: LogicalType) -> Self {
		Column {
			name: name.into(),
			kind,
		}
	}
}

impl Display for Column {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", Quoted::ident(&self.name), self.kind)
	}
}

/// An ordered list of uniquely named columns.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
	columns: Vec<Column>,
}

impl ColumnSchema {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a schema, rejecting duplicate column names.
	pub fn try_from_columns<I>(columns: I) -> Result<Self, Error>
	where
		I: IntoIterator<Item = Column>,
	{
		let mut schema = Self::new();
		for column in columns {
			schema.push(column)?;
		}
		Ok(schema)
	}

	pub fn push(&mut self, column: Column) -> Result<(), Error> {
		if self.columns.iter().any(|c| c.name == column.name) {
			return Err(Error::DuplicateColumn(column.name));
		}
		self.columns.push(column);
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.columns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.columns.is_empty()
	}

	pub fn columns(&self) -> &[Column] {
		&self.columns
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Column> {
		self.columns.iter()
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.columns.iter().map(|c| c.name.as_str())
	}

	pub fn types(&self) -> Vec<LogicalType> {
		self.columns.iter().map(|c| c.kind.clone()).collect()
	}
}

impl<'a> IntoIterator for &'a ColumnSchema {
	type Item = &'a Column;
	type IntoIter = std::slice::Iter<'a, Column>;

	fn into_iter(self) -> Self::IntoIter {
		self.columns.iter()
	}
}

impl Display for ColumnSchema {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "({})", format_separated(&self.columns, ", "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unique_names() {
		let err = ColumnSchema::try_from_columns([
			Column::new("a", LogicalType::Integer),
			Column::new("a", LogicalType::Varchar),
		])
		.unwrap_err();
		assert_eq!(err, Error::DuplicateColumn("a".to_owned()));
	}

	#[test]
	fn display() {
		let schema = ColumnSchema::try_from_columns([
			Column::new("id", LogicalType::BigInt),
			Column::new("full name", LogicalType::Varchar),
		])
		.unwrap();
		assert_eq!(schema.to_string(), "(id BIGINT, \"full name\" VARCHAR)");
		assert_eq!(schema.names().collect::<Vec<_>>(), ["id", "full name"]);
	}
}
