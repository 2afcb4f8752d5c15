use thiserror::Error;

/// An error raised while building engine-side types and schemas.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
	/// The type name is not one the engine knows about
	#[error("Unknown type name '{0}'")]
	UnknownType(String),

	/// The type declaration ended or continued unexpectedly
	#[error("Expected {expected} at position {position} in '{input}'")]
	Expected {
		expected: &'static str,
		position: usize,
		input: String,
	},

	/// A STRUCT declares the same field twice
	#[error("Duplicate field '{0}' in STRUCT declaration")]
	DuplicateField(String),

	/// Something other than whitespace followed a complete type
	#[error("Unexpected input '{trailing}' after type '{input}'")]
	Trailing {
		trailing: String,
		input: String,
	},

	/// A schema declares the same column twice
	#[error("Duplicate column name '{0}'")]
	DuplicateColumn(String),

	/// A row does not have one value per column of the chunk
	#[error("Expected a row with {expected} values, found {found}")]
	RowWidth {
		expected: usize,
		found: usize,
	},
}
