use crate::err::Error;
use crate::{ColumnSchema, LogicalType, Value};

/// The number of rows in a full batch unless configured otherwise.
pub const STANDARD_VECTOR_SIZE: usize = 2048;

/// A column-major batch of rows with a fixed capacity.
#[derive(Clone, Debug, PartialEq)]
pub struct DataChunk {
	types: Vec<LogicalType>,
	columns: Vec<Vec<Value>>,
	capacity: usize,
	size: usize,
}

impl DataChunk {
	pub fn new(types: Vec<LogicalType>, capacity: usize) -> Self {
		let columns = types.iter().map(|_| Vec::with_capacity(capacity)).collect();
		DataChunk {
			types,
			columns,
			capacity,
			size: 0,
		}
	}

	pub fn for_schema(schema: &ColumnSchema, capacity: usize) -> Self {
		Self::new(schema.types(), capacity)
	}

	/// Builds a chunk holding exactly `rows`.
	pub fn from_rows(types: Vec<LogicalType>, rows: Vec<Vec<Value>>) -> Result<Self, Error> {
		let mut chunk = Self::new(types, rows.len());
		for row in rows {
			chunk.append_row(row)?;
		}
		Ok(chunk)
	}

	pub fn types(&self) -> &[LogicalType] {
		&self.types
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// The number of rows currently held
	pub fn size(&self) -> usize {
		self.size
	}

	pub fn is_empty(&self) -> bool {
		self.size == 0
	}

	pub fn is_full(&self) -> bool {
		self.size >= self.capacity
	}

	/// Appends one row, which must hold a value for every column.
	pub fn append_row(&mut self, row: Vec<Value>) -> Result<(), Error> {
		if row.len() != self.columns.len() {
			return Err(Error::RowWidth {
				expected: self.columns.len(),
				found: row.len(),
			});
		}
		for (column, value) in self.columns.iter_mut().zip(row) {
			column.push(value);
		}
		self.size += 1;
		Ok(())
	}

	pub fn column(&self, idx: usize) -> Option<&[Value]> {
		self.columns.get(idx).map(Vec::as_slice)
	}

	pub fn value(&self, column: usize, row: usize) -> Option<&Value> {
		self.columns.get(column).and_then(|c| c.get(row))
	}

	/// Iterates over the rows, cloning values out of the columns.
	pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
		(0..self.size).map(move |row| self.columns.iter().map(|c| c[row].clone()).collect())
	}

	/// Empties the chunk, keeping its types and capacity.
	pub fn reset(&mut self) {
		for column in &mut self.columns {
			column.clear();
		}
		self.size = 0;
	}
}
