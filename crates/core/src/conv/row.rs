use js::CatchResultExt;
use jstables_types::{ColumnSchema, Value};

use super::from::from_foreign;
use crate::err::Error;
use crate::rt::Handle;

/// Converts one produced row into engine values, one per schema column.
///
/// Arrays are read by index, any other iterable through the iterator
/// protocol. A row must yield exactly as many values as there are columns.
pub fn convert_row(row: &Handle<'_>, schema: &ColumnSchema) -> Result<Vec<Value>, Error> {
	let expected = schema.len();
	let value = row.value()?;
	let mut values = Vec::with_capacity(expected);
	if let Some(array) = value.as_array() {
		let found = array.len();
		if found > expected {
			return Err(Error::RowArity {
				found: expected + 1,
				expected,
			});
		}
		for (idx, column) in schema.iter().enumerate().take(found) {
			let item: js::Value = array.get(idx).catch(value.ctx())?;
			values.push(from_foreign(&Handle::from_owned(item), &column.kind)?);
		}
	} else {
		let mut items = row.iterate().map_err(|e| match e {
			Error::NotIterable {
				value,
			} => Error::RowNotIterable {
				value,
			},
			e => e,
		})?;
		while let Some(item) = items.pull()? {
			let Some(column) = schema.columns().get(values.len()) else {
				return Err(Error::RowArity {
					found: values.len() + 1,
					expected,
				});
			};
			values.push(from_foreign(&item, &column.kind)?);
		}
	}
	if values.len() < expected {
		return Err(Error::RowArity {
			found: values.len(),
			expected,
		});
	}
	Ok(values)
}
