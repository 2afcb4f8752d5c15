use js::CatchResultExt;
use jstables_types::{Column, ColumnSchema, LogicalType, Value};

use super::binding::Bound;
use crate::conv::{Arguments, text};
use crate::err::Error;
use crate::rt::Handle;

const TARGET: &str = "jstables::core::fnc";

/// The name of the hook listing the output column names
pub const COLUMN_NAMES: &str = "column_names";
/// The name of the hook listing the output column types
pub const COLUMN_TYPES: &str = "column_types";

/// Builds the schema declared with the `columns` parameter.
///
/// Every field of the STRUCT names a column, its VARCHAR value is the type.
pub fn declared(columns: &Value) -> Result<ColumnSchema, Error> {
	let Value::Struct(fields) = columns else {
		return Err(Error::SchemaDeclarationError(format!(
			"'columns' must be a STRUCT of column names and type names, found {}",
			columns.logical_type()
		)));
	};
	let mut schema = ColumnSchema::new();
	for (name, kind) in fields {
		let Value::Varchar(kind) = kind else {
			return Err(Error::SchemaDeclarationError(format!(
				"the type of column '{name}' must be given as VARCHAR, found {}",
				kind.logical_type()
			)));
		};
		let kind = parse_type(name, kind)?;
		push(&mut schema, Column::new(name.as_str(), kind))?;
	}
	Ok(schema)
}

/// Asks the function for its output columns through the introspection hooks.
///
/// A function without hooks yields an empty schema.
pub fn discover<'js>(bound: &Bound<'js>, args: &Arguments<'js>) -> Result<ColumnSchema, Error> {
	let names = hook(bound.active(), COLUMN_NAMES, args)?;
	let types = hook(bound.active(), COLUMN_TYPES, args)?;
	trace!(
		target: TARGET,
		function = %bound.specifier(),
		names = names.len(),
		types = types.len(),
		"Discovered column metadata"
	);
	let names = names.iter().map(column_name).collect::<Result<Vec<_>, _>>()?;
	let types = match (names.len(), types.len()) {
		(_, 0) => vec![LogicalType::Varchar; names.len()],
		(0, _) => {
			return Err(Error::SchemaDeclarationError(
				"column types were given without column names".to_owned(),
			));
		}
		(n, t) if n != t => {
			return Err(Error::SchemaDeclarationError(format!(
				"{n} column names were given with {t} column types"
			)));
		}
		_ => names
			.iter()
			.zip(&types)
			.map(|(name, kind)| column_type(name, kind))
			.collect::<Result<Vec<_>, _>>()?,
	};
	let mut schema = ColumnSchema::new();
	for (name, kind) in names.into_iter().zip(types) {
		push(&mut schema, Column::new(name, kind))?;
	}
	Ok(schema)
}

/// Calls an introspection hook and collects the iterable it returns.
fn hook<'js>(
	callable: &Handle<'js>,
	name: &str,
	args: &Arguments<'js>,
) -> Result<Vec<Handle<'js>>, Error> {
	let hook = match callable.attribute(name) {
		Ok(hook) if hook.is_callable() => hook,
		Ok(_)
		| Err(Error::AttributeError {
			..
		}) => return Ok(Vec::new()),
		Err(e) => return Err(e),
	};
	let result = args.apply(&hook)?;
	if result.is_none()? {
		return Ok(Vec::new());
	}
	let mut items = result.iterate().map_err(|e| match e {
		Error::NotIterable {
			value,
		} => Error::SchemaDeclarationError(format!("{name}() returned '{value}', which is not iterable")),
		e => e,
	})?;
	let mut collected = Vec::new();
	while let Some(item) = items.pull()? {
		collected.push(item);
	}
	Ok(collected)
}

fn column_name(item: &Handle<'_>) -> Result<String, Error> {
	let name = match item.value()?.as_string() {
		Some(name) => text(name)?,
		None => None,
	};
	name.ok_or_else(|| {
		Error::SchemaDeclarationError(format!("column names must be UTF-8 strings, found '{item}'"))
	})
}

/// Reads a type entry: a type name or one of the String, Number, Boolean and BigInt constructors.
fn column_type(name: &str, item: &Handle<'_>) -> Result<LogicalType, Error> {
	let value = item.value()?;
	if let Some(string) = value.as_string() {
		if let Some(kind) = text(string)? {
			return parse_type(name, &kind);
		}
	}
	if let Some(function) = value.as_function() {
		let constructor: Option<String> = function.get("name").catch(value.ctx())?;
		match constructor.as_deref() {
			Some("String") => return Ok(LogicalType::Varchar),
			Some("Number") => return Ok(LogicalType::Double),
			Some("Boolean") => return Ok(LogicalType::Boolean),
			Some("BigInt") => return Ok(LogicalType::BigInt),
			_ => {}
		}
	}
	Err(Error::SchemaDeclarationError(format!(
		"the type of column '{name}' is neither a type name nor a supported constructor: '{item}'"
	)))
}

fn parse_type(name: &str, text: &str) -> Result<LogicalType, Error> {
	text.parse().map_err(|e| {
		Error::SchemaDeclarationError(format!("the type of column '{name}' is invalid: {e}"))
	})
}

fn push(schema: &mut ColumnSchema, column: Column) -> Result<(), Error> {
	schema.push(column).map_err(|e| Error::SchemaDeclarationError(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fnc::binding::parse_specifier;
	use crate::rt::{Runtime, RuntimeConfig};

	const UDFS: &str = r#"
		import { jstable } from "jstables";

		function plain() { return []; }

		function named() { return []; }
		named.columns = ["a", "b"];

		function typed() { return []; }
		typed.columns = ["id", "name", "score", "flag", "big"];
		typed.types = ["INTEGER", String, Number, Boolean, BigInt];

		function dynamic(n) { return []; }
		dynamic.columns = (n) => Array.from({ length: n }, (_, i) => `c${i}`);
		dynamic.types = (n) => Array.from({ length: n }, () => "SMALLINT").values();

		function orphan() { return []; }
		orphan.types = ["INTEGER"];

		function uneven() { return []; }
		uneven.columns = ["a", "b"];
		uneven.types = ["INTEGER"];

		function twice() { return []; }
		twice.columns = ["a", "a"];

		function invalid() { return []; }
		invalid.columns = ["a"];
		invalid.types = ["NOT A TYPE"];

		function broken() { return []; }
		broken.columns = () => { throw new Error("no columns today"); };

		function scalar() { return []; }
		scalar.columns = () => 5;

		function unpaired() { return []; }
		unpaired.columns = ["ok", "bad\uD800"];

		export { plain, named, typed, dynamic, orphan, uneven, twice, invalid, broken, scalar, unpaired };
		export const custom = jstable(plain);
	"#;

	fn discover_schema(function: &str, args: &[Value]) -> Result<String, String> {
		let config = RuntimeConfig::from_env().with_decorator("jstables", "jstable").with_module("udfs", UDFS);
		let runtime = Runtime::new(config.clone()).unwrap();
		let specifier = parse_specifier(&format!("udfs:{function}")).unwrap();
		runtime.with(|ctx| {
			let bound = Bound::resolve(&ctx, &specifier)
				.and_then(|bound| bound.wrap(&ctx, config.decorator()))
				.map_err(|e| e.to_string())?;
			let args = Arguments::marshal(&ctx, args, None).map_err(|e| e.to_string())?;
			discover(&bound, &args).map(|schema| schema.to_string()).map_err(|e| e.to_string())
		})
	}

	#[test]
	fn functions_without_metadata_have_no_columns() {
		assert_eq!(discover_schema("plain", &[]).unwrap(), "()");
		assert_eq!(discover_schema("custom", &[]).unwrap(), "()");
	}

	#[test]
	fn names_default_to_varchar() {
		assert_eq!(discover_schema("named", &[]).unwrap(), "(a VARCHAR, b VARCHAR)");
	}

	#[test]
	fn types_may_be_names_or_constructors() {
		assert_eq!(
			discover_schema("typed", &[]).unwrap(),
			"(id INTEGER, name VARCHAR, score DOUBLE, flag BOOLEAN, big BIGINT)"
		);
	}

	#[test]
	fn metadata_may_depend_on_the_arguments() {
		assert_eq!(
			discover_schema("dynamic", &[Value::BigInt(2)]).unwrap(),
			"(c0 SMALLINT, c1 SMALLINT)"
		);
	}

	#[test]
	fn inconsistent_metadata_is_rejected() {
		for function in ["orphan", "uneven", "twice", "invalid", "scalar", "unpaired"] {
			let err = discover_schema(function, &[]).unwrap_err();
			assert!(err.starts_with("Invalid column declaration: "), "{function}: {err}");
		}
	}

	#[test]
	fn hook_exceptions_propagate() {
		assert_eq!(discover_schema("broken", &[]).unwrap_err(), "no columns today");
	}

	#[test]
	fn declared_columns() {
		let columns = Value::Struct(vec![
			("id".to_owned(), Value::from("BIGINT")),
			("tags".to_owned(), Value::from("varchar[]")),
		]);
		assert_eq!(declared(&columns).unwrap().to_string(), "(id BIGINT, tags VARCHAR[])");
		let err = declared(&Value::from("id BIGINT")).unwrap_err();
		assert!(matches!(err, Error::SchemaDeclarationError(_)));
		let columns = Value::Struct(vec![("id".to_owned(), Value::from(1))]);
		assert!(matches!(declared(&columns), Err(Error::SchemaDeclarationError(_))));
		let columns = Value::Struct(vec![("id".to_owned(), Value::from("NUMBERISH"))]);
		let err = declared(&columns).unwrap_err();
		assert_eq!(
			err.to_string(),
			"Invalid column declaration: the type of column 'id' is invalid: Unknown type name 'NUMBERISH'"
		);
		assert!(declared(&Value::Struct(vec![])).unwrap().is_empty());
	}
}
