use jstables_core::types::{LogicalType, Value};

/// Types a command-line argument by its literal syntax.
///
/// `true` and `false` are BOOLEAN, integers BIGINT, decimals DOUBLE, and
/// everything else VARCHAR.
pub fn parse_literal(text: &str) -> Value {
	match text {
		"true" => Value::Boolean(true),
		"false" => Value::Boolean(false),
		_ => {
			if let Ok(v) = text.parse::<i64>() {
				return Value::BigInt(v);
			}
			if looks_numeric(text) {
				if let Ok(v) = text.parse::<f64>() {
					return Value::Double(v);
				}
			}
			Value::from(text)
		}
	}
}

/// Rules out `inf`, `NaN` and the like, which `f64` would parse.
fn looks_numeric(text: &str) -> bool {
	text.chars().any(|c| c.is_ascii_digit())
		&& text.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

/// Parses a `NAME=TYPE` column declaration.
pub fn parse_column(text: &str) -> Result<(String, String), String> {
	let (name, kind) = split_pair(text, "NAME=TYPE")?;
	kind.parse::<LogicalType>().map_err(|e| e.to_string())?;
	Ok((name, kind))
}

/// Parses a `KEY=VALUE` keyword argument.
pub fn parse_kwarg(text: &str) -> Result<(String, Value), String> {
	let (key, value) = split_pair(text, "KEY=VALUE")?;
	Ok((key, parse_literal(&value)))
}

fn split_pair(text: &str, form: &str) -> Result<(String, String), String> {
	match text.split_once('=') {
		Some((left, right)) if !left.trim().is_empty() => {
			Ok((left.trim().to_owned(), right.trim().to_owned()))
		}
		_ => Err(format!("expected {form}, found '{text}'")),
	}
}
