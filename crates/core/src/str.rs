use std::num::ParseIntError;
use std::str::FromStr;

/// Parses sizes written with an optional binary unit suffix, such as `64MiB`.
pub trait ParseBytes {
	fn parse_bytes<T>(&self) -> Result<T, ParseIntError>
	where
		T: FromStr<Err = ParseIntError> + TryFrom<u128>;
}

impl ParseBytes for str {
	fn parse_bytes<T>(&self) -> Result<T, ParseIntError>
	where
		T: FromStr<Err = ParseIntError> + TryFrom<u128>,
	{
		let s = self.trim();
		let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
		let (number, unit) = s.split_at(split);
		let multiplier: u128 = match unit.trim().to_ascii_lowercase().as_str() {
			"" | "b" => return number.parse::<T>(),
			"k" | "kb" | "kib" => 1 << 10,
			"m" | "mb" | "mib" => 1 << 20,
			"g" | "gb" | "gib" => 1 << 30,
			// Produces the standard integer error for the unknown suffix
			_ => return s.parse::<T>(),
		};
		let number = number.parse::<u128>()?;
		match number.checked_mul(multiplier).map(T::try_from) {
			Some(Ok(v)) => Ok(v),
			// Reuse the integer overflow error of the target type
			_ => "340282366920938463463374607431768211456".parse::<T>(),
		}
	}
}
