//! Conversion of engine values to and from JavaScript.
//!
//! Conversion into JavaScript is strict: a value which can not be represented
//! is an error. Conversion back is lenient: a JavaScript value which does not
//! fit the target type becomes NULL.

mod args;
mod from;
mod into;
mod row;

pub use self::args::Arguments;
pub use self::from::from_foreign;
pub use self::into::to_foreign;
pub use self::row::convert_row;

/// The largest integer an `f64` represents exactly
const F64_INT_MAX: i64 = ((1u64 << f64::MANTISSA_DIGITS) - 1) as i64;
const F64_INT_MIN: i64 = -F64_INT_MAX;

/// Reads a JavaScript string, or `None` when it holds a lone surrogate and so
/// has no UTF-8 form.
pub(crate) fn text(string: &js::String<'_>) -> Result<Option<String>, crate::err::Error> {
	match string.to_string() {
		Ok(text) => Ok(Some(text)),
		Err(js::Error::Utf8(_)) => Ok(None),
		Err(e) => Err(e.into()),
	}
}
