use std::fmt;

pub(crate) fn format_separated<'a, I>(items: &'a [I], separator: &'a str) -> Separated<'a, I> {
	Separated {
		items,
		separator,
	}
}

pub(crate) struct Separated<'a, I> {
	items: &'a [I],
	separator: &'a str,
}

impl<I> fmt::Display for Separated<'_, I>
where
	I: fmt::Display,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (idx, i) in self.items.iter().enumerate() {
			if idx != 0 {
				f.write_str(self.separator)?;
			}
			i.fmt(f)?;
		}
		Ok(())
	}
}

/// Writes `s` between `quote` characters, doubling any embedded quote.
pub(crate) struct Quoted<'a> {
	value: &'a str,
	quote: char,
}

impl<'a> Quoted<'a> {
	pub(crate) fn single(value: &'a str) -> Self {
		Quoted {
			value,
			quote: '\'',
		}
	}

	/// Quotes an identifier only when it is not a plain `[A-Za-z_][A-Za-z0-9_]*` name.
	pub(crate) fn ident(value: &'a str) -> Ident<'a> {
		Ident(Quoted {
			value,
			quote: '"',
		})
	}
}

impl fmt::Display for Quoted<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Write::write_char(f, self.quote)?;
		for c in self.value.chars() {
			if c == self.quote {
				fmt::Write::write_char(f, c)?;
			}
			fmt::Write::write_char(f, c)?;
		}
		fmt::Write::write_char(f, self.quote)
	}
}

pub(crate) struct Ident<'a>(Quoted<'a>);

pub(crate) fn is_plain_ident(s: &str) -> bool {
	let mut chars = s.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => {
			chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
		}
		_ => false,
	}
}

impl fmt::Display for Ident<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if is_plain_ident(self.0.value) {
			f.write_str(self.0.value)
		} else {
			self.0.fmt(f)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn separated() {
		assert_eq!(format_separated(&[1, 2, 3], ", ").to_string(), "1, 2, 3");
		assert_eq!(format_separated::<u8>(&[], ", ").to_string(), "");
	}

	#[test]
	fn quoting() {
		assert_eq!(Quoted::single("it's").to_string(), "'it''s'");
		assert_eq!(Quoted::ident("name").to_string(), "name");
		assert_eq!(Quoted::ident("first name").to_string(), "\"first name\"");
		assert_eq!(Quoted::ident("2nd").to_string(), "\"2nd\"");
	}
}
