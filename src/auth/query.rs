//! URL query helpers used when rewriting login start URLs.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
// self
use crate::{_prelude::*, error::ConfigError};

/// Everything outside the RFC 3986 unreserved set gets escaped, so spaces become `%20`.
const QUERY_COMPONENT: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Returns a copy of `url` with `name=value` appended to its query string.
///
/// Both the name and the value are percent-encoded. Any existing query is preserved and an
/// empty query (`https://x/y?`) is treated as absent.
pub fn append_query_parameter(url: &Url, name: &str, value: &str) -> Result<Url> {
	if name.is_empty() {
		return Err(ConfigError::EmptyQueryParameterName.into());
	}

	let pair = format!(
		"{}={}",
		utf8_percent_encode(name, QUERY_COMPONENT),
		utf8_percent_encode(value, QUERY_COMPONENT)
	);
	let query = match url.query() {
		Some(existing) if !existing.is_empty() => format!("{existing}&{pair}"),
		_ => pair,
	};
	let mut rewritten = url.clone();

	rewritten.set_query(Some(&query));

	Ok(rewritten)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	#[test]
	fn appends_to_existing_query() {
		let rewritten = append_query_parameter(&url("https://x/y?a=1"), "foo", "bar baz")
			.expect("Appending to an existing query should succeed.");

		assert_eq!(rewritten.as_str(), "https://x/y?a=1&foo=bar%20baz");
	}

	#[test]
	fn starts_a_query_when_none_exists() {
		let rewritten = append_query_parameter(&url("https://x/y"), "foo", "bar baz")
			.expect("Appending without a query should succeed.");

		assert_eq!(rewritten.as_str(), "https://x/y?foo=bar%20baz");

		let rewritten = append_query_parameter(&url("https://x/y?"), "foo", "bar")
			.expect("Appending to an empty query should succeed.");

		assert_eq!(rewritten.as_str(), "https://x/y?foo=bar");
	}

	#[test]
	fn escapes_reserved_characters_in_both_halves() {
		let rewritten = append_query_parameter(
			&url("https://app.example.com/login/google"),
			"sso_end_uri",
			"ms-app://s-1-15-2/",
		)
		.expect("Appending a callback URI should succeed.");

		assert_eq!(
			rewritten.as_str(),
			"https://app.example.com/login/google?sso_end_uri=ms-app%3A%2F%2Fs-1-15-2%2F"
		);
		assert_eq!(
			rewritten.query_pairs().next().map(|(k, v)| (k.into_owned(), v.into_owned())),
			Some(("sso_end_uri".into(), "ms-app://s-1-15-2/".into()))
		);
	}

	#[test]
	fn rejects_empty_names() {
		let err = append_query_parameter(&url("https://x/y"), "", "v")
			.expect_err("Empty parameter names should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::EmptyQueryParameterName)));
	}
}
