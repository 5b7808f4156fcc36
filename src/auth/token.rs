//! Callback payload parsing.

// crates.io
use percent_encoding::percent_decode_str;
// self
use crate::_prelude::*;

const TOKEN_MARKER: &str = "#token=";
const ERROR_MARKER: &str = "#error=";

/// Extracts the token carried by a successful login callback payload.
///
/// The token is everything after `#token=`, percent-decoded. Without a token, an `#error=`
/// fragment is surfaced as [`Error::Provider`]; a payload with neither marker fails with
/// [`Error::InvalidResponseFormat`].
pub fn parse_callback_payload(response_data: &str) -> Result<String> {
	if let Some(raw) = fragment_after(response_data, TOKEN_MARKER) {
		return Ok(decode(raw));
	}
	if let Some(raw) = fragment_after(response_data, ERROR_MARKER) {
		return Err(Error::Provider { message: decode(raw) });
	}

	Err(Error::InvalidResponseFormat)
}

fn fragment_after<'a>(haystack: &'a str, marker: &str) -> Option<&'a str> {
	haystack.find(marker).map(|idx| &haystack[idx + marker.len()..])
}

fn decode(raw: &str) -> String {
	percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
