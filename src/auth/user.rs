//! Signed-in user model parsed from the login token.

// self
use crate::_prelude::*;

/// Redacted authentication token wrapper keeping the secret out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);
impl AuthToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for AuthToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AuthToken").field(&"<redacted>").finish()
	}
}
impl Display for AuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// User identity issued by the mobile backend after an interactive login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
	/// Backend user identifier (for example `Google:1234`).
	pub user_id: String,
	/// Token attached to subsequent backend requests.
	pub authentication_token: AuthToken,
}
impl AuthenticatedUser {
	/// Parses the JSON document carried in the `#token=` fragment.
	///
	/// The expected shape is `{"user":{"userId":".."},"authenticationToken":".."}`.
	pub fn from_token(token: &str) -> Result<Self> {
		let mut de = serde_json::Deserializer::from_str(token);
		let wire: WireToken = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| Error::TokenParse { source })?;

		Ok(Self { user_id: wire.user.user_id, authentication_token: wire.authentication_token })
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireToken {
	user: WireUser,
	authentication_token: AuthToken,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
	user_id: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_formatters_redact() {
		let token = AuthToken::new("super-secret");

		assert_eq!(format!("{token:?}"), "AuthToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
	}

	#[test]
	fn parses_backend_token_document() {
		let user = AuthenticatedUser::from_token(
			r#"{"user":{"userId":"Google:1234"},"authenticationToken":"eyJ0eXAi"}"#,
		)
		.expect("Backend token document should parse.");

		assert_eq!(user.user_id, "Google:1234");
		assert_eq!(user.authentication_token.expose(), "eyJ0eXAi");
	}

	#[test]
	fn parse_errors_carry_the_failing_path() {
		let err = AuthenticatedUser::from_token(r#"{"user":{},"authenticationToken":"t"}"#)
			.expect_err("Missing user id should fail.");

		match err {
			Error::TokenParse { source } => assert!(source.inner().to_string().contains("userId")),
			other => panic!("Unexpected error: {other:?}"),
		}
	}
}
