//! Bridge-level error types shared across the login bridge and the request aggregator.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller misused a one-shot protocol (double start, completion without start, overflow).
	#[error(transparent)]
	InvalidOperation(#[from] InvalidOperation),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The user dismissed the interactive login.
	#[error("Authentication was cancelled by the user.")]
	Cancelled,
	/// The platform broker reported an HTTP-style failure.
	#[error("Authentication failed with HTTP response code {code}.")]
	Platform {
		/// Platform-supplied error code.
		code: u32,
	},
	/// The login endpoint redirected with an `#error=` fragment.
	#[error("Authentication provider reported an error: {message}.")]
	Provider {
		/// Decoded provider message.
		message: String,
	},
	/// The callback payload carried neither a token nor an error fragment.
	#[error("Invalid format of the authentication response.")]
	InvalidResponseFormat,
	/// The token string is not the JSON document the backend issues.
	#[error("Authentication token could not be parsed.")]
	TokenParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The completing side of a pending future went away without producing a result.
	#[error("The {what} was dropped before it produced a result.")]
	Abandoned {
		/// Label of the abandoned operation.
		what: &'static str,
	},
}

/// One-shot protocol violations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum InvalidOperation {
	/// A login is already awaiting its platform callback.
	#[error("Authentication is already in progress.")]
	LoginInProgress,
	/// A callback arrived while no login was pending.
	#[error("Authentication has not been started.")]
	LoginNotStarted,
	/// Every expected request has already been queued.
	#[error("The batch already holds all {expected} expected requests.")]
	BatchFull {
		/// Configured expected request count.
		expected: usize,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request or response construction failed.
	#[error(transparent)]
	Http(#[from] http::Error),
	/// A rewritten URL no longer parses.
	#[error("URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Query parameter names must not be empty.
	#[error("Query parameter name must not be empty.")]
	EmptyQueryParameterName,
	/// The aggregator must wait for at least one request.
	#[error("Expected request count must be greater than zero.")]
	ZeroExpectedCount,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<url::ParseError> for ConfigError {
	fn from(source: url::ParseError) -> Self {
		Self::InvalidUrl { source }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn platform_error_embeds_code() {
		let err = Error::Platform { code: 404 };

		assert_eq!(err.to_string(), "Authentication failed with HTTP response code 404.");
	}

	#[test]
	fn protocol_misuse_is_transparent() {
		let err: Error = InvalidOperation::LoginInProgress.into();

		assert!(matches!(err, Error::InvalidOperation(InvalidOperation::LoginInProgress)));
		assert_eq!(err.to_string(), "Authentication is already in progress.");
	}

	#[test]
	fn transport_error_keeps_source() {
		let io = std::io::Error::other("socket closed");
		let err: Error = TransportError::network(io).into();

		assert!(StdError::source(&err).is_some());
	}
}
