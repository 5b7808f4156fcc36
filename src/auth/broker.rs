//! Platform web-authentication broker contract.
//!
//! The bridge never drives a browser itself. Platforms plug in a [`WebAuthBroker`] that opens
//! the login page, watches for the end URL, and reports the outcome through the
//! [`LoginCallback`] handed to [`WebAuthBroker::authenticate`].

// self
use crate::{_prelude::*, auth::LoginCallback};

/// Platform facility that runs an interactive browser login.
pub trait WebAuthBroker
where
	Self: Send + Sync,
{
	/// Begins interactive browser authentication at `request.start_url`.
	///
	/// The broker must eventually invoke `callback` exactly once. Returning an error means
	/// the flow never started and the callback will not be used.
	fn authenticate(&self, request: WebAuthRequest, callback: LoginCallback) -> Result<()>;

	/// Returns the callback URI currently registered for this application.
	fn callback_uri(&self) -> Result<Url>;
}
/// Arguments passed to [`WebAuthBroker::authenticate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebAuthRequest {
	/// Page the browser opens first.
	pub start_url: Url,
	/// URL whose navigation ends the flow; `None` lets the broker fall back to its registered
	/// callback URI (single sign-on).
	pub end_url: Option<Url>,
}

/// Completion status reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WebAuthStatus {
	/// The browser reached the end URL.
	Success,
	/// The user dismissed the login surface.
	UserCancel,
	/// Navigation failed with an HTTP-style error code.
	ErrorHttp(u32),
}

/// Outcome delivered to the bridge by the platform callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebAuthResult {
	/// Completion status.
	pub status: WebAuthStatus,
	/// Opaque response payload, typically the final URL including its fragment.
	pub response_data: String,
}
impl WebAuthResult {
	/// Successful completion carrying the final payload.
	pub fn success(response_data: impl Into<String>) -> Self {
		Self { status: WebAuthStatus::Success, response_data: response_data.into() }
	}

	/// User-initiated cancellation.
	pub fn user_cancel() -> Self {
		Self { status: WebAuthStatus::UserCancel, response_data: String::new() }
	}

	/// Platform error with the supplied code.
	pub fn error_http(code: u32) -> Self {
		Self { status: WebAuthStatus::ErrorHttp(code), response_data: String::new() }
	}
}
