//! Mobile backend client bridges: batch-ready request aggregation for offline queue flushes and
//! an interactive login bridge that turns a platform browser callback into a one-shot future.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod batch;
pub mod error;
pub mod http;
pub mod obs;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{LoginCallback, WebAuthBroker, WebAuthRequest},
		error::ConfigError,
	};

	/// Builds a reqwest handler that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_handler() -> crate::http::ReqwestHandler {
		test_reqwest_handler_with(ReqwestClient::builder())
	}

	/// Like [`test_reqwest_handler`], starting from a caller-configured builder.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_handler_with(builder: reqwest::ClientBuilder) -> crate::http::ReqwestHandler {
		crate::http::ReqwestHandler::from_builder(
			builder.danger_accept_invalid_certs(true).danger_accept_invalid_hostnames(true),
		)
		.expect("Failed to build insecure Reqwest handler for tests.")
	}

	/// Callback URI reported by [`RecordingBroker`].
	pub const TEST_CALLBACK_URI: &str = "ms-app://s-1-15-2-test/";

	/// In-process [`WebAuthBroker`] that records every request and parks the latest callback so
	/// tests can complete logins by hand.
	#[derive(Debug, Default)]
	pub struct RecordingBroker {
		requests: Mutex<Vec<WebAuthRequest>>,
		callback: Mutex<Option<LoginCallback>>,
		refuse: bool,
	}
	impl RecordingBroker {
		/// Broker whose `authenticate` always fails with a platform error (code 500).
		pub fn refusing() -> Self {
			Self { refuse: true, ..Default::default() }
		}

		/// Requests received so far, oldest first.
		pub fn requests(&self) -> Vec<WebAuthRequest> {
			self.requests.lock().clone()
		}

		/// Takes the callback of the most recent login.
		pub fn take_callback(&self) -> Option<LoginCallback> {
			self.callback.lock().take()
		}
	}
	impl WebAuthBroker for RecordingBroker {
		fn authenticate(&self, request: WebAuthRequest, callback: LoginCallback) -> Result<()> {
			if self.refuse {
				return Err(Error::Platform { code: 500 });
			}

			self.requests.lock().push(request);
			*self.callback.lock() = Some(callback);

			Ok(())
		}

		fn callback_uri(&self) -> Result<Url> {
			Url::parse(TEST_CALLBACK_URI).map_err(|e| ConfigError::from(e).into())
		}
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		task::{Context, Poll},
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
