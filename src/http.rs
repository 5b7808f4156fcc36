//! HTTP pipeline primitives.
//!
//! The module exposes [`HttpHandler`], the contract every stage of an outgoing request
//! pipeline implements. Stages either answer a request themselves (the
//! [`RequestAggregator`](crate::batch::RequestAggregator) defers the answer until an external
//! collaborator supplies it) or hand it to a terminal transport such as [`ReqwestHandler`].

// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::{ConfigError, TransportError};

/// Outgoing request as seen by pipeline handlers.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Response produced for an [`HttpRequest`].
pub type HttpResponse = http::Response<Vec<u8>>;

/// Boxed future returned by [`HttpHandler::send`].
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse>> + 'a + Send>>;

/// A stage of the outgoing request pipeline.
///
/// Handlers receive each request before it leaves the process and are responsible for
/// supplying its eventual response. Implementations must be `Send + Sync` so a pipeline can
/// be shared behind an [`Arc`].
pub trait HttpHandler
where
	Self: Send + Sync,
{
	/// Sends `request` and resolves with its response.
	fn send(&self, request: HttpRequest) -> HandlerFuture<'_>;
}
impl<H> HttpHandler for Arc<H>
where
	H: ?Sized + HttpHandler,
{
	fn send(&self, request: HttpRequest) -> HandlerFuture<'_> {
		(**self).send(request)
	}
}

/// Terminal handler backed by [`ReqwestClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHandler(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHandler {
	/// Builds the wrapped client from a configured reqwest builder.
	pub fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self> {
		let client = builder.build().map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
		let request = reqwest::Request::try_from(request).map_err(TransportError::from)?;
		let response = self.0.execute(request).await.map_err(TransportError::from)?;
		let status = response.status();
		let version = response.version();
		let headers = response.headers().to_owned();
		let body = response.bytes().await.map_err(TransportError::from)?.to_vec();
		let mut response_new = http::Response::builder()
			.status(status)
			.version(version)
			.body(body)
			.map_err(ConfigError::from)?;

		*response_new.headers_mut() = headers;

		Ok(response_new)
	}
}
#[cfg(feature = "reqwest")]
impl HttpHandler for ReqwestHandler {
	fn send(&self, request: HttpRequest) -> HandlerFuture<'_> {
		Box::pin(self.execute(request))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	struct Echo;
	impl HttpHandler for Echo {
		fn send(&self, request: HttpRequest) -> HandlerFuture<'_> {
			Box::pin(async move {
				let body = request.into_body();

				Ok::<_, Error>(
					http::Response::builder()
						.status(200)
						.body(body)
						.expect("Echo response should build."),
				)
			})
		}
	}

	#[tokio::test]
	async fn shared_handlers_delegate() {
		let handler: Arc<dyn HttpHandler> = Arc::new(Echo);
		let request = http::Request::builder()
			.uri("https://app.example.com/tables/items")
			.body(b"payload".to_vec())
			.expect("Request fixture should build.");
		let response = handler.send(request).await.expect("Echo handler should respond.");

		assert_eq!(response.status(), 200);
		assert_eq!(response.body(), b"payload");
	}
}
