//! Queued request/response pairs held by the aggregator.

// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	http::{HttpRequest, HttpResponse},
};

type ResponseOutcome = Result<HttpResponse>;

/// An intercepted request tagged with its interception position.
///
/// The position is the request's index in the batch and is what a multipart encoder uses to
/// order parts.
#[derive(Debug)]
pub struct QueuedRequest {
	position: usize,
	request: HttpRequest,
}
impl QueuedRequest {
	pub(crate) fn new(position: usize, request: HttpRequest) -> Self {
		Self { position, request }
	}

	/// Zero-based interception position.
	pub fn position(&self) -> usize {
		self.position
	}

	/// Borrows the wrapped request.
	pub fn request(&self) -> &HttpRequest {
		&self.request
	}

	/// Unwraps the request.
	pub fn into_inner(self) -> HttpRequest {
		self.request
	}
}

/// Fulfils the [`PendingResponse`] of one intercepted request.
#[derive(Debug)]
pub struct ResponseResponder {
	position: usize,
	sender: oneshot::Sender<ResponseOutcome>,
}
impl ResponseResponder {
	/// Zero-based interception position of the request this responder answers.
	pub fn position(&self) -> usize {
		self.position
	}

	/// Resolves the pending response with `outcome`.
	///
	/// Returns `false` when the waiter has already gone away.
	pub fn complete(self, outcome: ResponseOutcome) -> bool {
		self.sender.send(outcome).is_ok()
	}

	/// Resolves the pending response successfully.
	pub fn respond(self, response: HttpResponse) -> bool {
		self.complete(Ok(response))
	}

	/// Fails the pending response.
	pub fn fail(self, error: Error) -> bool {
		self.complete(Err(error))
	}
}

/// Future handed back for every intercepted request.
#[derive(Debug)]
pub struct PendingResponse {
	receiver: oneshot::Receiver<ResponseOutcome>,
}
impl Future for PendingResponse {
	type Output = ResponseOutcome;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.receiver).poll(cx).map(|received| match received {
			Ok(outcome) => outcome,
			Err(_) => Err(Error::Abandoned { what: "batched request" }),
		})
	}
}

/// A drained request with the responder for its pending response.
#[derive(Debug)]
pub struct QueuedExchange {
	/// The intercepted request.
	pub request: QueuedRequest,
	/// Responder resolving the caller's [`PendingResponse`].
	pub responder: ResponseResponder,
}

pub(crate) fn pending_pair(position: usize) -> (ResponseResponder, PendingResponse) {
	let (sender, receiver) = oneshot::channel();

	(ResponseResponder { position, sender }, PendingResponse { receiver })
}
