//! Request aggregation for batched flushes of the offline queue.
//!
//! [`RequestAggregator`] sits in the outgoing HTTP pipeline, answers every intercepted
//! request with a [`PendingResponse`], and raises a one-shot ready signal once the configured
//! number of requests has been collected. It never sends anything itself: an external
//! collaborator drains the queue, transmits it, and resolves each responder.

pub mod exchange;

pub use exchange::*;

// crates.io
use tokio::sync::watch;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, InvalidOperation},
	http::{HandlerFuture, HttpHandler, HttpRequest, HttpResponse},
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Collects a fixed number of outgoing requests for a single batch.
pub struct RequestAggregator {
	expected: usize,
	queue: Mutex<BatchQueue>,
	ready: watch::Sender<bool>,
}
impl RequestAggregator {
	/// Creates an aggregator that signals readiness after `expected_count` interceptions.
	pub fn new(expected_count: usize) -> Result<Self> {
		if expected_count == 0 {
			return Err(ConfigError::ZeroExpectedCount.into());
		}

		let (ready, _) = watch::channel(false);

		Ok(Self { expected: expected_count, queue: Default::default(), ready })
	}

	/// Configured number of requests that completes the batch.
	pub fn expected_count(&self) -> usize {
		self.expected
	}

	/// Number of requests intercepted so far, drained ones included.
	pub fn queued_len(&self) -> usize {
		self.queue.lock().intercepted
	}

	/// Returns `true` once every expected request has been intercepted.
	pub fn is_ready(&self) -> bool {
		*self.ready.borrow()
	}

	/// Queues `request` and returns the handle its response will arrive on.
	///
	/// The interception that reaches the expected count fires the ready signal. Any further
	/// interception fails with [`InvalidOperation::BatchFull`].
	pub fn intercept(&self, request: HttpRequest) -> Result<PendingResponse> {
		let _guard = OpSpan::new(OpKind::Batch, "intercept").entered();
		let mut queue = self.queue.lock();

		if queue.intercepted >= self.expected {
			obs::record_op_outcome(OpKind::Batch, OpOutcome::Failure);

			return Err(InvalidOperation::BatchFull { expected: self.expected }.into());
		}

		let position = queue.intercepted;
		let (responder, pending) = exchange::pending_pair(position);

		queue.intercepted += 1;
		queue.requests.push(QueuedRequest::new(position, request));
		queue.responders.push(responder);

		let all_queued = queue.intercepted == self.expected;

		drop(queue);

		obs::record_op_outcome(OpKind::Batch, OpOutcome::Attempt);

		if all_queued {
			self.ready.send_replace(true);
			obs::record_op_outcome(OpKind::Batch, OpOutcome::Success);
			obs::trace_debug!(expected = self.expected, "All batch requests queued.");
		}

		Ok(pending)
	}

	/// Waits until every expected request has been intercepted.
	///
	/// May be called any number of times, before or after the signal fires.
	pub async fn wait_until_all_queued(&self) -> bool {
		let mut ready = self.ready.subscribe();

		OpSpan::new(OpKind::Batch, "wait_until_all_queued")
			.instrument(ready.wait_for(|all_queued| *all_queued))
			.await
			.is_ok()
	}

	async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse> {
		self.intercept(request)?.await
	}

	/// Takes every queued request together with its responder, in interception order.
	pub fn drain(&self) -> Vec<QueuedExchange> {
		let mut queue = self.queue.lock();
		let requests = std::mem::take(&mut queue.requests);
		let responders = std::mem::take(&mut queue.responders);

		requests
			.into_iter()
			.zip(responders)
			.map(|(request, responder)| QueuedExchange { request, responder })
			.collect()
	}

	/// Sends every queued request through `inner`, one at a time in interception order, and
	/// resolves each pending response with its own outcome.
	///
	/// This is a per-request fallback for transports without a batch endpoint; a failure only
	/// fails the affected request. Returns the number of forwarded requests.
	pub async fn flush_individually<H>(&self, inner: &H) -> usize
	where
		H: ?Sized + HttpHandler,
	{
		let exchanges = self.drain();
		let forwarded = exchanges.len();
		let span = OpSpan::new(OpKind::Batch, "flush_individually");

		span.instrument(async {
			for QueuedExchange { request, responder } in exchanges {
				let outcome = inner.send(request.into_inner()).await;

				if !responder.complete(outcome) {
					obs::trace_debug!("Dropped response for an abandoned batched request.");
				}
			}
		})
		.await;

		forwarded
	}
}
impl HttpHandler for RequestAggregator {
	fn send(&self, request: HttpRequest) -> HandlerFuture<'_> {
		Box::pin(self.dispatch(request))
	}
}
impl Debug for RequestAggregator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestAggregator")
			.field("expected", &self.expected)
			.field("queued", &self.queued_len())
			.field("ready", &self.is_ready())
			.finish()
	}
}

#[derive(Default)]
struct BatchQueue {
	requests: Vec<QueuedRequest>,
	responders: Vec<ResponseResponder>,
	intercepted: usize,
}
