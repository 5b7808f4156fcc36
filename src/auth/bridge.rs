//! Interactive login bridge between a platform broker callback and an awaiting caller.
//!
//! At most one login may await its callback per [`InteractiveAuthBridge`]. Starting a second
//! login fails with [`InvalidOperation::LoginInProgress`] instead of queuing or cancelling
//! the first. There is no timeout: an abandoned login stays pending until a callback
//! arrives.

// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	auth::{WebAuthBroker, WebAuthRequest, WebAuthResult, WebAuthStatus, query, token},
	error::InvalidOperation,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

type LoginOutcome = Result<String>;

/// Query parameter carrying the registered callback URI for single sign-on logins.
pub const DEFAULT_SSO_QUERY_PARAMETER: &str = "sso_end_uri";

/// A single interactive login attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginRequest {
	/// Backend login page for the chosen identity provider.
	pub start_url: Url,
	/// Page the backend redirects to once the login finishes.
	pub end_url: Url,
	/// Reuse the platform-registered callback URI instead of `end_url`.
	pub use_single_sign_on: bool,
}
impl LoginRequest {
	/// Creates a standard (non-SSO) login request.
	pub fn new(start_url: Url, end_url: Url) -> Self {
		Self { start_url, end_url, use_single_sign_on: false }
	}

	/// Toggles the single sign-on variant.
	pub fn with_single_sign_on(mut self, enabled: bool) -> Self {
		self.use_single_sign_on = enabled;

		self
	}
}

/// Bridge-level knobs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginConfig {
	/// Name of the query parameter that forwards the callback URI in SSO mode.
	pub sso_query_parameter: String,
}
impl LoginConfig {
	/// Overrides the SSO query parameter name.
	pub fn with_sso_query_parameter(mut self, name: impl Into<String>) -> Self {
		self.sso_query_parameter = name.into();

		self
	}
}
impl Default for LoginConfig {
	fn default() -> Self {
		Self { sso_query_parameter: DEFAULT_SSO_QUERY_PARAMETER.into() }
	}
}

/// Drives interactive logins through a [`WebAuthBroker`].
///
/// The bridge is an ordinary value owned by the caller (typically the mobile client object),
/// so independent bridges can coexist in one process.
pub struct InteractiveAuthBridge<B>
where
	B: ?Sized + WebAuthBroker,
{
	broker: Arc<B>,
	config: LoginConfig,
	slot: Arc<LoginSlot>,
}
impl<B> InteractiveAuthBridge<B>
where
	B: ?Sized + WebAuthBroker,
{
	/// Creates an idle bridge over the provided broker.
	pub fn new(broker: Arc<B>) -> Self {
		Self { broker, config: LoginConfig::default(), slot: Default::default() }
	}

	/// Replaces the bridge configuration.
	pub fn with_config(mut self, config: LoginConfig) -> Self {
		self.config = config;

		self
	}

	/// Returns `true` while a login awaits its platform callback.
	pub fn is_pending(&self) -> bool {
		self.slot.state.lock().pending.is_some()
	}

	/// Starts an interactive login and returns the future that resolves with its token.
	///
	/// Fails with [`InvalidOperation::LoginInProgress`] when another login is pending; the
	/// pending login is left untouched. When the broker refuses to start, the pending state
	/// is cleared and the broker's error is returned.
	pub fn start_login(&self, request: LoginRequest) -> Result<PendingLogin> {
		let _guard = OpSpan::new(OpKind::Login, "start_login").entered();

		obs::record_op_outcome(OpKind::Login, OpOutcome::Attempt);

		let (attempt, receiver) = self.slot.begin().inspect_err(|_| {
			obs::record_op_outcome(OpKind::Login, OpOutcome::Failure);
		})?;
		let started = self.web_request(request).and_then(|web_request| {
			let callback = LoginCallback { slot: self.slot.clone(), attempt };

			self.broker.authenticate(web_request, callback)
		});

		if let Err(e) = started {
			self.slot.abort(attempt);
			obs::record_op_outcome(OpKind::Login, OpOutcome::Failure);
			obs::trace_warn!(error = %e, "Broker refused to start the login.");

			return Err(e);
		}

		obs::trace_debug!(attempt, "Login awaiting platform callback.");

		Ok(PendingLogin { receiver })
	}

	/// Starts a login and waits for its callback.
	pub async fn login(&self, request: LoginRequest) -> Result<String> {
		let pending = self.start_login(request)?;

		OpSpan::new(OpKind::Login, "await_callback").instrument(pending).await
	}

	/// Delivers the platform callback for the pending login.
	///
	/// Fails with [`InvalidOperation::LoginNotStarted`] when nothing is pending. The pending
	/// state is cleared before the outcome reaches the waiter.
	pub fn complete_login(&self, result: WebAuthResult) -> Result<()> {
		self.slot.complete(None, result)
	}

	fn web_request(&self, request: LoginRequest) -> Result<WebAuthRequest> {
		let LoginRequest { start_url, end_url, use_single_sign_on } = request;

		if use_single_sign_on {
			let callback_uri = self.broker.callback_uri()?;
			let start_url = query::append_query_parameter(
				&start_url,
				&self.config.sso_query_parameter,
				callback_uri.as_str(),
			)?;

			Ok(WebAuthRequest { start_url, end_url: None })
		} else {
			Ok(WebAuthRequest { start_url, end_url: Some(end_url) })
		}
	}
}
impl<B> Debug for InteractiveAuthBridge<B>
where
	B: ?Sized + WebAuthBroker,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("InteractiveAuthBridge")
			.field("config", &self.config)
			.field("pending", &self.is_pending())
			.finish()
	}
}

/// Completion handle handed to the broker for one login attempt.
///
/// Consuming the handle guarantees a single delivery. A handle whose attempt has already
/// been completed through [`InteractiveAuthBridge::complete_login`] reports
/// [`InvalidOperation::LoginNotStarted`] instead of touching a newer login.
pub struct LoginCallback {
	slot: Arc<LoginSlot>,
	attempt: u64,
}
impl LoginCallback {
	/// Delivers the platform outcome for this attempt.
	pub fn complete(self, result: WebAuthResult) -> Result<()> {
		self.slot.complete(Some(self.attempt), result)
	}
}
impl Debug for LoginCallback {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginCallback").field("attempt", &self.attempt).finish()
	}
}

/// Future returned by [`InteractiveAuthBridge::start_login`].
///
/// Resolves once the platform callback arrives, with the decoded token or the login error.
#[derive(Debug)]
pub struct PendingLogin {
	receiver: oneshot::Receiver<LoginOutcome>,
}
impl Future for PendingLogin {
	type Output = LoginOutcome;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.receiver).poll(cx).map(|received| match received {
			Ok(outcome) => outcome,
			Err(_) => Err(Error::Abandoned { what: "login" }),
		})
	}
}

#[derive(Default)]
struct LoginSlot {
	state: Mutex<SlotState>,
}
impl LoginSlot {
	fn begin(&self) -> Result<(u64, oneshot::Receiver<LoginOutcome>)> {
		let mut state = self.state.lock();

		if state.pending.is_some() {
			return Err(InvalidOperation::LoginInProgress.into());
		}

		let (sender, receiver) = oneshot::channel();
		let attempt = state.next_attempt;

		state.next_attempt += 1;
		state.pending = Some(PendingAttempt { attempt, sender });

		Ok((attempt, receiver))
	}

	fn abort(&self, attempt: u64) {
		let mut state = self.state.lock();

		if state.pending.as_ref().is_some_and(|p| p.attempt == attempt) {
			state.pending = None;
		}
	}

	fn complete(&self, attempt: Option<u64>, result: WebAuthResult) -> Result<()> {
		let pending = {
			let mut state = self.state.lock();
			let stale = matches!(
				(state.pending.as_ref(), attempt),
				(Some(p), Some(expected)) if p.attempt != expected
			);

			if stale { None } else { state.pending.take() }
		};
		let Some(PendingAttempt { sender, .. }) = pending else {
			return Err(InvalidOperation::LoginNotStarted.into());
		};
		let outcome = login_outcome(result);

		obs::record_op_outcome(OpKind::Login, OpOutcome::of(&outcome));

		if sender.send(outcome).is_err() {
			obs::trace_debug!("Login completed after its waiter was dropped.");
		}

		Ok(())
	}
}

#[derive(Default)]
struct SlotState {
	pending: Option<PendingAttempt>,
	next_attempt: u64,
}

struct PendingAttempt {
	attempt: u64,
	sender: oneshot::Sender<LoginOutcome>,
}

fn login_outcome(result: WebAuthResult) -> LoginOutcome {
	match result.status {
		WebAuthStatus::Success => token::parse_callback_payload(&result.response_data),
		WebAuthStatus::UserCancel => Err(Error::Cancelled),
		WebAuthStatus::ErrorHttp(code) => Err(Error::Platform { code }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::RecordingBroker;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	fn request() -> LoginRequest {
		LoginRequest::new(
			url("https://app.example.com/login/google"),
			url("https://app.example.com/login/done"),
		)
	}

	#[tokio::test]
	async fn standard_login_passes_end_url_and_resolves_token() {
		let broker = Arc::new(RecordingBroker::default());
		let bridge = InteractiveAuthBridge::new(broker.clone());
		let pending = bridge.start_login(request()).expect("Login should start.");

		assert!(bridge.is_pending());
		assert_eq!(
			broker.requests(),
			vec![WebAuthRequest {
				start_url: url("https://app.example.com/login/google"),
				end_url: Some(url("https://app.example.com/login/done")),
			}]
		);

		broker
			.take_callback()
			.expect("Broker should hold the callback.")
			.complete(WebAuthResult::success("https://app.example.com/login/done#token=abc%20def"))
			.expect("Callback should complete the pending login.");

		assert!(!bridge.is_pending());
		assert_eq!(pending.await.expect("Login should resolve."), "abc def");
	}

	#[test]
	fn single_sign_on_forwards_callback_uri() {
		let broker = Arc::new(RecordingBroker::default());
		let bridge = InteractiveAuthBridge::new(broker.clone());
		let _pending = bridge
			.start_login(request().with_single_sign_on(true))
			.expect("SSO login should start.");
		let requests = broker.requests();

		assert_eq!(requests.len(), 1);
		assert_eq!(requests[0].end_url, None);
		assert_eq!(
			requests[0].start_url.as_str(),
			"https://app.example.com/login/google?sso_end_uri=ms-app%3A%2F%2Fs-1-15-2-test%2F"
		);
	}

	#[test]
	fn sso_parameter_name_is_configurable() {
		let broker = Arc::new(RecordingBroker::default());
		let bridge = InteractiveAuthBridge::new(broker.clone())
			.with_config(LoginConfig::default().with_sso_query_parameter("redirect"));
		let _pending = bridge
			.start_login(request().with_single_sign_on(true))
			.expect("SSO login should start.");

		assert!(broker.requests()[0].start_url.as_str().contains("?redirect=ms-app"));
	}

	#[tokio::test]
	async fn second_start_fails_without_disturbing_first() {
		let broker = Arc::new(RecordingBroker::default());
		let bridge = InteractiveAuthBridge::new(broker.clone());
		let first = bridge.start_login(request()).expect("First login should start.");
		let err = bridge.start_login(request()).expect_err("Second login should be rejected.");

		assert!(matches!(err, Error::InvalidOperation(InvalidOperation::LoginInProgress)));
		assert_eq!(broker.requests().len(), 1);

		bridge
			.complete_login(WebAuthResult::success("#token=first"))
			.expect("Completion should reach the first login.");

		assert_eq!(first.await.expect("First login should resolve."), "first");
	}

	#[test]
	fn completing_without_start_fails() {
		let bridge = InteractiveAuthBridge::new(Arc::new(RecordingBroker::default()));
		let err = bridge
			.complete_login(WebAuthResult::success("#token=abc"))
			.expect_err("Completion without a pending login should fail.");

		assert!(matches!(err, Error::InvalidOperation(InvalidOperation::LoginNotStarted)));
	}

	#[tokio::test]
	async fn cancellation_and_platform_errors_are_distinct() {
		let bridge = InteractiveAuthBridge::new(Arc::new(RecordingBroker::default()));
		let pending = bridge.start_login(request()).expect("Login should start.");

		bridge.complete_login(WebAuthResult::user_cancel()).expect("Cancellation should deliver.");

		let err = pending.await.expect_err("Cancelled login should fail.");

		assert!(matches!(err, Error::Cancelled));
		assert_eq!(err.to_string(), "Authentication was cancelled by the user.");

		let pending = bridge.start_login(request()).expect("Bridge should be idle again.");

		bridge.complete_login(WebAuthResult::error_http(503)).expect("Error should deliver.");

		let err = pending.await.expect_err("Platform error should fail.");

		assert!(matches!(err, Error::Platform { code: 503 }));
		assert!(err.to_string().contains("503"));
	}

	#[tokio::test]
	async fn stale_callback_cannot_complete_newer_login() {
		let broker = Arc::new(RecordingBroker::default());
		let bridge = InteractiveAuthBridge::new(broker.clone());
		let first = bridge.start_login(request()).expect("First login should start.");
		let stale = broker.take_callback().expect("Broker should hold the first callback.");

		bridge.complete_login(WebAuthResult::user_cancel()).expect("Direct completion works.");

		assert!(matches!(first.await, Err(Error::Cancelled)));

		let second = bridge.start_login(request()).expect("Second login should start.");
		let err = stale
			.complete(WebAuthResult::success("#token=stale"))
			.expect_err("Stale callback should be rejected.");

		assert!(matches!(err, Error::InvalidOperation(InvalidOperation::LoginNotStarted)));
		assert!(bridge.is_pending());

		broker
			.take_callback()
			.expect("Broker should hold the second callback.")
			.complete(WebAuthResult::success("#token=fresh"))
			.expect("Fresh callback should complete.");

		assert_eq!(second.await.expect("Second login should resolve."), "fresh");
	}

	#[test]
	fn broker_refusal_clears_pending_state() {
		let bridge = InteractiveAuthBridge::new(Arc::new(RecordingBroker::refusing()));
		let err = bridge.start_login(request()).expect_err("Refusing broker should fail.");

		assert!(matches!(err, Error::Platform { code: 500 }));
		assert!(!bridge.is_pending());
	}

	#[tokio::test]
	async fn dropped_bridge_abandons_waiter() {
		let broker = Arc::new(RecordingBroker::default());
		let bridge = InteractiveAuthBridge::new(broker.clone());
		let pending = bridge.start_login(request()).expect("Login should start.");

		drop(broker.take_callback());
		drop(bridge);

		assert!(matches!(pending.await, Err(Error::Abandoned { what: "login" })));
	}
}
