//! Walks through an interactive login against a console "broker" that plays the platform's
//! role by completing the callback with a canned redirect.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use mobile_backend_bridge::{
	auth::{
		AuthenticatedUser, InteractiveAuthBridge, LoginCallback, LoginRequest, WebAuthBroker,
		WebAuthRequest, WebAuthResult,
	},
	error::ConfigError,
};

struct ConsoleBroker;
impl WebAuthBroker for ConsoleBroker {
	fn authenticate(
		&self,
		request: WebAuthRequest,
		callback: LoginCallback,
	) -> mobile_backend_bridge::error::Result<()> {
		println!("Open {} in a browser.", request.start_url);

		match &request.end_url {
			Some(end_url) => println!("Waiting for navigation to {end_url}."),
			None => println!("Waiting for the registered callback URI."),
		}

		let redirect = "https://demo-backend.example.com/login/done#token=%7B%22user%22%3A%7B%22userId%22%3A%22MicrosoftAccount%3A7f3a%22%7D%2C%22authenticationToken%22%3A%22demo-token%22%7D";

		callback.complete(WebAuthResult::success(redirect))
	}

	fn callback_uri(&self) -> mobile_backend_bridge::error::Result<Url> {
		Url::parse("ms-app://s-1-15-2-demo/").map_err(|e| ConfigError::from(e).into())
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let bridge = InteractiveAuthBridge::new(Arc::new(ConsoleBroker));
	let request = LoginRequest::new(
		Url::parse("https://demo-backend.example.com/login/microsoftaccount")?,
		Url::parse("https://demo-backend.example.com/login/done")?,
	)
	.with_single_sign_on(true);
	let token = bridge.login(request).await?;
	let user = AuthenticatedUser::from_token(&token)?;

	println!("Signed in as {} with token {}.", user.user_id, user.authentication_token);

	Ok(())
}
