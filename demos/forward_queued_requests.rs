//! Queues a couple of table operations behind a [`RequestAggregator`] and forwards them one by
//! one once the batch is complete.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use mobile_backend_bridge::{
	batch::RequestAggregator,
	http::{HttpHandler, ReqwestHandler},
	reqwest::Client as ReqwestClient,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let aggregator = Arc::new(RequestAggregator::new(2)?);
	let mut callers = Vec::new();

	for path in ["/tables/todo?$top=1", "/tables/todo?$skip=1&$top=1"] {
		let aggregator = aggregator.clone();
		let request = http::Request::builder()
			.uri(format!("https://demo-backend.example.com{path}"))
			.body(Vec::new())?;

		callers.push(tokio::spawn(async move { aggregator.send(request).await }));
	}

	aggregator.wait_until_all_queued().await;

	println!("Batch complete with {} requests.", aggregator.queued_len());

	let transport = ReqwestHandler::from_builder(
		ReqwestClient::builder().user_agent("mobile-backend-bridge-demo/0.1"),
	)?;
	let forwarded = aggregator.flush_individually(&transport).await;

	println!("Forwarded {forwarded} requests.");

	for caller in callers {
		match caller.await? {
			Ok(response) => println!("{} ({} bytes).", response.status(), response.body().len()),
			Err(e) => println!("Request failed: {e}."),
		}
	}

	Ok(())
}
