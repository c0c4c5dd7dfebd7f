//! Demonstrates the gate waiting for a login to publish a token, then attaching it to a request
//! sent through the default reqwest handler.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use oauth2_interceptor::{
	auth::TokenHub,
	config::ResourceServerConfig,
	http::{OutboundRequest, ReqwestHandler},
	interceptor::TokenGate,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let orders_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/orders").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body("[\"A-1\"]");
		})
		.await;
	let hub = TokenHub::default();
	let config = ResourceServerConfig::from_json_str(
		r#"{ "send_access_token": true, "wait_for_token_ms": 2000 }"#,
	)?;
	let gate = TokenGate::from_hub(hub.clone(), config);
	let login = tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(100)).await;

		hub.set_access_token("demo-access");
	});
	let request = OutboundRequest::get(Url::parse(&server.url("/orders"))?);
	let response = gate.intercept(request, &ReqwestHandler::default()).await?;

	login.await?;

	println!(
		"Resource server answered {}: {}.",
		response.status,
		String::from_utf8_lossy(&response.body)
	);

	orders_mock.assert_async().await;

	Ok(())
}
