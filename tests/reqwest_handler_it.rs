#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_interceptor::{
	auth::TokenHub,
	config::ResourceServerConfig,
	error::{DownstreamError, Error},
	http::{OutboundRequest, ReqwestHandler},
	interceptor::TokenGate,
	url::Url,
};

fn orders_request(server: &MockServer) -> OutboundRequest {
	OutboundRequest::get(
		Url::parse(&server.url("/orders")).expect("Mock resource URL should parse successfully."),
	)
}

fn attaching_gate(hub: TokenHub) -> TokenGate {
	TokenGate::from_hub(hub, ResourceServerConfig::default().with_send_access_token(true))
}

#[tokio::test]
async fn bearer_header_reaches_resource_server() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/orders").header("authorization", "Bearer abc");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let hub = TokenHub::default();

	hub.set_access_token("abc");

	let response = attaching_gate(hub)
		.intercept(orders_request(&server), &ReqwestHandler::default())
		.await
		.expect("Authorized request should succeed.");

	assert_eq!(response.status.as_u16(), 200);
	assert_eq!(response.body, b"[]");

	mock.assert_async().await;
}

#[tokio::test]
async fn post_body_is_forwarded() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/orders").body("{\"sku\":\"A-1\"}");
			then.status(201);
		})
		.await;
	let request = OutboundRequest::new(
		http::Method::POST,
		Url::parse(&server.url("/orders")).expect("Mock resource URL should parse successfully."),
	)
	.with_body("{\"sku\":\"A-1\"}");
	let handler = ReqwestHandler::with_timeout(std::time::Duration::from_secs(5))
		.expect("Timeout-bound reqwest client should build.");
	let response = attaching_gate(TokenHub::default())
		.intercept(request, &handler)
		.await
		.expect("Anonymous POST should succeed.");

	assert_eq!(response.status.as_u16(), 201);

	mock.assert_async().await;
}

#[tokio::test]
async fn unauthorized_status_surfaces_with_retry_hint() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/orders");
			then.status(401).header("retry-after", "30").body("token expired");
		})
		.await;
	let hub = TokenHub::default();

	hub.set_access_token("stale");

	let err = attaching_gate(hub)
		.intercept(orders_request(&server), &ReqwestHandler::default())
		.await
		.expect_err("HTTP 401 should be re-raised by the default handler.");

	match err {
		Error::Downstream(DownstreamError::Status { status, retry_after, body_preview }) => {
			assert_eq!(status, 401);
			assert_eq!(retry_after, Some(time::Duration::seconds(30)));
			assert_eq!(body_preview.as_deref(), Some("token expired"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	mock.assert_calls_async(1).await;
}
