//! Request/response values and the next-stage handler contract.
//!
//! The gate never talks to a network stack directly. It amends an [`OutboundRequest`] and hands
//! it to a [`RequestHandler`], the next stage of whatever pipeline hosts it. Handlers report
//! success as an [`InboundResponse`] and every failure, including non-success statuses, as a
//! [`DownstreamError`].

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
	header::{AUTHORIZATION, RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, auth::AccessToken, error::DownstreamError};

/// Boxed future returned by [`RequestHandler::handle`].
pub type HandlerFuture<'a> =
	Pin<Box<dyn Future<Output = Result<InboundResponse, DownstreamError>> + 'a + Send>>;

/// Next stage of the request pipeline.
///
/// The gate calls [`handle`](RequestHandler::handle) exactly once per intercepted request.
pub trait RequestHandler
where
	Self: Send + Sync,
{
	/// Sends `request` onward and resolves with the downstream outcome.
	fn handle(&self, request: OutboundRequest) -> HandlerFuture<'_>;
}
impl<T> RequestHandler for Arc<T>
where
	T: ?Sized + RequestHandler,
{
	fn handle(&self, request: OutboundRequest) -> HandlerFuture<'_> {
		T::handle(self, request)
	}
}

/// Immutable description of an outbound call.
///
/// Amending methods return a modified copy and leave `self` untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundRequest {
	method: Method,
	url: Url,
	headers: HeaderMap,
	body: Option<Vec<u8>>,
}
impl OutboundRequest {
	/// Creates a request with no headers and no body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: None }
	}

	/// Shorthand for a `GET` request.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Returns a copy carrying `body`.
	pub fn with_body(&self, body: impl Into<Vec<u8>>) -> Self {
		Self { body: Some(body.into()), ..self.clone() }
	}

	/// Returns a copy with `name` set to `value`, replacing any previous values.
	pub fn with_header(&self, name: HeaderName, value: HeaderValue) -> Self {
		let mut headers = self.headers.clone();

		headers.insert(name, value);

		Self { headers, ..self.clone() }
	}

	/// Returns a copy carrying `Authorization: Bearer <token>`.
	///
	/// `None` when the token cannot be encoded as a header value.
	pub fn with_bearer(&self, token: &AccessToken) -> Option<Self> {
		token.bearer_header().map(|value| self.with_header(AUTHORIZATION, value))
	}

	/// HTTP method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Target URL.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Header map.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Request body, if any.
	pub fn body(&self) -> Option<&[u8]> {
		self.body.as_deref()
	}

	/// Value of the `Authorization` header, if present and visible ASCII.
	pub fn authorization(&self) -> Option<&str> {
		self.headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
	}
}

/// Successful downstream response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundResponse {
	/// HTTP status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl InboundResponse {
	/// Creates a response with empty headers.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}
}

/// Thin wrapper around [`ReqwestClient`] acting as the final pipeline stage.
///
/// Any non-success status is reported as [`DownstreamError::Status`] so the resource-server
/// error handler sees rejected credentials (HTTP 401) the same way it sees network failures.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHandler(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHandler {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a dedicated client that gives up on requests after `timeout`.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).build()?;

		Ok(Self(client))
	}

	async fn execute(&self, request: OutboundRequest) -> Result<InboundResponse, DownstreamError> {
		let OutboundRequest { method, url, headers, body } = request;
		let mut builder = self.0.request(method, url).headers(headers);

		if let Some(body) = body {
			builder = builder.body(body);
		}

		let response = builder.send().await.map_err(crate::error::TransportError::from)?;
		let status = response.status();
		let headers = response.headers().to_owned();
		let body = response.bytes().await.map_err(crate::error::TransportError::from)?.to_vec();

		if !status.is_success() {
			let retry_after = parse_retry_after(&headers);

			return Err(DownstreamError::status(status.as_u16(), retry_after, &body));
		}

		Ok(InboundResponse { status, headers, body })
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHandler {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHandler {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl RequestHandler for ReqwestHandler {
	fn handle(&self, request: OutboundRequest) -> HandlerFuture<'_> {
		Box::pin(self.execute(request))
	}
}

/// Reads a `Retry-After` header given either as delay seconds or as an RFC 2822 date.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn request() -> OutboundRequest {
		let url = Url::parse("https://api.example.com/orders").expect("URL should parse.");

		OutboundRequest::get(url)
	}

	#[test]
	fn with_bearer_leaves_original_untouched() {
		let original = request();
		let amended = original
			.with_bearer(&AccessToken::new("abc"))
			.expect("Plain token should form a header.");

		assert_eq!(amended.authorization(), Some("Bearer abc"));
		assert_eq!(original.authorization(), None);
		assert_eq!(amended.url(), original.url());
		assert_eq!(amended.method(), &Method::GET);
	}

	#[test]
	fn with_header_replaces_existing_value() {
		let first = request().with_header(AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
		let second = first.with_bearer(&AccessToken::new("abc")).expect("Header should build.");

		assert_eq!(second.headers().get_all(AUTHORIZATION).iter().count(), 1);
		assert_eq!(second.authorization(), Some("Bearer abc"));
		assert_eq!(first.authorization(), Some("Basic xyz"));
	}

	#[test]
	fn with_body_keeps_headers() {
		let amended = request()
			.with_header(HeaderName::from_static("x-trace"), HeaderValue::from_static("1"))
			.with_body("payload");

		assert_eq!(amended.body(), Some(&b"payload"[..]));
		assert!(amended.headers().contains_key("x-trace"));
	}

	#[test]
	fn retry_after_accepts_seconds_and_ignores_garbage() {
		let mut headers = HeaderMap::new();

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(120)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("later"));

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Mon, 01 Jan 2001 00:00:00 +0000"));

		assert_eq!(parse_retry_after(&headers), None);
	}
}
