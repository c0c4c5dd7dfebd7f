//! Bearer-token attachment gate.
//!
//! [`TokenGate::intercept`] sits in front of a [`RequestHandler`]. When the configured policy asks
//! for a token it races an immediate read of the [`TokenSource`] against a bounded wait for
//! [`AuthEvent::TokenReceived`], attaches `Authorization: Bearer <token>` if a usable token came
//! out of that race, forwards the request exactly once, and routes any downstream failure
//! through the [`ResourceServerErrorHandler`].
//!
//! A non-zero wait bound relies on the Tokio timer, so interception must then run inside a Tokio
//! runtime with the time driver enabled. The default zero bound never touches the timer.

pub mod error_handler;

pub use error_handler::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AuthEvent, AuthEventStream, TokenHub, TokenSource},
	config::ResourceServerConfig,
	http::{InboundResponse, OutboundRequest, RequestHandler},
	obs::{self, AttachOutcome, GateSpan},
};

type UrlValidation = Arc<dyn Fn(&Url) -> bool + Send + Sync>;

/// Result of racing the immediate token read against the bounded wait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenResolution {
	/// The source already held a usable token.
	Immediate(AccessToken),
	/// A usable token was read after the wait ended.
	Awaited(AccessToken),
	/// No usable token was available.
	Missing,
}
impl TokenResolution {
	/// Borrows the resolved token, if any.
	pub fn token(&self) -> Option<&AccessToken> {
		match self {
			Self::Immediate(token) | Self::Awaited(token) => Some(token),
			Self::Missing => None,
		}
	}

	/// Consumes the resolution, returning the token, if any.
	pub fn into_token(self) -> Option<AccessToken> {
		match self {
			Self::Immediate(token) | Self::Awaited(token) => Some(token),
			Self::Missing => None,
		}
	}

	/// Outcome label used for spans and metrics.
	pub const fn outcome(&self) -> AttachOutcome {
		match self {
			Self::Immediate(_) => AttachOutcome::Immediate,
			Self::Awaited(_) => AttachOutcome::Awaited,
			Self::Missing => AttachOutcome::Missing,
		}
	}
}

/// Decides, per outbound request, whether to wait for and attach a bearer token.
///
/// The gate owns no mutable state. The token source and event stream are shared, read-only
/// collaborators; requests are amended by copy.
#[derive(Clone)]
pub struct TokenGate {
	/// Accessor for the current access token.
	pub source: Arc<dyn TokenSource>,
	/// Stream announcing newly received tokens.
	pub events: Arc<dyn AuthEventStream>,
	/// Translator applied to every downstream failure.
	pub error_handler: Arc<dyn ResourceServerErrorHandler>,
	/// Attach policy, wait bound, and optional URL allow-list.
	pub config: ResourceServerConfig,
	url_validation: Option<UrlValidation>,
}
impl TokenGate {
	/// Creates a gate over separate token source and event stream collaborators.
	pub fn new(
		source: Arc<dyn TokenSource>,
		events: Arc<dyn AuthEventStream>,
		config: ResourceServerConfig,
	) -> Self {
		Self {
			source,
			events,
			error_handler: Arc::new(RethrowErrorHandler),
			config,
			url_validation: None,
		}
	}

	/// Creates a gate that reads from and waits on a single [`TokenHub`].
	pub fn from_hub(hub: TokenHub, config: ResourceServerConfig) -> Self {
		let hub = Arc::new(hub);

		Self::new(hub.clone(), hub, config)
	}

	/// Replaces the default [`RethrowErrorHandler`].
	pub fn with_error_handler(mut self, handler: impl ResourceServerErrorHandler) -> Self {
		self.error_handler = Arc::new(handler);

		self
	}

	/// Installs a custom URL predicate that takes precedence over the configured allow-list.
	pub fn with_url_validation(
		mut self,
		validate: impl 'static + Send + Sync + Fn(&Url) -> bool,
	) -> Self {
		self.url_validation = Some(Arc::new(validate));

		self
	}

	/// Returns `true` when `url` may carry the token.
	pub fn is_eligible(&self, url: &Url) -> bool {
		match &self.url_validation {
			Some(validate) => validate(url),
			None => self.config.allows(url),
		}
	}

	/// Intercepts `request`, attaching a bearer token when policy allows, and forwards it to
	/// `next` exactly once.
	pub async fn intercept<H>(&self, request: OutboundRequest, next: &H) -> Result<InboundResponse>
	where
		H: ?Sized + RequestHandler,
	{
		let span = GateSpan::new("intercept");
		let (request, outcome) = span.instrument(self.prepare(request)).await;

		span.record_outcome(outcome);
		obs::record_attach_outcome(outcome);

		span.instrument(self.forward(request, next)).await
	}

	/// Races an immediate token read against the bounded wait for
	/// [`AuthEvent::TokenReceived`].
	///
	/// Reaching the wait bound is not an error; the source is read once more and a still-absent
	/// token yields [`TokenResolution::Missing`].
	pub async fn resolve_token(&self) -> TokenResolution {
		// Subscribe before the first read so a token published in between still ends the wait.
		let mut subscription = self.events.subscribe();

		if let Some(token) = self.read_token() {
			return TokenResolution::Immediate(token);
		}

		let wait = self.config.wait_for_token();

		// A zero bound expires immediately; the re-read below follows either way.
		if !wait.is_zero() {
			let _ = tokio::time::timeout(wait, subscription.wait_for(AuthEvent::TokenReceived))
				.await;
		}

		drop(subscription);

		match self.read_token() {
			Some(token) => TokenResolution::Awaited(token),
			None => TokenResolution::Missing,
		}
	}

	async fn prepare(&self, request: OutboundRequest) -> (OutboundRequest, AttachOutcome) {
		if !self.config.send_access_token {
			return (request, AttachOutcome::Disabled);
		}
		if !self.is_eligible(request.url()) {
			return (request, AttachOutcome::Skipped);
		}

		let resolution = self.resolve_token().await;
		let outcome = resolution.outcome();

		match resolution.token().and_then(|token| request.with_bearer(token)) {
			Some(amended) => (amended, outcome),
			None => (request, AttachOutcome::Missing),
		}
	}

	async fn forward<H>(&self, request: OutboundRequest, next: &H) -> Result<InboundResponse>
	where
		H: ?Sized + RequestHandler,
	{
		match next.handle(request).await {
			Ok(response) => Ok(response),
			Err(e) => {
				obs::record_downstream_failure();

				self.error_handler.handle_error(e)
			},
		}
	}

	fn read_token(&self) -> Option<AccessToken> {
		AccessToken::usable(self.source.access_token())
			.filter(|token| token.bearer_header().is_some())
	}
}
impl Debug for TokenGate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGate")
			.field("config", &self.config)
			.field("url_validation_set", &self.url_validation.is_some())
			.finish()
	}
}
