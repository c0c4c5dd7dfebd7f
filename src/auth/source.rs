//! Token source contract plus the in-process [`TokenHub`].

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AuthEvent, AuthEventStream, AuthEventSubscription, AuthEvents},
};

/// Synchronous accessor for the currently known access token.
///
/// Implementations must not block; the gate calls this on the request path.
pub trait TokenSource
where
	Self: Send + Sync,
{
	/// Returns the current access token, if any.
	fn access_token(&self) -> Option<AccessToken>;
}
impl<T> TokenSource for Arc<T>
where
	T: ?Sized + TokenSource,
{
	fn access_token(&self) -> Option<AccessToken> {
		T::access_token(self)
	}
}

/// Shared holder for the current access token that announces every change on its own
/// [`AuthEvents`] stream.
///
/// Whatever drives the OAuth flow (a login callback, a refresh task) writes into the hub; the
/// gate reads from it through [`TokenSource`] and waits on it through [`AuthEventStream`].
#[derive(Clone, Default)]
pub struct TokenHub {
	token: Arc<RwLock<Option<AccessToken>>>,
	events: AuthEvents,
}
impl TokenHub {
	/// Creates a hub that publishes on the provided event stream.
	pub fn with_events(events: AuthEvents) -> Self {
		Self { token: Default::default(), events }
	}

	/// Stores a freshly obtained token and emits [`AuthEvent::TokenReceived`].
	pub fn set_access_token(&self, token: impl Into<AccessToken>) {
		self.replace(Some(token.into()), AuthEvent::TokenReceived);
	}

	/// Stores a refreshed token and emits [`AuthEvent::TokenRefreshed`].
	pub fn refresh_access_token(&self, token: impl Into<AccessToken>) {
		self.replace(Some(token.into()), AuthEvent::TokenRefreshed);
	}

	/// Drops the current token and emits `reason` (for example [`AuthEvent::Logout`]).
	pub fn clear(&self, reason: AuthEvent) {
		self.replace(None, reason);
	}

	/// Event stream the hub publishes on.
	pub fn events(&self) -> &AuthEvents {
		&self.events
	}

	fn replace(&self, token: Option<AccessToken>, event: AuthEvent) {
		// The write must land before the event so woken subscribers read the new value.
		*self.token.write() = token;

		self.events.emit(event);
	}
}
impl TokenSource for TokenHub {
	fn access_token(&self) -> Option<AccessToken> {
		self.token.read().clone()
	}
}
impl AuthEventStream for TokenHub {
	fn subscribe(&self) -> AuthEventSubscription {
		self.events.subscribe()
	}
}
impl Debug for TokenHub {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenHub")
			.field("token_set", &self.token.read().is_some())
			.field("subscribers", &self.events.subscriber_count())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn set_access_token_stores_then_announces() {
		let hub = TokenHub::default();
		let mut subscription = hub.subscribe();

		hub.set_access_token("abc");

		assert_eq!(subscription.recv().await, Some(AuthEvent::TokenReceived));
		assert_eq!(hub.access_token().map(|token| token.expose().to_owned()), Some("abc".into()));
	}

	#[tokio::test]
	async fn refresh_and_clear_emit_their_own_events() {
		let hub = TokenHub::default();
		let mut subscription = hub.subscribe();

		hub.refresh_access_token("rotated");
		hub.clear(AuthEvent::Logout);

		assert_eq!(subscription.recv().await, Some(AuthEvent::TokenRefreshed));
		assert_eq!(subscription.recv().await, Some(AuthEvent::Logout));
		assert!(hub.access_token().is_none());
	}

	#[test]
	fn clones_share_state() {
		let hub = TokenHub::default();
		let source: Arc<dyn TokenSource> = Arc::new(hub.clone());

		hub.set_access_token("shared");

		assert_eq!(
			source.access_token().map(|token| token.expose().to_owned()),
			Some("shared".into())
		);
		assert_eq!(format!("{hub:?}"), "TokenHub { token_set: true, subscribers: 0 }");
	}
}
