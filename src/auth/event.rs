//! Authentication event stream contracts.
//!
//! An [`AuthEventStream`] is a lazy, restartable source of [`AuthEvent`]s that lives for the
//! whole process. Each consumer calls [`AuthEventStream::subscribe`] to get its own
//! [`AuthEventSubscription`] and drops it to detach. The gate only cares about
//! [`AuthEvent::TokenReceived`]; the other kinds exist so one stream can serve every listener
//! in an application.

// crates.io
use tokio::sync::{
	broadcast::{self, Receiver, Sender, error::RecvError},
	mpsc::UnboundedReceiver,
};
// self
use crate::_prelude::*;

/// Authentication-state change notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEvent {
	/// A new access token became available.
	TokenReceived,
	/// An existing access token was replaced by a refreshed one.
	TokenRefreshed,
	/// The current access token is about to expire.
	TokenExpires,
	/// Obtaining a token failed.
	TokenError,
	/// The user logged out and the token was discarded.
	Logout,
	/// The identity provider terminated the session.
	SessionTerminated,
}
impl AuthEvent {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthEvent::TokenReceived => "token_received",
			AuthEvent::TokenRefreshed => "token_refreshed",
			AuthEvent::TokenExpires => "token_expires",
			AuthEvent::TokenError => "token_error",
			AuthEvent::Logout => "logout",
			AuthEvent::SessionTerminated => "session_terminated",
		}
	}
}
impl Display for AuthEvent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Source of [`AuthEvent`] notifications that consumers subscribe to on demand.
pub trait AuthEventStream
where
	Self: Send + Sync,
{
	/// Opens a subscription that observes every event emitted after this call.
	fn subscribe(&self) -> AuthEventSubscription;
}
impl<T> AuthEventStream for Arc<T>
where
	T: ?Sized + AuthEventStream,
{
	fn subscribe(&self) -> AuthEventSubscription {
		T::subscribe(self)
	}
}

/// Single consumer's view of an [`AuthEventStream`]. Dropping it unsubscribes.
///
/// Streams backed by `tokio::sync::broadcast` hand out receivers through
/// [`from_receiver`](Self::from_receiver). Streams that fan out by keeping one
/// `tokio::sync::mpsc` sender per subscriber use [`from_unbounded`](Self::from_unbounded). Such
/// a stream should prune senders whose
/// [`is_closed`](tokio::sync::mpsc::UnboundedSender::is_closed) reports a dropped subscription.
#[derive(Debug)]
pub struct AuthEventSubscription(SubscriptionInner);
impl AuthEventSubscription {
	/// Wraps a broadcast receiver.
	pub fn from_receiver(receiver: Receiver<AuthEvent>) -> Self {
		Self(SubscriptionInner::Broadcast(receiver))
	}

	/// Wraps the receiving half of a per-subscriber unbounded channel.
	///
	/// The subscription ends once every sender for the channel is dropped.
	pub fn from_unbounded(receiver: UnboundedReceiver<AuthEvent>) -> Self {
		Self(SubscriptionInner::Unbounded(receiver))
	}

	/// Waits for the next event.
	///
	/// Returns `None` once the stream is closed. Events missed because this subscriber fell
	/// behind are skipped.
	pub async fn recv(&mut self) -> Option<AuthEvent> {
		let receiver = match &mut self.0 {
			SubscriptionInner::Broadcast(receiver) => receiver,
			SubscriptionInner::Unbounded(receiver) => return receiver.recv().await,
		};

		loop {
			match receiver.recv().await {
				Ok(event) => return Some(event),
				Err(RecvError::Lagged(_)) => continue,
				Err(RecvError::Closed) => return None,
			}
		}
	}

	/// Waits until `wanted` is observed, discarding every other event.
	///
	/// Returns `false` if the stream closed first.
	pub async fn wait_for(&mut self, wanted: AuthEvent) -> bool {
		while let Some(event) = self.recv().await {
			if event == wanted {
				return true;
			}
		}

		false
	}
}

#[derive(Debug)]
enum SubscriptionInner {
	Broadcast(Receiver<AuthEvent>),
	Unbounded(UnboundedReceiver<AuthEvent>),
}

/// Broadcast-backed [`AuthEventStream`] that applications emit into.
#[derive(Clone, Debug)]
pub struct AuthEvents(Sender<AuthEvent>);
impl AuthEvents {
	const DEFAULT_CAPACITY: usize = 32;
	/// Largest per-subscriber buffer [`with_capacity`](Self::with_capacity) allocates.
	pub const MAX_CAPACITY: usize = 1 << 16;

	/// Creates a stream buffering up to `capacity` undelivered events per subscriber.
	///
	/// `capacity` is clamped to `1..=MAX_CAPACITY`.
	pub fn with_capacity(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity.clamp(1, Self::MAX_CAPACITY));

		Self(sender)
	}

	/// Publishes an event to every live subscriber.
	///
	/// Emitting with no subscribers is not an error; the event is simply dropped.
	pub fn emit(&self, event: AuthEvent) {
		let _ = self.0.send(event);
	}

	/// Number of subscriptions currently attached.
	pub fn subscriber_count(&self) -> usize {
		self.0.receiver_count()
	}
}
impl Default for AuthEvents {
	fn default() -> Self {
		Self::with_capacity(Self::DEFAULT_CAPACITY)
	}
}
impl AuthEventStream for AuthEvents {
	fn subscribe(&self) -> AuthEventSubscription {
		AuthEventSubscription::from_receiver(self.0.subscribe())
	}
}
