//! Resource-server configuration consumed by [`TokenGate`](crate::interceptor::TokenGate).

// self
use crate::{_prelude::*, error::ConfigError};

/// Controls whether and how long the gate tries to attach an access token.
///
/// ```
/// use oauth2_interceptor::config::ResourceServerConfig;
///
/// let config = ResourceServerConfig::from_json_str(
/// 	r#"{ "send_access_token": true, "wait_for_token_ms": 250 }"#,
/// )
/// .unwrap();
///
/// assert!(config.send_access_token);
/// assert_eq!(config.wait_for_token().as_millis(), 250);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceServerConfig {
	/// Attach the bearer token to outbound requests.
	pub send_access_token: bool,
	/// Upper bound, in milliseconds, on waiting for a token to arrive when none is cached.
	pub wait_for_token_ms: u64,
	/// Optional URL prefixes eligible for token attachment. `None` allows every URL.
	pub allowed_urls: Option<Vec<String>>,
}
impl ResourceServerConfig {
	/// Parses a JSON document, reporting the path of the offending field on failure.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(raw);
		let config: Self = serde_path_to_error::deserialize(de)
			.map_err(|source| ConfigError::Parse { source })?;

		config.validate()?;

		Ok(config)
	}

	/// Overrides the attach-token policy.
	pub fn with_send_access_token(mut self, send: bool) -> Self {
		self.send_access_token = send;

		self
	}

	/// Overrides the wait bound. Negative durations clamp to zero.
	pub fn with_wait_for_token(mut self, wait: Duration) -> Self {
		self.wait_for_token_ms = if wait.is_negative() {
			0
		} else {
			u64::try_from(wait.whole_milliseconds()).unwrap_or(u64::MAX)
		};

		self
	}

	/// Restricts attachment to URLs starting with one of `prefixes`.
	pub fn with_allowed_urls<I, S>(mut self, prefixes: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.allowed_urls = Some(prefixes.into_iter().map(Into::into).collect());

		self.validate()?;

		Ok(self)
	}

	/// Wait bound as a standard-library duration, ready for timers.
	pub fn wait_for_token(&self) -> StdDuration {
		StdDuration::from_millis(self.wait_for_token_ms)
	}

	/// Checks the allow-list for an eligible URL.
	///
	/// Prefixes are compared against the lower-cased URL. Without an allow-list every URL
	/// qualifies.
	pub fn allows(&self, url: &Url) -> bool {
		let Some(prefixes) = &self.allowed_urls else {
			return true;
		};
		let url = url.as_str().to_lowercase();

		prefixes.iter().any(|prefix| url.starts_with(prefix.as_str()))
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if let Some(empty) =
			self.allowed_urls.iter().flatten().find(|prefix| prefix.trim().is_empty())
		{
			return Err(ConfigError::InvalidAllowedUrl { url: empty.clone() });
		}

		Ok(())
	}
}
