//! Gate-level error types shared across the interceptor, transports, and configuration.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error surfaced by [`TokenGate::intercept`](crate::interceptor::TokenGate::intercept).
#[derive(Debug, ThisError)]
pub enum Error {
	/// Downstream failure re-raised by the resource-server error handler.
	#[error(transparent)]
	Downstream(#[from] DownstreamError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Returns the downstream HTTP status when the error wraps a status failure.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Downstream(DownstreamError::Status { status, .. }) => Some(*status),
			_ => None,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Resource-server configuration could not be parsed.
	#[error("Resource server configuration is invalid.")]
	Parse {
		/// Structured parsing failure, including the path of the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// An allow-listed URL prefix is empty.
	#[error("Allowed URL prefix `{url}` is invalid.")]
	InvalidAllowedUrl {
		/// Offending prefix as supplied.
		url: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failure reported by the next pipeline stage.
///
/// This is the value handed to
/// [`ResourceServerErrorHandler::handle_error`](crate::interceptor::ResourceServerErrorHandler::handle_error).
#[derive(Debug, ThisError)]
pub enum DownstreamError {
	/// The resource server answered with a non-success status.
	#[error("Resource server responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Retry-After hint from the response, if supplied.
		retry_after: Option<Duration>,
		/// Leading bytes of the response body, lossily decoded.
		body_preview: Option<String>,
	},
	/// The request never produced a response.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl DownstreamError {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Builds a [`DownstreamError::Status`] and truncates the body to a short preview.
	pub fn status(status: u16, retry_after: Option<Duration>, body: &[u8]) -> Self {
		let body_preview = if body.is_empty() {
			None
		} else {
			let end = body.len().min(Self::BODY_PREVIEW_LIMIT);

			Some(String::from_utf8_lossy(&body[..end]).into_owned())
		};

		Self::Status { status, retry_after, body_preview }
	}

	/// Returns `true` when the resource server rejected the credentials (HTTP 401).
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Status { status: 401, .. })
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the resource server.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the resource server.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_error_truncates_body_preview() {
		let body = vec![b'a'; 1024];
		let err = DownstreamError::status(502, None, &body);

		match err {
			DownstreamError::Status { status, body_preview, .. } => {
				assert_eq!(status, 502);
				assert_eq!(body_preview.map(|preview| preview.len()), Some(256));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn unauthorized_status_is_detected() {
		assert!(DownstreamError::status(401, None, b"").is_unauthorized());
		assert!(!DownstreamError::status(403, None, b"").is_unauthorized());

		let err: Error = DownstreamError::status(401, None, b"expired").into();

		assert_eq!(err.status(), Some(401));
		assert_eq!(err.to_string(), "Resource server responded with HTTP 401.");
	}

	#[test]
	fn transport_error_keeps_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
		let err: Error = DownstreamError::from(TransportError::from(io)).into();
		let source = StdError::source(&err).expect("Transport error should expose its IO source.");

		assert_eq!(source.to_string(), "reset by peer");
		assert_eq!(err.status(), None);
	}
}
