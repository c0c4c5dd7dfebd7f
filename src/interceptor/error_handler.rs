//! Resource-server error handler contract.

// self
use crate::{_prelude::*, error::DownstreamError, http::InboundResponse};

/// Translates a downstream failure into the interception outcome.
///
/// Handlers either recover by returning a substitute [`InboundResponse`] or re-raise by
/// returning an [`Error`](crate::error::Error). The gate calls the handler at most once per
/// request and never retries on its own.
pub trait ResourceServerErrorHandler
where
	Self: 'static + Send + Sync,
{
	/// Handles a failure reported by the next pipeline stage.
	fn handle_error(&self, error: DownstreamError) -> Result<InboundResponse>;
}
impl<F> ResourceServerErrorHandler for F
where
	F: 'static + Send + Sync + Fn(DownstreamError) -> Result<InboundResponse>,
{
	fn handle_error(&self, error: DownstreamError) -> Result<InboundResponse> {
		self(error)
	}
}

/// Default handler: surfaces every failure unchanged as
/// [`Error::Downstream`](crate::error::Error::Downstream).
#[derive(Clone, Copy, Debug, Default)]
pub struct RethrowErrorHandler;
impl ResourceServerErrorHandler for RethrowErrorHandler {
	fn handle_error(&self, error: DownstreamError) -> Result<InboundResponse> {
		Err(error.into())
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use http::StatusCode;
	// self
	use super::*;

	#[test]
	fn rethrow_keeps_downstream_error() {
		let err = RethrowErrorHandler
			.handle_error(DownstreamError::status(401, None, b"expired"))
			.expect_err("Rethrow handler must not recover.");

		assert_eq!(err.status(), Some(401));
	}

	#[test]
	fn closures_can_recover() {
		let handler = |error: DownstreamError| -> Result<InboundResponse> {
			if error.is_unauthorized() {
				Ok(InboundResponse::new(StatusCode::NO_CONTENT, Vec::new()))
			} else {
				Err(error.into())
			}
		};
		let recovered = handler
			.handle_error(DownstreamError::status(401, None, b""))
			.expect("Closure should recover from 401.");

		assert_eq!(recovered.status, StatusCode::NO_CONTENT);
		assert!(handler.handle_error(DownstreamError::status(500, None, b"")).is_err());
	}
}
