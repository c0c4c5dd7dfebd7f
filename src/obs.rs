//! Optional observability helpers for the gate.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to run every interception inside a span named `oauth2_interceptor.gate` with
//!   a `stage` field.
//! - Enable `metrics` to increment `oauth2_interceptor_attach_total` once per request, labeled by
//!   `outcome`, and `oauth2_interceptor_downstream_failure_total` once per translated failure.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// How the gate treated a request's `Authorization` header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttachOutcome {
	/// The attach-token policy is off.
	Disabled,
	/// The URL is not eligible for attachment.
	Skipped,
	/// A cached token was attached without waiting.
	Immediate,
	/// A token was attached after waiting for it.
	Awaited,
	/// No usable token was available within the wait bound.
	Missing,
}
impl AttachOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AttachOutcome::Disabled => "disabled",
			AttachOutcome::Skipped => "skipped",
			AttachOutcome::Immediate => "immediate",
			AttachOutcome::Awaited => "awaited",
			AttachOutcome::Missing => "missing",
		}
	}
}
impl Display for AttachOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
