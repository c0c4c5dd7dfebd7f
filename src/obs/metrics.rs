// self
use crate::obs::AttachOutcome;

/// Records how a request's token was resolved via the global metrics recorder (when enabled).
pub fn record_attach_outcome(outcome: AttachOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_interceptor_attach_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Counts a downstream failure handed to the resource-server error handler.
pub fn record_downstream_failure() {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_interceptor_downstream_failure_total").increment(1);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_attach_outcome(AttachOutcome::Missing);
		record_downstream_failure();
	}
}
