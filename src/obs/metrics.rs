// self
use crate::{
	_prelude::*,
	obs::{ExchangeKind, ExchangeOutcome},
};

/// Records an exchange outcome via the global metrics recorder (when enabled).
pub fn record_exchange_outcome(kind: ExchangeKind, outcome: ExchangeOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"service_http_exchange_total",
			"exchange" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records the terminal outcome of `result`; failures are also counted per [`failure_class`].
pub fn record_result<T>(kind: ExchangeKind, result: &Result<T>) {
	match result {
		Ok(_) => record_exchange_outcome(kind, ExchangeOutcome::Success),
		Err(e) => {
			record_exchange_outcome(kind, ExchangeOutcome::Failure);
			record_failure_class(kind, failure_class(e));
		},
	}
}

/// Buckets a failure into a low-cardinality label.
pub fn failure_class(error: &Error) -> &'static str {
	match error {
		Error::Status { status: 401, .. } => "unauthorized",
		Error::Status { status, .. } if *status < 500 => "client_status",
		Error::Status { .. } => "server_status",
		Error::Decode { .. } => "decode",
		Error::Transport(_) => "transport",
		Error::Config(_) => "config",
		Error::Hook { .. } => "hook",
		Error::RefreshFailed { .. } | Error::RefreshAbandoned => "refresh",
	}
}

fn record_failure_class(kind: ExchangeKind, class: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"service_http_failure_total",
			"exchange" => kind.as_str(),
			"class" => class
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, class);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::ConfigError;

	fn status(status: u16) -> Error {
		Error::Status { status, retry_after: None, body: Vec::new() }
	}

	#[test]
	fn failures_bucket_by_cause() {
		assert_eq!(failure_class(&status(401)), "unauthorized");
		assert_eq!(failure_class(&status(404)), "client_status");
		assert_eq!(failure_class(&status(503)), "server_status");
		assert_eq!(failure_class(&Error::hook("denied")), "hook");
		assert_eq!(failure_class(&Error::RefreshAbandoned), "refresh");
		assert_eq!(
			failure_class(&Error::RefreshFailed {
				source: Arc::new(ConfigError::MissingRefreshToken.into()),
			}),
			"refresh",
		);
	}

	#[test]
	fn recording_is_noop_without_metrics() {
		record_exchange_outcome(ExchangeKind::Refresh, ExchangeOutcome::Attempt);
		record_result(ExchangeKind::Replay, &Ok::<_, Error>(()));
		record_result::<()>(ExchangeKind::Request, &Err(status(500)));
	}
}
