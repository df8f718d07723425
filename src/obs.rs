//! Optional observability helpers for client exchanges.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `service_http.exchange` carrying `exchange` (kind),
//!   `method`, `target`, and the settled `status`.
//! - Enable `metrics` to increment `service_http_exchange_total` (labels `exchange`, `outcome`)
//!   for every attempt/success/failure, and `service_http_failure_total` (labels `exchange`,
//!   `class`) for every failure.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Exchange kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeKind {
	/// Caller-issued request passing through the pipeline.
	Request,
	/// Token refresh exchange performed by the coordinator.
	Refresh,
	/// Request re-issued after a refresh settled.
	Replay,
}
impl ExchangeKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeKind::Request => "request",
			ExchangeKind::Refresh => "refresh",
			ExchangeKind::Replay => "replay",
		}
	}
}
impl Display for ExchangeKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeOutcome {
	/// Exchange started.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl ExchangeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeOutcome::Attempt => "attempt",
			ExchangeOutcome::Success => "success",
			ExchangeOutcome::Failure => "failure",
		}
	}
}
impl Display for ExchangeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
