// self
use crate::{_prelude::*, http::Method, obs::ExchangeKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedExchange<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedExchange<F> = F;

/// Span covering one exchange, tagged with its kind, method, and target path.
///
/// The `status` field starts empty and is filled by [`ExchangeSpan::record_status`] once the
/// exchange settles.
#[derive(Clone, Debug)]
pub struct ExchangeSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ExchangeSpan {
	/// Opens a span for `method target`.
	pub fn new(kind: ExchangeKind, method: &Method, target: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"service_http.exchange",
				exchange = kind.as_str(),
				method = method.as_str(),
				target,
				status = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, method, target);

			Self {}
		}
	}

	/// Records the HTTP status the exchange settled with, if any.
	pub fn record_status(&self, status: Option<u16>) {
		#[cfg(feature = "tracing")]
		{
			if let Some(status) = status {
				self.span.record("status", status);
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = status;
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedExchange<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Status carried by a settled exchange: the response status or the rejected status.
pub fn settled_status<T>(
	result: &Result<T>,
	ok_status: impl FnOnce(&T) -> Option<u16>,
) -> Option<u16> {
	match result {
		Ok(value) => ok_status(value),
		Err(e) => e.status(),
	}
}
