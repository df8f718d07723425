//! Single-flight token refresh coordination for unauthorized responses.
//!
//! Every client owns one [`RefreshCoordinator`]. When a request fails with HTTP 401 the error
//! hook hands the [`FailedRequest`] to [`RefreshCoordinator::handle_failure`]. The first eligible
//! failure becomes the owner of a refresh episode and performs the refresh exchange; failures
//! arriving while that episode is in flight enqueue a continuation instead of refreshing again.
//! When the exchange settles, the owner stores or clears credentials, releases the in-flight
//! flag, and settles every continuation in enqueue order. Each request then replays its own
//! descriptor through the pipeline, where the stamping hook attaches the new access token.

mod config;
mod metrics;

pub use config::*;
pub use metrics::{RefreshEvent, RefreshMetrics, RefreshStats};

// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	auth::{TokenPair, pair::RefreshEnvelope},
	client::Exchange,
	error::ConfigError,
	http::Method,
	obs::{self, ExchangeKind, ExchangeOutcome, ExchangeSpan},
	request::{FailedRequest, ServiceRequest, ServiceResponse},
};

type RefreshOutcome = std::result::Result<(), Arc<Error>>;
type Continuation = oneshot::Sender<RefreshOutcome>;

#[derive(Debug, Default)]
struct RefreshState {
	refreshing: bool,
	waiters: VecDeque<Continuation>,
}

enum Role<'a> {
	Owner(RefreshEpisode<'a>),
	Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// Owns the refresh state of one client and fans refresh outcomes out to queued requests.
#[derive(Debug)]
pub struct RefreshCoordinator {
	config: RefreshConfig,
	state: Mutex<RefreshState>,
	metrics: Arc<RefreshMetrics>,
}
impl RefreshCoordinator {
	/// Creates a coordinator with idle state.
	pub fn new(config: RefreshConfig) -> Self {
		Self { config, state: Default::default(), metrics: Default::default() }
	}

	/// Returns the refresh configuration.
	pub fn config(&self) -> &RefreshConfig {
		&self.config
	}

	/// Returns the refresh counters.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Whether a refresh exchange is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.state.lock().refreshing
	}

	/// Number of requests waiting on the in-flight refresh.
	pub fn queued(&self) -> usize {
		self.state.lock().waiters.len()
	}

	/// Whether `failed` may trigger (or join) a refresh.
	///
	/// The failure must be an HTTP 401, the request must not have been replayed already, and
	/// it must not target the access endpoint. The configured credential port always provides
	/// both token getters.
	pub fn is_eligible(&self, failed: &FailedRequest) -> bool {
		failed.error.is_unauthorized()
			&& !failed.request.is_retried()
			&& !self.config.is_access_endpoint(&failed.request.path)
	}

	/// Resolves an unauthorized failure by refreshing once and replaying the request.
	///
	/// Ineligible failures are returned unchanged. A failed refresh rejects the triggering
	/// request and every queued request with [`Error::RefreshFailed`] carrying the same source.
	pub async fn handle_failure(
		&self,
		exchange: &dyn Exchange,
		failed: FailedRequest,
	) -> Result<ServiceResponse> {
		if !self.is_eligible(&failed) {
			return Err(failed.error);
		}

		let FailedRequest { mut request, .. } = failed;

		request.mark_retried();

		match self.join() {
			Role::Waiter(rx) => {
				self.metrics.record(RefreshEvent::Queued);

				rx.await
					.map_err(|_| Error::RefreshAbandoned)?
					.map_err(|source| Error::RefreshFailed { source })?;

				self.replay(exchange, request).await
			},
			Role::Owner(episode) => match self.refresh(exchange).await {
				Ok(()) => {
					episode.settle(Ok(()));

					self.replay(exchange, request).await
				},
				Err(err) => {
					let source = Arc::new(err);

					episode.settle(Err(source.clone()));

					Err(Error::RefreshFailed { source })
				},
			},
		}
	}

	// The in-flight flag is claimed under the same lock that observed it unset.
	fn join(&self) -> Role<'_> {
		let mut state = self.state.lock();

		if state.refreshing {
			let (tx, rx) = oneshot::channel();

			state.waiters.push_back(tx);

			Role::Waiter(rx)
		} else {
			state.refreshing = true;

			Role::Owner(RefreshEpisode { coordinator: self, settled: false })
		}
	}

	async fn refresh(&self, exchange: &dyn Exchange) -> Result<()> {
		const KIND: ExchangeKind = ExchangeKind::Refresh;

		let span = ExchangeSpan::new(
			KIND,
			&Method::POST,
			self.config.refresh_endpoint.as_deref().unwrap_or_default(),
		);

		obs::record_exchange_outcome(KIND, ExchangeOutcome::Attempt);
		self.metrics.record(RefreshEvent::Episode);

		let result = span
			.instrument(async {
				let credentials = &self.config.credentials;

				match self.exchange_tokens(exchange).await {
					Ok(pair) => {
						credentials.store_pair(pair);
						self.metrics.record(RefreshEvent::Rotated);

						Ok(())
					},
					Err(err) => {
						credentials.clear();
						credentials.on_token_expired();
						self.metrics.record(RefreshEvent::Rejected);

						Err(err)
					},
				}
			})
			.await;

		span.record_status(obs::settled_status(&result, |_| None));
		obs::record_result(KIND, &result);

		result
	}

	async fn exchange_tokens(&self, exchange: &dyn Exchange) -> Result<TokenPair> {
		let credentials = &self.config.credentials;
		// Empty values count as missing.
		let refresh_token = credentials
			.refresh_token()
			.filter(|token| !token.is_empty())
			.ok_or(ConfigError::MissingRefreshToken)?;
		let token = credentials
			.access_token()
			.filter(|token| !token.is_empty())
			.ok_or(ConfigError::MissingAccessToken)?;
		let endpoint = self
			.config
			.refresh_endpoint
			.as_deref()
			.filter(|endpoint| !endpoint.is_empty())
			.ok_or(ConfigError::MissingRefreshEndpoint)?;
		let headers = self.config.auth_headers(&token, Some(&refresh_token))?;
		let request = ServiceRequest::new(Method::POST, endpoint)
			.with_headers(headers)
			.with_body(b"{}".to_vec());
		let response = exchange.send_direct(request).await?;
		let envelope = response.json::<RefreshEnvelope>()?;

		Ok(envelope.data)
	}

	async fn replay(
		&self,
		exchange: &dyn Exchange,
		request: ServiceRequest,
	) -> Result<ServiceResponse> {
		const KIND: ExchangeKind = ExchangeKind::Replay;

		obs::record_exchange_outcome(KIND, ExchangeOutcome::Attempt);
		self.metrics.record(RefreshEvent::Replayed);

		let span = ExchangeSpan::new(KIND, &request.method, &request.path);
		let result = span.instrument(exchange.dispatch(request)).await;

		span.record_status(obs::settled_status(&result, |response| {
			Some(response.status.as_u16())
		}));
		obs::record_result(KIND, &result);

		result
	}
}

/// Ownership of the in-flight flag for one refresh episode.
///
/// Dropping an unsettled episode (the owner's future was cancelled or panicked) releases the
/// flag and drops every continuation, so queued requests fail with
/// [`Error::RefreshAbandoned`] instead of waiting forever.
struct RefreshEpisode<'a> {
	coordinator: &'a RefreshCoordinator,
	settled: bool,
}
impl RefreshEpisode<'_> {
	fn settle(mut self, outcome: RefreshOutcome) {
		self.settled = true;

		let waiters = self.release();

		for waiter in waiters {
			// A waiter whose caller went away has nothing left to settle.
			let _ = waiter.send(outcome.clone());
		}
	}

	fn release(&self) -> VecDeque<Continuation> {
		let mut state = self.coordinator.state.lock();

		state.refreshing = false;

		std::mem::take(&mut state.waiters)
	}
}
impl Drop for RefreshEpisode<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.coordinator.metrics.record(RefreshEvent::Abandoned);
			drop(self.release());
		}
	}
}
