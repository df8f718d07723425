//! Interceptor configuration and the hook pipeline every exchange passes through.
//!
//! Callers describe hooks with [`Interceptor`]. [`Pipeline::new`] resolves that description once
//! into three sum-typed hooks so no per-request option checks remain:
//!
//! - request: custom hook, else bearer stamping from the credential port, else pass-through;
//! - response: custom hook, else pass-through;
//! - error: custom hook, else the refresh coordinator, else propagate.
//!
//! A custom error hook takes full precedence; it never runs alongside the coordinator.

// self
use crate::{
	_prelude::*,
	auth::CredentialPort,
	client::Exchange,
	http::header,
	refresh::{RefreshConfig, RefreshCoordinator},
	request::{FailedRequest, ServiceRequest, ServiceResponse},
};

/// Boxed future returned by [`ErrorInterceptor::on_error`].
pub type HookFuture<'a> = Pin<Box<dyn Future<Output = Result<ServiceResponse>> + 'a + Send>>;

/// Custom pre-send hook; replaces the default bearer stamping.
pub trait RequestInterceptor
where
	Self: Send + Sync,
{
	/// Transforms or rejects an outgoing request.
	fn on_request(&self, request: ServiceRequest) -> Result<ServiceRequest>;
}
impl<F> RequestInterceptor for F
where
	F: Fn(ServiceRequest) -> Result<ServiceRequest> + Send + Sync,
{
	fn on_request(&self, request: ServiceRequest) -> Result<ServiceRequest> {
		self(request)
	}
}

/// Custom post-receive hook for successful responses.
pub trait ResponseInterceptor
where
	Self: Send + Sync,
{
	/// Transforms or rejects a successful response.
	fn on_response(&self, response: ServiceResponse) -> Result<ServiceResponse>;
}
impl<F> ResponseInterceptor for F
where
	F: Fn(ServiceResponse) -> Result<ServiceResponse> + Send + Sync,
{
	fn on_response(&self, response: ServiceResponse) -> Result<ServiceResponse> {
		self(response)
	}
}

/// Custom failure hook; replaces the refresh coordinator entirely.
pub trait ErrorInterceptor
where
	Self: Send + Sync,
{
	/// Recovers from or propagates a failed exchange.
	fn on_error(&self, failed: FailedRequest) -> HookFuture<'_>;
}
impl<F, Fut> ErrorInterceptor for F
where
	F: Fn(FailedRequest) -> Fut + Send + Sync,
	Fut: 'static + Future<Output = Result<ServiceResponse>> + Send,
{
	fn on_error(&self, failed: FailedRequest) -> HookFuture<'_> {
		Box::pin(self(failed))
	}
}

/// Caller-facing hook configuration.
#[derive(Clone, Default)]
pub struct Interceptor {
	/// Custom request hook.
	pub on_request: Option<Arc<dyn RequestInterceptor>>,
	/// Custom response hook.
	pub on_response: Option<Arc<dyn ResponseInterceptor>>,
	/// Custom error hook.
	pub on_error: Option<Arc<dyn ErrorInterceptor>>,
	/// Credential port and refresh endpoints.
	pub token_config: Option<RefreshConfig>,
}
impl Interceptor {
	/// Sets the custom request hook.
	pub fn with_request_hook(mut self, hook: impl 'static + RequestInterceptor) -> Self {
		self.on_request = Some(Arc::new(hook));

		self
	}

	/// Sets the custom response hook.
	pub fn with_response_hook(mut self, hook: impl 'static + ResponseInterceptor) -> Self {
		self.on_response = Some(Arc::new(hook));

		self
	}

	/// Sets the custom error hook.
	pub fn with_error_hook(mut self, hook: impl 'static + ErrorInterceptor) -> Self {
		self.on_error = Some(Arc::new(hook));

		self
	}

	/// Sets the refresh configuration.
	pub fn with_token_config(mut self, config: RefreshConfig) -> Self {
		self.token_config = Some(config);

		self
	}
}
impl Debug for Interceptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Interceptor")
			.field("on_request", &self.on_request.is_some())
			.field("on_response", &self.on_response.is_some())
			.field("on_error", &self.on_error.is_some())
			.field("token_config", &self.token_config)
			.finish()
	}
}

/// Resolved pre-send hook.
#[derive(Clone)]
pub enum RequestHook {
	/// Send the request unchanged.
	PassThrough,
	/// Attach `Authorization: Bearer <token>` when the port holds a token.
	Stamp(Arc<dyn CredentialPort>),
	/// Caller-supplied hook.
	Custom(Arc<dyn RequestInterceptor>),
}

/// Resolved post-receive hook.
#[derive(Clone)]
pub enum ResponseHook {
	/// Return the response unchanged.
	PassThrough,
	/// Caller-supplied hook.
	Custom(Arc<dyn ResponseInterceptor>),
}

/// Resolved failure hook.
pub enum ErrorHook {
	/// Return the failure unchanged.
	Propagate,
	/// Hand unauthorized failures to the refresh coordinator.
	Refresh(RefreshCoordinator),
	/// Caller-supplied hook.
	Custom(Arc<dyn ErrorInterceptor>),
}

/// Hooks resolved from an [`Interceptor`] at client construction.
pub struct Pipeline {
	request: RequestHook,
	response: ResponseHook,
	error: ErrorHook,
}
impl Pipeline {
	/// Resolves `interceptor` into concrete hooks; `None` yields a pass-through pipeline.
	pub fn new(interceptor: Option<Interceptor>) -> Self {
		let Some(Interceptor { on_request, on_response, on_error, token_config }) = interceptor
		else {
			return Self {
				request: RequestHook::PassThrough,
				response: ResponseHook::PassThrough,
				error: ErrorHook::Propagate,
			};
		};
		let request = match (on_request, &token_config) {
			(Some(hook), _) => RequestHook::Custom(hook),
			(None, Some(config)) => RequestHook::Stamp(config.credentials.clone()),
			(None, None) => RequestHook::PassThrough,
		};
		let response = match on_response {
			Some(hook) => ResponseHook::Custom(hook),
			None => ResponseHook::PassThrough,
		};
		let error = match (on_error, token_config) {
			(Some(hook), _) => ErrorHook::Custom(hook),
			(None, Some(config)) => ErrorHook::Refresh(RefreshCoordinator::new(config)),
			(None, None) => ErrorHook::Propagate,
		};

		Self { request, response, error }
	}

	/// Returns the refresh coordinator when the error hook delegates to one.
	pub fn refresh_coordinator(&self) -> Option<&RefreshCoordinator> {
		match &self.error {
			ErrorHook::Refresh(coordinator) => Some(coordinator),
			_ => None,
		}
	}

	/// Runs the request hook.
	pub fn on_request(&self, mut request: ServiceRequest) -> Result<ServiceRequest> {
		match &self.request {
			RequestHook::PassThrough => Ok(request),
			RequestHook::Custom(hook) => hook.on_request(request),
			RequestHook::Stamp(credentials) => {
				if let Some(token) = credentials.access_token().filter(|token| !token.is_empty()) {
					request.headers.insert(header::AUTHORIZATION, token.bearer_header()?);
				}

				Ok(request)
			},
		}
	}

	/// Runs the response hook.
	pub fn on_response(&self, response: ServiceResponse) -> Result<ServiceResponse> {
		match &self.response {
			ResponseHook::PassThrough => Ok(response),
			ResponseHook::Custom(hook) => hook.on_response(response),
		}
	}

	/// Runs the error hook; `exchange` replays requests after a successful refresh.
	pub async fn on_error(
		&self,
		exchange: &dyn Exchange,
		failed: FailedRequest,
	) -> Result<ServiceResponse> {
		match &self.error {
			ErrorHook::Propagate => Err(failed.error),
			ErrorHook::Refresh(coordinator) => coordinator.handle_failure(exchange, failed).await,
			ErrorHook::Custom(hook) => hook.on_error(failed).await,
		}
	}
}
impl Debug for Pipeline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let request = match self.request {
			RequestHook::PassThrough => "pass_through",
			RequestHook::Stamp(_) => "stamp",
			RequestHook::Custom(_) => "custom",
		};
		let response = match self.response {
			ResponseHook::PassThrough => "pass_through",
			ResponseHook::Custom(_) => "custom",
		};
		let error = match self.error {
			ErrorHook::Propagate => "propagate",
			ErrorHook::Refresh(_) => "refresh",
			ErrorHook::Custom(_) => "custom",
		};

		f.debug_struct("Pipeline")
			.field("request", &request)
			.field("response", &response)
			.field("error", &error)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{MemoryCredentials, TokenPair},
		http::Method,
	};

	fn bearer(request: &ServiceRequest) -> Option<&str> {
		request.headers.get(header::AUTHORIZATION).and_then(|value| value.to_str().ok())
	}

	fn token_config(credentials: Arc<MemoryCredentials>) -> RefreshConfig {
		RefreshConfig::new(credentials).with_refresh_endpoint("/auth/refresh")
	}

	#[test]
	fn empty_pipeline_passes_everything_through() {
		let pipeline = Pipeline::new(None);
		let request = pipeline
			.on_request(ServiceRequest::new(Method::GET, "/items"))
			.expect("Pass-through request hook should not fail.");

		assert!(bearer(&request).is_none());
		assert!(pipeline.refresh_coordinator().is_none());
	}

	#[test]
	fn stamping_attaches_current_token_only_when_present() {
		let credentials = Arc::new(MemoryCredentials::with_pair(TokenPair::new("a1", "r1")));
		let pipeline = Pipeline::new(Some(
			Interceptor::default().with_token_config(token_config(credentials.clone())),
		));
		let request = pipeline
			.on_request(ServiceRequest::new(Method::GET, "/items"))
			.expect("Stamping should succeed.");

		assert_eq!(bearer(&request), Some("Bearer a1"));
		assert!(pipeline.refresh_coordinator().is_some());

		credentials.clear();

		let request = pipeline
			.on_request(ServiceRequest::new(Method::GET, "/items"))
			.expect("Missing tokens are not a stamping error.");

		assert!(bearer(&request).is_none());
	}

	#[test]
	fn custom_request_hook_replaces_stamping() {
		let credentials = Arc::new(MemoryCredentials::with_pair(TokenPair::new("a1", "r1")));
		let pipeline = Pipeline::new(Some(
			Interceptor::default()
				.with_token_config(token_config(credentials))
				.with_request_hook(|request: ServiceRequest| {
					request.with_header("x-api-key", "k1")
				}),
		));
		let request = pipeline
			.on_request(ServiceRequest::new(Method::GET, "/items"))
			.expect("Custom hook should succeed.");

		assert!(bearer(&request).is_none());
		assert_eq!(request.headers.get("x-api-key").and_then(|v| v.to_str().ok()), Some("k1"));
	}

	#[test]
	fn custom_error_hook_bypasses_coordinator() {
		let credentials = Arc::new(MemoryCredentials::with_pair(TokenPair::new("a1", "r1")));
		let pipeline = Pipeline::new(Some(
			Interceptor::default()
				.with_token_config(token_config(credentials))
				.with_error_hook(|failed: FailedRequest| async move {
					Err::<ServiceResponse, _>(failed.error)
				}),
		));

		assert!(pipeline.refresh_coordinator().is_none());
		assert!(format!("{pipeline:?}").contains("custom"));
	}
}
