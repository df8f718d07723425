//! Per-service client that runs every exchange through the interceptor pipeline.

// crates.io
use oauth2::http::Request as WireRequest;
// self
use crate::{
	_prelude::*,
	config::{ClientDefaults, ClientOptions},
	error::ConfigError,
	http::{self, AsyncHttpClient, HttpTransport, Method},
	interceptor::Pipeline,
	obs::{self, ExchangeKind, ExchangeOutcome, ExchangeSpan},
	refresh::RefreshCoordinator,
	request::{FailedRequest, ServiceRequest, ServiceResponse},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Boxed future returned by [`Exchange`] methods.
pub type ExchangeFuture<'a> = Pin<Box<dyn Future<Output = Result<ServiceResponse>> + 'a + Send>>;

/// Object-safe view of a client used by the error hook to replay requests.
pub trait Exchange
where
	Self: Send + Sync,
{
	/// Runs `request` through the full pipeline: stamping, transport, response and error hooks.
	fn dispatch(&self, request: ServiceRequest) -> ExchangeFuture<'_>;

	/// Sends `request` with the client defaults only, bypassing every hook.
	fn send_direct(&self, request: ServiceRequest) -> ExchangeFuture<'_>;
}

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestServiceClient = ServiceClient<ReqwestHttpClient>;

/// HTTP client bound to one service base URL.
///
/// Cloning is cheap and clones share the same refresh state, so a refresh triggered through
/// one clone also settles requests queued through another.
pub struct ServiceClient<C>(Arc<ClientInner<C>>)
where
	C: HttpTransport;
impl<C> ServiceClient<C>
where
	C: HttpTransport,
{
	/// Builds a client for `base_url` using the caller-provided transport.
	pub fn new(
		transport: impl Into<Arc<C>>,
		base_url: &str,
		options: ClientOptions,
	) -> Result<Self> {
		let defaults = ClientDefaults::from_options(base_url, &options)?;
		let pipeline = Pipeline::new(options.interceptor);

		Ok(Self(Arc::new(ClientInner { transport: transport.into(), defaults, pipeline })))
	}

	/// Returns the underlying transport.
	pub fn transport(&self) -> &Arc<C> {
		&self.0.transport
	}

	/// Returns the base URL and default headers.
	pub fn defaults(&self) -> &ClientDefaults {
		&self.0.defaults
	}

	/// Returns the refresh coordinator when a refresh configuration drives the error hook.
	pub fn refresh_coordinator(&self) -> Option<&RefreshCoordinator> {
		self.0.pipeline.refresh_coordinator()
	}

	/// Sends a prepared request through the pipeline.
	pub async fn send(&self, request: ServiceRequest) -> Result<ServiceResponse> {
		self.0.dispatch(request).await
	}

	/// Issues a `GET` request.
	pub async fn get(&self, path: &str) -> Result<ServiceResponse> {
		self.send(ServiceRequest::new(Method::GET, path)).await
	}

	/// Issues a `POST` request with a raw body.
	pub async fn post(&self, path: &str, body: impl Into<Vec<u8>>) -> Result<ServiceResponse> {
		self.send(ServiceRequest::new(Method::POST, path).with_body(body)).await
	}

	/// Issues a `POST` request with a JSON body.
	pub async fn post_json<T>(&self, path: &str, payload: &T) -> Result<ServiceResponse>
	where
		T: ?Sized + Serialize,
	{
		self.send(ServiceRequest::new(Method::POST, path).with_json(payload)?).await
	}

	/// Issues a `PUT` request with a raw body.
	pub async fn put(&self, path: &str, body: impl Into<Vec<u8>>) -> Result<ServiceResponse> {
		self.send(ServiceRequest::new(Method::PUT, path).with_body(body)).await
	}

	/// Issues a `PUT` request with a JSON body.
	pub async fn put_json<T>(&self, path: &str, payload: &T) -> Result<ServiceResponse>
	where
		T: ?Sized + Serialize,
	{
		self.send(ServiceRequest::new(Method::PUT, path).with_json(payload)?).await
	}

	/// Issues a `PATCH` request with a raw body.
	pub async fn patch(&self, path: &str, body: impl Into<Vec<u8>>) -> Result<ServiceResponse> {
		self.send(ServiceRequest::new(Method::PATCH, path).with_body(body)).await
	}

	/// Issues a `PATCH` request with a JSON body.
	pub async fn patch_json<T>(&self, path: &str, payload: &T) -> Result<ServiceResponse>
	where
		T: ?Sized + Serialize,
	{
		self.send(ServiceRequest::new(Method::PATCH, path).with_json(payload)?).await
	}

	/// Issues a `DELETE` request.
	pub async fn delete(&self, path: &str) -> Result<ServiceResponse> {
		self.send(ServiceRequest::new(Method::DELETE, path)).await
	}
}
impl<C> Clone for ServiceClient<C>
where
	C: HttpTransport,
{
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}
impl<C> Debug for ServiceClient<C>
where
	C: HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ServiceClient")
			.field("base_url", &self.0.defaults.base_url)
			.field("pipeline", &self.0.pipeline)
			.finish()
	}
}

struct ClientInner<C>
where
	C: HttpTransport,
{
	transport: Arc<C>,
	defaults: ClientDefaults,
	pipeline: Pipeline,
}
impl<C> ClientInner<C>
where
	C: HttpTransport,
{
	async fn execute(&self, request: ServiceRequest) -> Result<ServiceResponse> {
		let url = self.defaults.resolve(&request.path)?;
		let mut headers = self.defaults.headers.clone();

		headers.extend(request.headers);

		let mut http_request = WireRequest::builder()
			.method(request.method)
			.uri(url.as_str())
			.body(request.body)
			.map_err(ConfigError::from)?;

		*http_request.headers_mut() = headers;

		let handle = self.transport.handle();
		let response = handle.call(http_request).await.map_err(http::map_transport_error)?;
		let status = response.status().as_u16();

		if !ClientDefaults::validate_status(status) {
			let retry_after = http::parse_retry_after(response.headers());

			return Err(Error::Status { status, retry_after, body: response.into_body() });
		}

		let (parts, body) = response.into_parts();

		Ok(ServiceResponse { status: parts.status, headers: parts.headers, body })
	}
}
impl<C> Exchange for ClientInner<C>
where
	C: HttpTransport,
{
	fn dispatch(&self, request: ServiceRequest) -> ExchangeFuture<'_> {
		const KIND: ExchangeKind = ExchangeKind::Request;

		Box::pin(async move {
			obs::record_exchange_outcome(KIND, ExchangeOutcome::Attempt);

			let span = ExchangeSpan::new(KIND, &request.method, &request.path);
			let result = span
				.instrument(async {
					let original = request.clone();
					let exchanged = match self.pipeline.on_request(request) {
						Ok(stamped) => self.execute(stamped).await,
						Err(err) => Err(err),
					};

					match exchanged {
						Ok(response) => self.pipeline.on_response(response),
						Err(error) =>
							self.pipeline.on_error(self, FailedRequest::new(original, error)).await,
					}
				})
				.await;

			span.record_status(obs::settled_status(&result, |response| {
				Some(response.status.as_u16())
			}));
			obs::record_result(KIND, &result);

			result
		})
	}

	fn send_direct(&self, request: ServiceRequest) -> ExchangeFuture<'_> {
		Box::pin(self.execute(request))
	}
}
