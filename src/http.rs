//! Transport primitives for service exchanges.
//!
//! The module exposes [`HttpTransport`], the client's only dependency on an HTTP stack.
//! Requests and responses travel as [`HttpRequest`] / [`HttpResponse`] values so custom
//! transports (fakes in tests, alternative stacks in production) plug in without touching the
//! interceptor pipeline or the refresh coordinator.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
pub use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Abstraction over HTTP transports capable of executing service exchanges.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back every client a
/// [`ServiceHandler`](crate::factory::ServiceHandler) builds, and the handles they return must
/// own whatever state is required so their request futures remain `Send` while a request is
/// in flight or queued behind a token refresh.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle that performs a single exchange.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle for the next exchange.
	///
	/// Non-2xx responses are not transport failures: handles return them as ordinary
	/// [`HttpResponse`] values and the client applies its status-validation policy.
	fn handle(&self) -> Self::Handle;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

#[cfg(feature = "reqwest")]
/// Handle returned by [`ReqwestHttpClient`] that satisfies [`AsyncHttpClient`].
#[derive(Clone)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Maps a transport failure into a client [`Error`].
pub fn map_transport_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { message }.into(),
		other => TransportError::Other { message: other.to_string() }.into(),
	}
}

/// Reads a `Retry-After` hint (delta-seconds or an RFC 2822 date) as a relative duration.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(header::RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

/// Converts string header pairs into a validated [`HeaderMap`].
pub(crate) fn header_map<'a, I>(pairs: I) -> Result<HeaderMap>
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let mut map = HeaderMap::new();

	for (name, value) in pairs {
		let invalid = || ConfigError::InvalidHeader { name: name.to_owned() };
		let name_new = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
		let value_new = HeaderValue::from_str(value).map_err(|_| invalid())?;

		map.insert(name_new, value_new);
	}

	Ok(map)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn retry_after_reads_delta_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(header::RETRY_AFTER, HeaderValue::from_static("12"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(12)));
	}

	#[test]
	fn retry_after_ignores_past_dates_and_garbage() {
		let mut headers = HeaderMap::new();

		headers.insert(
			header::RETRY_AFTER,
			HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
		);

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(header::RETRY_AFTER, HeaderValue::from_static("soon"));

		assert_eq!(parse_retry_after(&headers), None);
		assert_eq!(parse_retry_after(&HeaderMap::new()), None);
	}

	#[test]
	fn header_map_rejects_invalid_names() {
		let map = header_map([("Authorization", "Bearer a1"), ("refresh", "r1")])
			.expect("Valid header pairs should convert.");

		assert_eq!(map.get("authorization").and_then(|v| v.to_str().ok()), Some("Bearer a1"));

		let err = header_map([("bad header", "x")]).expect_err("Spaces are not valid in names.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidHeader { .. })));
	}

	#[test]
	fn transport_errors_map_to_client_errors() {
		let err = map_transport_error::<std::io::Error>(HttpClientError::Other("boom".into()));

		assert!(matches!(err, Error::Transport(TransportError::Other { .. })));

		let err = map_transport_error::<std::io::Error>(HttpClientError::Io(
			std::io::Error::other("reset"),
		));

		assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	}
}
