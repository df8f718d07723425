//! Client-level error types shared across the transport, pipeline, and refresh coordinator.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Response rejected by the status-validation policy (status >= 400).
	#[error("Request failed with HTTP status {status}.")]
	Status {
		/// HTTP status code returned by the service.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Raw response body.
		body: Vec<u8>,
	},
	/// Response body could not be decoded into the requested shape.
	#[error("Response body is not valid JSON for the requested type.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the decoded response.
		status: u16,
	},
	/// A custom interceptor rejected the exchange.
	#[error("Interceptor rejected the exchange: {message}.")]
	Hook {
		/// Interceptor-supplied message.
		message: String,
	},
	/// Token refresh failed; the same failure is delivered to every request that waited on it.
	#[error("Token refresh failed.")]
	RefreshFailed {
		/// Shared refresh failure.
		#[source]
		source: Arc<Error>,
	},
	/// The refresh owner was dropped before the refresh settled.
	#[error("Token refresh was abandoned before it settled.")]
	RefreshAbandoned,
}
impl Error {
	/// Wraps a custom interceptor rejection.
	pub fn hook(message: impl Into<String>) -> Self {
		Self::Hook { message: message.into() }
	}

	/// Returns the HTTP status carried by a rejected response.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } | Self::Decode { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Whether the failure is classified as "unauthorized" (HTTP 401).
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Status { status: 401, .. })
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Request target cannot be parsed into a URL.
	#[error("Request target `{target}` is not a valid URL.")]
	InvalidUrl {
		/// Target that failed to parse.
		target: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Header name or value is not representable on the wire.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	BodySerialize(#[from] serde_json::Error),
	/// No base path is registered for the requested service.
	#[error("Service `{name}` is not registered.")]
	UnknownService {
		/// Requested service name.
		name: String,
	},

	/// No non-empty access token is stored at refresh time.
	#[error("Credential store is missing an access token.")]
	MissingAccessToken,
	/// No non-empty refresh token is stored at refresh time.
	#[error("Credential store is missing a refresh token.")]
	MissingRefreshToken,
	/// Refresh configuration names no (or an empty) refresh endpoint.
	#[error("Refresh configuration is missing the refresh endpoint.")]
	MissingRefreshEndpoint,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the service.")]
	Io(#[from] std::io::Error),
	/// Transport reported a failure without a structured source.
	#[error("Transport failed: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
