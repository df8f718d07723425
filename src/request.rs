//! Request descriptors, validated responses, and failed-exchange records.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{self, HeaderMap, Method, StatusCode},
};

/// Outgoing request descriptor as seen by the interceptor pipeline.
///
/// The descriptor owns its body, so replaying it after a token refresh sends a deep copy of the
/// original bytes.
#[derive(Clone, Debug)]
pub struct ServiceRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the client base URL, or an absolute `http(s)://` URL.
	pub path: String,
	/// Per-request headers; they override the client defaults.
	pub headers: HeaderMap,
	/// Raw request body.
	pub body: Vec<u8>,
	retried: bool,
}
impl ServiceRequest {
	/// Creates a request with no headers and an empty body.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			headers: HeaderMap::new(),
			body: Vec::new(),
			retried: false,
		}
	}

	/// Replaces the request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}

	/// Serializes `payload` as the JSON request body.
	pub fn with_json<T>(mut self, payload: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		self.body = serde_json::to_vec(payload).map_err(ConfigError::from)?;

		Ok(self)
	}

	/// Merges `headers` into the per-request headers.
	pub fn with_headers(mut self, headers: HeaderMap) -> Self {
		self.headers.extend(headers);

		self
	}

	/// Sets a single header, validating the name and value.
	pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
		self.headers.extend(http::header_map([(name, value)])?);

		Ok(self)
	}

	/// Whether this request was already replayed after a token refresh.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	pub(crate) fn mark_retried(&mut self) {
		self.retried = true;
	}
}

/// Response that passed the client's status-validation policy.
#[derive(Clone, Debug)]
pub struct ServiceResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ServiceResponse {
	/// Deserializes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { source, status: self.status.as_u16() })
	}

	/// Returns the body as UTF-8 text, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// A request paired with the failure its exchange produced, handed to the error hook.
#[derive(Debug)]
pub struct FailedRequest {
	/// Descriptor of the request that failed, before auth stamping.
	pub request: ServiceRequest,
	/// Failure reported by the transport or the status-validation policy.
	pub error: Error,
}
impl FailedRequest {
	/// Pairs a request with its failure.
	pub fn new(request: ServiceRequest, error: Error) -> Self {
		Self { request, error }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Profile {
		#[allow(dead_code)]
		id: u64,
	}

	#[test]
	fn requests_start_unretried_and_mark_once() {
		let mut request = ServiceRequest::new(Method::GET, "/profile");

		assert!(!request.is_retried());

		request.mark_retried();

		assert!(request.is_retried());
		assert!(request.clone().is_retried());
	}

	#[test]
	fn json_body_and_headers_are_attached() {
		let request = ServiceRequest::new(Method::POST, "/items")
			.with_json(&serde_json::json!({ "name": "widget" }))
			.expect("JSON body should serialize.")
			.with_header("x-trace", "t-1")
			.expect("Header should be valid.");

		assert_eq!(request.body, b"{\"name\":\"widget\"}");
		assert_eq!(request.headers.get("x-trace").and_then(|v| v.to_str().ok()), Some("t-1"));
	}

	#[test]
	fn json_decode_reports_path() {
		let response = ServiceResponse {
			status: StatusCode::OK,
			headers: HeaderMap::new(),
			body: b"{\"id\":\"not-a-number\"}".to_vec(),
		};
		let err = response.json::<Profile>().expect_err("Mismatched payload should fail.");

		match err {
			Error::Decode { source, status } => {
				assert_eq!(source.path().to_string(), "id");
				assert_eq!(status, 200);
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
