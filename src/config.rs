//! Client construction options and the defaults derived from them.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{self, HeaderMap, header},
	interceptor::Interceptor,
};

/// Media types supported for `Content-Type` and `Accept` negotiation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
	/// `application/json`
	#[default]
	Json,
	/// `application/x-www-form-urlencoded`
	FormUrlEncoded,
	/// `application/xml`
	Xml,
	/// `application/octet-stream`
	OctetStream,
	/// `multipart/form-data`
	MultipartFormData,
	/// `text/plain`
	TextPlain,
	/// `text/html`
	TextHtml,
}
impl DataType {
	/// Returns the MIME string sent on the wire.
	pub const fn as_str(self) -> &'static str {
		match self {
			DataType::Json => "application/json",
			DataType::FormUrlEncoded => "application/x-www-form-urlencoded",
			DataType::Xml => "application/xml",
			DataType::OctetStream => "application/octet-stream",
			DataType::MultipartFormData => "multipart/form-data",
			DataType::TextPlain => "text/plain",
			DataType::TextHtml => "text/html",
		}
	}
}
impl Display for DataType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Caller-facing options for building a [`ServiceClient`](crate::client::ServiceClient).
#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
	/// API version appended to the base URL.
	pub version: Option<String>,
	/// Default request body media type.
	pub content_type: DataType,
	/// Media type sent in the `Accept` header.
	pub accept: Option<DataType>,
	/// Charset suffix appended to `Content-Type`.
	pub charset: Option<String>,
	/// Interceptor pipeline configuration.
	pub interceptor: Option<Interceptor>,
}
impl ClientOptions {
	/// Sets the API version.
	pub fn version(mut self, version: impl Into<String>) -> Self {
		self.version = Some(version.into());

		self
	}

	/// Sets the request body media type.
	pub fn content_type(mut self, content_type: DataType) -> Self {
		self.content_type = content_type;

		self
	}

	/// Sets the `Accept` media type.
	pub fn accept(mut self, accept: DataType) -> Self {
		self.accept = Some(accept);

		self
	}

	/// Sets the charset suffix for `Content-Type`.
	pub fn charset(mut self, charset: impl Into<String>) -> Self {
		self.charset = Some(charset.into());

		self
	}

	/// Attaches an interceptor pipeline.
	pub fn interceptor(mut self, interceptor: Interceptor) -> Self {
		self.interceptor = Some(interceptor);

		self
	}
}

/// Base URL and default headers shared by every request a client sends.
#[derive(Clone, Debug)]
pub struct ClientDefaults {
	/// Base URL with the version segment already joined.
	pub base_url: String,
	/// Headers applied before per-request headers.
	pub headers: HeaderMap,
}
impl ClientDefaults {
	/// Derives defaults from a service base path and caller options.
	pub fn from_options(base_url: &str, options: &ClientOptions) -> Result<Self> {
		let base_url = match &options.version {
			Some(version) =>
				format!("{}/{}", base_url.trim_end_matches('/'), version.trim_start_matches('/')),
			None => base_url.to_owned(),
		};
		let content_type = match &options.charset {
			Some(charset) => format!("{}; charset={charset}", options.content_type),
			None => options.content_type.to_string(),
		};
		let mut headers =
			http::header_map([(header::CONTENT_TYPE.as_str(), content_type.as_str())])?;

		if let Some(accept) = options.accept {
			headers.extend(http::header_map([(header::ACCEPT.as_str(), accept.as_str())])?);
		}

		Ok(Self { base_url, headers })
	}

	/// Status-validation policy: anything below 400 is a success.
	pub fn validate_status(status: u16) -> bool {
		status < 400
	}

	/// Resolves a request path against the base URL.
	///
	/// Absolute `http(s)://` targets are used verbatim.
	pub fn resolve(&self, path: &str) -> Result<Url> {
		let target = if path.starts_with("http://") || path.starts_with("https://") {
			path.to_owned()
		} else if path.is_empty() {
			self.base_url.clone()
		} else {
			format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
		};

		Url::parse(&target)
			.map_err(|source| ConfigError::InvalidUrl { target, source }.into())
	}
}
