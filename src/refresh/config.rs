//! Refresh configuration: credential port, endpoints, and auth header formatting.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPort, TokenSecret},
	http::{self, HeaderMap},
};

/// Formats the headers sent to the refresh endpoint from the current access and refresh tokens.
pub type AuthHeaderFormatter =
	Arc<dyn Fn(&TokenSecret, Option<&TokenSecret>) -> BTreeMap<String, String> + Send + Sync>;

/// Caller-supplied refresh configuration attached to an
/// [`Interceptor`](crate::interceptor::Interceptor).
#[derive(Clone)]
pub struct RefreshConfig {
	/// Credential storage read by the stamping hook and rotated by the coordinator.
	pub credentials: Arc<dyn CredentialPort>,
	/// Endpoint that exchanges the current pair for a new one.
	pub refresh_endpoint: Option<String>,
	/// Login/token-issuance endpoint whose failures never trigger a refresh.
	pub access_endpoint: Option<String>,
	formatter: Option<AuthHeaderFormatter>,
}
impl RefreshConfig {
	/// Creates a configuration backed by `credentials` with no endpoints set.
	pub fn new(credentials: Arc<dyn CredentialPort>) -> Self {
		Self { credentials, refresh_endpoint: None, access_endpoint: None, formatter: None }
	}

	/// Sets the refresh endpoint path.
	pub fn with_refresh_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.refresh_endpoint = Some(endpoint.into());

		self
	}

	/// Sets the access (login) endpoint path exempted from refresh.
	pub fn with_access_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.access_endpoint = Some(endpoint.into());

		self
	}

	/// Overrides how the refresh exchange presents the current tokens.
	pub fn with_auth_header_formatter<F>(mut self, formatter: F) -> Self
	where
		F: 'static
			+ Fn(&TokenSecret, Option<&TokenSecret>) -> BTreeMap<String, String>
			+ Send
			+ Sync,
	{
		self.formatter = Some(Arc::new(formatter));

		self
	}

	/// Whether `path` targets the access endpoint.
	pub fn is_access_endpoint(&self, path: &str) -> bool {
		self.access_endpoint.as_deref() == Some(path)
	}

	/// Builds the refresh-exchange auth headers.
	///
	/// Defaults to `Authorization: Bearer <token>` plus `refresh: <refresh token>`.
	pub fn auth_headers(
		&self,
		token: &TokenSecret,
		refresh_token: Option<&TokenSecret>,
	) -> Result<HeaderMap> {
		let pairs = match &self.formatter {
			Some(formatter) => formatter(token, refresh_token),
			None => default_auth_headers(token, refresh_token),
		};

		http::header_map(pairs.iter().map(|(name, value)| (name.as_str(), value.as_str())))
	}
}
impl Debug for RefreshConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshConfig")
			.field("refresh_endpoint", &self.refresh_endpoint)
			.field("access_endpoint", &self.access_endpoint)
			.field("custom_formatter", &self.formatter.is_some())
			.finish()
	}
}

fn default_auth_headers(
	token: &TokenSecret,
	refresh_token: Option<&TokenSecret>,
) -> BTreeMap<String, String> {
	let mut headers = BTreeMap::new();

	headers.insert("Authorization".into(), token.bearer());

	if let Some(refresh_token) = refresh_token {
		headers.insert("refresh".into(), refresh_token.expose().to_owned());
	}

	headers
}
