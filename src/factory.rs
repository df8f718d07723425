//! Service handler that maps logical service names to base paths and builds clients for them.

// self
use crate::{
	_prelude::*,
	client::ServiceClient,
	config::ClientOptions,
	error::ConfigError,
	http::HttpTransport,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Registry of named services sharing one transport.
///
/// Every [`ServiceHandler::service`] call builds an independent [`ServiceClient`] with its own
/// refresh state, so credentials rotating for one service never queue requests of another.
pub struct ServiceHandler<C>
where
	C: HttpTransport,
{
	transport: Arc<C>,
	services: BTreeMap<String, String>,
}
impl<C> ServiceHandler<C>
where
	C: HttpTransport,
{
	/// Creates a handler over `services`, given as `(name, base path)` pairs.
	pub fn new<I, K, V>(transport: impl Into<Arc<C>>, services: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			transport: transport.into(),
			services: services.into_iter().map(|(name, base)| (name.into(), base.into())).collect(),
		}
	}

	/// Registers or replaces a service base path.
	pub fn register(mut self, name: impl Into<String>, base_path: impl Into<String>) -> Self {
		self.services.insert(name.into(), base_path.into());

		self
	}

	/// Returns the registered service names in order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.services.keys().map(String::as_str)
	}

	/// Returns the base path registered for `name`.
	pub fn base_path(&self, name: &str) -> Option<&str> {
		self.services.get(name).map(String::as_str)
	}

	/// Builds a client for `name`.
	///
	/// `version` always wins over [`ClientOptions::version`].
	pub fn service(
		&self,
		name: &str,
		version: Option<&str>,
		options: ClientOptions,
	) -> Result<ServiceClient<C>> {
		let base_path = self
			.base_path(name)
			.ok_or_else(|| ConfigError::UnknownService { name: name.to_owned() })?;
		let options = ClientOptions { version: version.map(str::to_owned), ..options };

		ServiceClient::new(self.transport.clone(), base_path, options)
	}
}
#[cfg(feature = "reqwest")]
impl ServiceHandler<ReqwestHttpClient> {
	/// Creates a handler backed by a default reqwest transport.
	pub fn with_reqwest<I, K, V>(services: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self::new(ReqwestHttpClient::default(), services)
	}
}
impl<C> Debug for ServiceHandler<C>
where
	C: HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ServiceHandler").field("services", &self.services).finish()
	}
}
