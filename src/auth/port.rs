//! Caller-implemented credential storage contract consumed by the pipeline and coordinator.

// self
use crate::auth::{TokenPair, TokenSecret};

/// Capability set the client uses to read, rotate, and clear caller-owned credentials.
///
/// Implementations must be cheap and non-blocking: the request hook reads the access token on
/// every outgoing request and the refresh coordinator writes from inside an async task.
pub trait CredentialPort
where
	Self: Send + Sync,
{
	/// Returns the current access token, if one is stored.
	fn access_token(&self) -> Option<TokenSecret>;

	/// Returns the current refresh token, if one is stored.
	fn refresh_token(&self) -> Option<TokenSecret>;

	/// Replaces the stored access token.
	fn set_access_token(&self, token: TokenSecret);

	/// Replaces the stored refresh token.
	fn set_refresh_token(&self, token: TokenSecret);

	/// Removes the stored access token.
	fn remove_access_token(&self);

	/// Removes the stored refresh token.
	fn remove_refresh_token(&self);

	/// Notified once per failed refresh episode, after credentials were cleared.
	fn on_token_expired(&self) {}

	/// Persists a freshly issued pair.
	///
	/// Override when both secrets can be written under one lock so readers never observe a
	/// mixed pair.
	fn store_pair(&self, pair: TokenPair) {
		self.set_access_token(pair.access_token);
		self.set_refresh_token(pair.refresh_token);
	}

	/// Clears both secrets.
	fn clear(&self) {
		self.remove_access_token();
		self.remove_refresh_token();
	}
}
