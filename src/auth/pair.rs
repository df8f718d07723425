//! Access/refresh token pair issued by a refresh exchange.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access and refresh secrets that are always stored and replaced together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
	/// Bearer credential attached to outgoing requests.
	pub access_token: TokenSecret,
	/// Secret presented to the refresh endpoint.
	pub refresh_token: TokenSecret,
}
impl TokenPair {
	/// Creates a pair from raw token strings.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
		}
	}
}

/// Refresh endpoint payload, nested once under a `data` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshEnvelope {
	pub(crate) data: TokenPair,
}
