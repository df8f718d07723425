//! Secure token secret wrapper that redacts sensitive material.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{HeaderValue, header},
};

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the secret carries no material at all.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Renders the `Bearer <token>` credential.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}

	/// Builds an `Authorization` value flagged as sensitive so it is redacted from debug output.
	pub fn bearer_header(&self) -> Result<HeaderValue> {
		let mut value = HeaderValue::from_str(&self.bearer())
			.map_err(|_| ConfigError::InvalidHeader { name: header::AUTHORIZATION.to_string() })?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn secret_serializes_as_plain_string() {
		let payload = serde_json::to_string(&TokenSecret::new("a2"))
			.expect("Token secret should serialize to JSON.");

		assert_eq!(payload, "\"a2\"");
	}

	#[test]
	fn bearer_header_is_sensitive() {
		let value = TokenSecret::new("a1").bearer_header().expect("Plain token should encode.");

		assert!(value.is_sensitive());
		assert_eq!(value.to_str().expect("Header should be ASCII."), "Bearer a1");
		assert!(matches!(
			TokenSecret::new("a1
").bearer_header(),
			Err(Error::Config(ConfigError::InvalidHeader { .. }))
		));
	}
}
