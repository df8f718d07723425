//! Thread-safe in-memory [`CredentialPort`] implementation for local development and tests.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{CredentialPort, TokenPair, TokenSecret},
};

#[derive(Clone, Debug, Default)]
struct Slots {
	access: Option<TokenSecret>,
	refresh: Option<TokenSecret>,
}

/// Credential store that keeps secrets in-process and counts clears and expiry notifications.
#[derive(Debug, Default)]
pub struct MemoryCredentials {
	slots: RwLock<Slots>,
	clears: AtomicU64,
	expirations: AtomicU64,
}
impl MemoryCredentials {
	/// Creates a store seeded with the provided pair.
	pub fn with_pair(pair: TokenPair) -> Self {
		let slots = Slots { access: Some(pair.access_token), refresh: Some(pair.refresh_token) };

		Self { slots: RwLock::new(slots), ..Default::default() }
	}

	/// Returns the stored pair when both secrets are present.
	pub fn pair(&self) -> Option<TokenPair> {
		let slots = self.slots.read();

		match (&slots.access, &slots.refresh) {
			(Some(access), Some(refresh)) =>
				Some(TokenPair { access_token: access.clone(), refresh_token: refresh.clone() }),
			_ => None,
		}
	}

	/// Whether neither secret is stored.
	pub fn is_empty(&self) -> bool {
		let slots = self.slots.read();

		slots.access.is_none() && slots.refresh.is_none()
	}

	/// Returns how many times [`CredentialPort::clear`] ran.
	pub fn clears(&self) -> u64 {
		self.clears.load(Ordering::Relaxed)
	}

	/// Returns how many times [`CredentialPort::on_token_expired`] fired.
	pub fn expirations(&self) -> u64 {
		self.expirations.load(Ordering::Relaxed)
	}
}
impl CredentialPort for MemoryCredentials {
	fn access_token(&self) -> Option<TokenSecret> {
		self.slots.read().access.clone()
	}

	fn refresh_token(&self) -> Option<TokenSecret> {
		self.slots.read().refresh.clone()
	}

	fn set_access_token(&self, token: TokenSecret) {
		self.slots.write().access = Some(token);
	}

	fn set_refresh_token(&self, token: TokenSecret) {
		self.slots.write().refresh = Some(token);
	}

	fn remove_access_token(&self) {
		self.slots.write().access = None;
	}

	fn remove_refresh_token(&self) {
		self.slots.write().refresh = None;
	}

	fn on_token_expired(&self) {
		self.expirations.fetch_add(1, Ordering::Relaxed);
	}

	fn store_pair(&self, pair: TokenPair) {
		let mut slots = self.slots.write();

		slots.access = Some(pair.access_token);
		slots.refresh = Some(pair.refresh_token);
	}

	fn clear(&self) {
		*self.slots.write() = Slots::default();

		self.clears.fetch_add(1, Ordering::Relaxed);
	}
}
