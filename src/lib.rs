//! Per-service HTTP clients with versioned base URLs, content negotiation, and an interceptor
//! pipeline whose refresh coordinator replays requests after a single-flight bearer token
//! refresh.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod factory;
pub mod http;
pub mod interceptor;
pub mod obs;
pub mod refresh;
pub mod request;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{MemoryCredentials, TokenPair},
		client::ServiceClient,
		config::ClientOptions,
		http::ReqwestHttpClient,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ServiceClient<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`ServiceClient`] for `base_url` backed by the insecure test transport.
	pub fn build_reqwest_test_client(base_url: &str, options: ClientOptions) -> ReqwestTestClient {
		ServiceClient::new(test_reqwest_http_client(), base_url, options)
			.expect("Failed to build service client for tests.")
	}

	/// Builds an in-memory credential store seeded with the provided pair.
	pub fn seeded_credentials(access: &str, refresh: &str) -> Arc<MemoryCredentials> {
		Arc::new(MemoryCredentials::with_pair(TokenPair::new(access, refresh)))
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
