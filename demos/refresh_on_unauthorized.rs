//! Demonstrates a service client recovering from an expired access token.
//!
//! The mock service rejects the stale token, the client refreshes once through the configured
//! refresh endpoint, stores the rotated pair, and replays the original request.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use service_http::{
	auth::{CredentialPort, MemoryCredentials, TokenPair},
	config::{ClientOptions, DataType},
	factory::ServiceHandler,
	http::ReqwestHttpClient,
	interceptor::Interceptor,
	refresh::RefreshConfig,
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let stale = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/orders/v1/recent")
				.header("authorization", "Bearer stale-access");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/orders/v1/auth/refresh").header("refresh", "demo-refresh");
			then.status(200).header("content-type", "application/json").body(
				"{\"data\":{\"accessToken\":\"fresh-access\",\"refreshToken\":\"fresh-refresh\"}}",
			);
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/orders/v1/recent")
				.header("authorization", "Bearer fresh-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":42,\"total\":1999}]");
		})
		.await;
	let credentials =
		Arc::new(MemoryCredentials::with_pair(TokenPair::new("stale-access", "demo-refresh")));
	// The mock server terminates TLS with a self-signed certificate.
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let handler = ServiceHandler::new(http_client, [("orders", server.url("/orders"))]);
	let client = handler.service(
		"orders",
		Some("v1"),
		ClientOptions::default().accept(DataType::Json).interceptor(
			Interceptor::default().with_token_config(
				RefreshConfig::new(credentials.clone())
					.with_refresh_endpoint("/auth/refresh")
					.with_access_endpoint("/auth/login"),
			),
		),
	)?;
	let response = client.get("/recent").await?;

	println!("Recent orders: {}.", response.text());
	println!(
		"Stored access token after refresh: {}.",
		credentials.access_token().map(|token| token.expose().to_owned()).unwrap_or_default()
	);

	stale.assert_async().await;
	refresh.assert_async().await;
	fresh.assert_async().await;

	Ok(())
}
