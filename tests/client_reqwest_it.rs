#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use service_http::{
	_preludet::*,
	auth::CredentialPort,
	config::{ClientOptions, DataType},
	factory::ServiceHandler,
	http::{HeaderMap, StatusCode},
	interceptor::Interceptor,
	refresh::RefreshConfig,
	request::{FailedRequest, ServiceResponse},
};

const ROTATED: &str = "{\"data\":{\"accessToken\":\"a2\",\"refreshToken\":\"r2\"}}";

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
	id: u64,
	name: String,
}

fn refresh_options(server: &MockServer, config: RefreshConfig) -> (String, ClientOptions) {
	(
		server.url("/svc"),
		ClientOptions::default()
			.version("v1")
			.interceptor(Interceptor::default().with_token_config(config)),
	)
}

#[tokio::test]
async fn unauthorized_request_refreshes_and_replays() {
	let server = MockServer::start_async().await;
	let credentials = seeded_credentials("a1", "r1");
	let stale = server
		.mock_async(|when, then| {
			when.method(GET).path("/svc/v1/items/7").header("authorization", "Bearer a1");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/svc/v1/auth/refresh")
				.header("authorization", "Bearer a1")
				.header("refresh", "r1")
				.body("{}");
			then.status(200).header("content-type", "application/json").body(ROTATED);
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(GET).path("/svc/v1/items/7").header("authorization", "Bearer a2");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":7,\"name\":\"widget\"}");
		})
		.await;
	let (base, options) = refresh_options(
		&server,
		RefreshConfig::new(credentials.clone()).with_refresh_endpoint("/auth/refresh"),
	);
	let client = build_reqwest_test_client(&base, options);
	let item = client
		.get("/items/7")
		.await
		.expect("Request should succeed after the refresh.")
		.json::<Item>()
		.expect("Replayed response should decode.");

	assert_eq!(item, Item { id: 7, name: "widget".into() });

	stale.assert_async().await;
	refresh.assert_async().await;
	fresh.assert_async().await;

	assert_eq!(credentials.access_token().map(|t| t.expose().to_owned()), Some("a2".into()));
	assert_eq!(credentials.refresh_token().map(|t| t.expose().to_owned()), Some("r2".into()));
}

#[tokio::test]
async fn rejected_refresh_clears_credentials() {
	let server = MockServer::start_async().await;
	let credentials = seeded_credentials("a1", "r1");
	let stale = server
		.mock_async(|when, then| {
			when.method(GET).path("/svc/v1/items");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/svc/v1/auth/refresh");
			then.status(403).body("{\"message\":\"refresh token revoked\"}");
		})
		.await;
	let (base, options) = refresh_options(
		&server,
		RefreshConfig::new(credentials.clone()).with_refresh_endpoint("/auth/refresh"),
	);
	let client = build_reqwest_test_client(&base, options);
	let err = client.get("/items").await.expect_err("Revoked refresh token should fail.");

	match err {
		Error::RefreshFailed { source } => assert_eq!(source.status(), Some(403)),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	stale.assert_async().await;
	refresh.assert_async().await;

	assert!(credentials.is_empty());
	assert_eq!(credentials.expirations(), 1);
}

#[tokio::test]
async fn custom_error_hook_replaces_refresh() {
	let server = MockServer::start_async().await;
	let credentials = seeded_credentials("a1", "r1");
	let stale = server
		.mock_async(|when, then| {
			when.method(GET).path("/svc/v1/items");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/svc/v1/auth/refresh");
			then.status(200).body(ROTATED);
		})
		.await;
	let interceptor = Interceptor::default()
		.with_token_config(
			RefreshConfig::new(credentials.clone()).with_refresh_endpoint("/auth/refresh"),
		)
		.with_error_hook(|failed: FailedRequest| async move {
			assert!(failed.error.is_unauthorized());

			Ok(ServiceResponse {
				status: StatusCode::OK,
				headers: HeaderMap::new(),
				body: b"fallback".to_vec(),
			})
		});
	let client = build_reqwest_test_client(
		&server.url("/svc"),
		ClientOptions::default().version("v1").interceptor(interceptor),
	);
	let response = client.get("/items").await.expect("Custom hook should recover.");

	assert_eq!(response.text(), "fallback");
	assert!(client.refresh_coordinator().is_none());

	stale.assert_async().await;
	refresh.assert_calls_async(0).await;

	assert_eq!(credentials.access_token().map(|t| t.expose().to_owned()), Some("a1".into()));
}

#[tokio::test]
async fn custom_formatter_supplies_refresh_headers() {
	let server = MockServer::start_async().await;
	let credentials = seeded_credentials("a1", "r1");
	let _stale = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/svc/v1/items/3").header("authorization", "Bearer a1");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/svc/v1/session/renew")
				.header("x-access-token", "a1")
				.header("x-refresh-token", "r1");
			then.status(200).body(ROTATED);
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/svc/v1/items/3").header("authorization", "Bearer a2");
			then.status(204);
		})
		.await;
	let config = RefreshConfig::new(credentials.clone())
		.with_refresh_endpoint("/session/renew")
		.with_auth_header_formatter(|token, refresh| {
			let mut headers = BTreeMap::new();

			headers.insert("x-access-token".to_owned(), token.expose().to_owned());

			if let Some(refresh) = refresh {
				headers.insert("x-refresh-token".to_owned(), refresh.expose().to_owned());
			}

			headers
		});
	let (base, options) = refresh_options(&server, config);
	let client = build_reqwest_test_client(&base, options);
	let response = client.delete("/items/3").await.expect("Delete should succeed after refresh.");

	assert_eq!(response.status, StatusCode::NO_CONTENT);

	refresh.assert_async().await;
	fresh.assert_async().await;
}

#[tokio::test]
async fn non_unauthorized_failures_propagate_with_retry_after() {
	let server = MockServer::start_async().await;
	let credentials = seeded_credentials("a1", "r1");
	let busy = server
		.mock_async(|when, then| {
			when.method(GET).path("/svc/v1/items");
			then.status(503).header("retry-after", "5").body("busy");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/svc/v1/auth/refresh");
			then.status(200).body(ROTATED);
		})
		.await;
	let (base, options) = refresh_options(
		&server,
		RefreshConfig::new(credentials.clone()).with_refresh_endpoint("/auth/refresh"),
	);
	let client = build_reqwest_test_client(&base, options);
	let err = client.get("/items").await.expect_err("503 should propagate.");

	match err {
		Error::Status { status, retry_after, body } => {
			assert_eq!(status, 503);
			assert_eq!(retry_after, Some(Duration::seconds(5)));
			assert_eq!(body, b"busy");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	busy.assert_async().await;
	refresh.assert_calls_async(0).await;
}

#[tokio::test]
async fn handler_applies_version_and_content_headers() {
	let server = MockServer::start_async().await;
	let created = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/users/v2/profiles")
				.header("content-type", "application/json; charset=utf-8")
				.header("accept", "application/json")
				.json_body(serde_json::json!({ "id": 1, "name": "ada" }));
			then.status(201).body("{\"id\":1,\"name\":\"ada\"}");
		})
		.await;
	let handler =
		ServiceHandler::new(test_reqwest_http_client(), [("users", server.url("/users"))]);
	let client = handler
		.service(
			"users",
			Some("v2"),
			ClientOptions::default()
				.content_type(DataType::Json)
				.charset("utf-8")
				.accept(DataType::Json),
		)
		.expect("Registered service should build.");
	let response = client
		.post_json("/profiles", &serde_json::json!({ "id": 1, "name": "ada" }))
		.await
		.expect("Create should succeed.");

	assert_eq!(response.status, StatusCode::CREATED);
	assert_eq!(
		response.json::<Item>().expect("Created profile should decode."),
		Item { id: 1, name: "ada".into() },
	);

	created.assert_async().await;
}

#[tokio::test]
async fn missing_token_config_propagates_unauthorized() {
	let server = MockServer::start_async().await;
	let denied = server
		.mock_async(|when, then| {
			when.method(GET).path("/open/ping");
			then.status(401);
		})
		.await;
	let client = build_reqwest_test_client(&server.url("/open"), ClientOptions::default());
	let err = client.get("/ping").await.expect_err("401 without a token config should propagate.");

	assert!(err.is_unauthorized());

	denied.assert_async().await;
}
