#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use bankbridge::{
	_preludet::*,
	auth::{PendingHandshake, ProviderId, TokenSecret, UserId},
	error::HandshakeError,
	provider::ProviderDescriptor,
	store::{BankTokenStore, RequestTokenStore},
};

const CONSUMER_KEY: &str = "consumer-key";
const CONSUMER_SECRET: &str = "consumer-secret";

fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	let provider_id = ProviderId::new("mock-bank")
		.expect("Provider identifier should be valid for handshake tests.");

	ProviderDescriptor::builder(provider_id)
		.base_url(
			Url::parse(&server.url("")).expect("Mock server base URL should parse successfully."),
		)
		.callback(
			Url::parse("https://app.example.com/banking/callback")
				.expect("Callback URL should parse successfully."),
		)
		.build()
		.expect("Provider descriptor should build successfully.")
}

fn owner() -> UserId {
	UserId::new("user-handshake").expect("User identifier should be valid for handshake tests.")
}

#[tokio::test]
async fn handshake_round_trip_persists_a_credential() {
	let server = MockServer::start_async().await;
	let (broker, backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let initiate_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/initiate").header_exists("authorization");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=req-token-1&oauth_token_secret=req-secret-1");
		})
		.await;
	let redirect = broker.start_handshake().await.expect("Handshake start should succeed.");

	initiate_mock.assert_async().await;

	assert_eq!(redirect.request_token, "req-token-1");
	assert!(redirect.authorize_url.path().ends_with("/oauth/authorize"));
	assert_eq!(redirect.authorize_url.query(), Some("oauth_token=req-token-1"));

	// The exchange leg answers in JSON to exercise content-type detection end to end.
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").header_exists("authorization");
			then.status(200).header("content-type", "application/json").body(
				"{\"oauth_token\":\"access-token-1\",\"oauth_token_secret\":\"access-secret-1\"}",
			);
		})
		.await;
	let user = owner();
	let credential = broker
		.complete_handshake(&user, &redirect.request_token, "verifier-1")
		.await
		.expect("Handshake completion should succeed.");

	token_mock.assert_async().await;

	assert_eq!(credential.user_id, user);
	assert_eq!(credential.access_token.expose(), "access-token-1");
	assert_eq!(
		credential.access_token_secret.as_ref().map(|secret| secret.expose()),
		Some("access-secret-1")
	);

	let stored = backends
		.tokens
		.find_by_id(&user, &credential.id)
		.await
		.expect("Credential lookup should succeed.")
		.expect("Credential should be persisted after the handshake.");

	assert_eq!(stored.access_token.expose(), "access-token-1");
}

#[tokio::test]
async fn completing_twice_rejects_the_replayed_request_token() {
	let server = MockServer::start_async().await;
	let (broker, _backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let _initiate_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/initiate");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=req-token-replay&oauth_token_secret=req-secret-replay");
		})
		.await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=access-token-replay&oauth_token_secret=access-secret-replay");
		})
		.await;
	let redirect = broker.start_handshake().await.expect("Handshake start should succeed.");
	let user = owner();

	broker
		.complete_handshake(&user, &redirect.request_token, "verifier-1")
		.await
		.expect("First completion should succeed.");

	let err = broker
		.complete_handshake(&user, &redirect.request_token, "verifier-1")
		.await
		.expect_err("Replayed request token must be rejected.");

	assert!(matches!(err, Error::Handshake(HandshakeError::SessionExpired)));

	// The provider only saw the one legitimate exchange.
	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn expired_request_tokens_cannot_complete() {
	let server = MockServer::start_async().await;
	let (broker, backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=access&oauth_token_secret=secret");
		})
		.await;
	let stale = PendingHandshake::new(
		"req-stale",
		TokenSecret::new("req-secret"),
		OffsetDateTime::now_utc() - Duration::minutes(20),
	);

	backends.pending.insert(stale).await.expect("Seeding the stale session should succeed.");

	let err = broker
		.complete_handshake(&owner(), "req-stale", "verifier-1")
		.await
		.expect_err("Expired request token must be rejected.");

	assert!(matches!(err, Error::Handshake(HandshakeError::SessionExpired)));

	// The exchange leg is never attempted for a dead session.
	token_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_exchange_consumes_the_request_token() {
	let server = MockServer::start_async().await;
	let (broker, _backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let _initiate_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/initiate");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=req-token-reject&oauth_token_secret=req-secret-reject");
		})
		.await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(502).body("upstream handshake service unavailable");
		})
		.await;
	let redirect = broker.start_handshake().await.expect("Handshake start should succeed.");
	let user = owner();
	let err = broker
		.complete_handshake(&user, &redirect.request_token, "verifier-1")
		.await
		.expect_err("Rejected exchange must surface an error.");

	assert!(matches!(
		err,
		Error::Handshake(HandshakeError::ExchangeRejected { status: 502, .. })
	));
	// Handshake legs are non-idempotent writes; a failed exchange is not retried.
	token_mock.assert_calls_async(1).await;

	let err = broker
		.complete_handshake(&user, &redirect.request_token, "verifier-1")
		.await
		.expect_err("The request token is spent even when the exchange failed.");

	assert!(matches!(err, Error::Handshake(HandshakeError::SessionExpired)));
}

#[tokio::test]
async fn relinking_rotates_the_stored_credential_in_place() {
	let server = MockServer::start_async().await;
	let (broker, backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let _initiate_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/initiate");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=req-token-a&oauth_token_secret=req-secret-a");
		})
		.await;
	let first_exchange = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=access-first&oauth_token_secret=secret-first");
		})
		.await;
	let user = owner();
	let redirect = broker.start_handshake().await.expect("First handshake start should succeed.");
	let first = broker
		.complete_handshake(&user, &redirect.request_token, "verifier-1")
		.await
		.expect("First completion should succeed.");

	first_exchange.delete_async().await;

	let _second_exchange = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=access-second&oauth_token_secret=secret-second");
		})
		.await;
	let redirect = broker.start_handshake().await.expect("Second handshake start should succeed.");
	let second = broker
		.complete_handshake(&user, &redirect.request_token, "verifier-2")
		.await
		.expect("Second completion should succeed.");

	assert_eq!(second.id, first.id, "re-linking must rotate, not duplicate");
	assert_eq!(second.access_token.expose(), "access-second");

	let stored = backends
		.tokens
		.list_for_user(&user)
		.await
		.expect("Credential listing should succeed.");

	assert_eq!(stored.len(), 1);
	assert_eq!(stored[0].access_token.expose(), "access-second");
	assert!(stored[0].updated_at >= stored[0].created_at);
}
