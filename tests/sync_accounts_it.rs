#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use bankbridge::{
	_preludet::*,
	auth::{BankToken, NewBankToken, ProviderId, TokenId, UserId},
	error::RemoteError,
	flows::ReqwestBroker,
	ledger::AccountKind,
	provider::ProviderDescriptor,
	remote::RetryPolicy,
	store::AccountStore,
	sync::SyncAction,
};

const CONSUMER_KEY: &str = "consumer-key";
const CONSUMER_SECRET: &str = "consumer-secret";

fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	let provider_id =
		ProviderId::new("mock-bank").expect("Provider identifier should be valid for sync tests.");

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
	UserId::new("user-sync").expect("User identifier should be valid for sync tests.")
}

async fn seed_credential(broker: &ReqwestBroker, user: &UserId) -> BankToken {
	let draft = NewBankToken::builder(user.clone(), broker.remote.descriptor.id.clone())
		.access_token("access-token")
		.access_token_secret("access-secret")
		.build()
		.expect("Credential fixture should build successfully.");

	broker.create_credential(draft).await.expect("Seeding the credential should succeed.")
}

#[tokio::test]
async fn account_sync_creates_then_updates_without_duplicates() {
	let server = MockServer::start_async().await;
	let (broker, backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let user = owner();
	let credential = seed_credential(&broker, &user).await;
	let accounts_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/my/accounts").header_exists("authorization");
			then.status(200).header("content-type", "application/json").body(
				"{\"accounts\":[\
					{\"id\":\"remote-acc-1\",\"label\":\"Everyday Checking\",\"balance\":{\"amount\":\"120.55\",\"currency\":\"USD\"},\"account_type\":\"CURRENT\"},\
					{\"id\":\"remote-acc-2\",\"label\":\"Rainy Day\",\"balance\":{\"amount\":\"900.00\",\"currency\":\"EUR\"},\"account_type\":\"SAVINGS\"},\
					{\"id\":\"remote-acc-3\"}\
				]}",
			);
		})
		.await;
	let report = broker.sync_accounts(&user, None).await.expect("Account sync should succeed.");

	assert_eq!(report.synced, 3);
	assert!(report.errors.is_empty());
	assert!(report.accounts.iter().all(|item| item.action == SyncAction::Created));

	let stored = backends.accounts.list_for_user(&user).await.expect("Listing should succeed.");

	assert_eq!(stored.len(), 3);

	let checking = backends
		.accounts
		.find_by_external_id(&user, "remote-acc-1")
		.await
		.expect("Lookup should succeed.")
		.expect("Synced checking account should exist.");

	assert_eq!(checking.name, "Everyday Checking");
	assert_eq!(checking.kind, AccountKind::Checking);
	assert_eq!(checking.balance, Decimal::new(12_055, 2));
	assert_eq!(checking.currency, "USD");
	assert_eq!(checking.bank_id.as_ref(), Some(&credential.id));
	assert!(checking.last_synced_at.is_some());

	let savings = backends
		.accounts
		.find_by_external_id(&user, "remote-acc-2")
		.await
		.expect("Lookup should succeed.")
		.expect("Synced savings account should exist.");

	assert_eq!(savings.kind, AccountKind::Savings);
	assert_eq!(savings.currency, "EUR");

	// A bare record still lands, with the fallback name, kind, and currency.
	let bare = backends
		.accounts
		.find_by_external_id(&user, "remote-acc-3")
		.await
		.expect("Lookup should succeed.")
		.expect("Bare account should exist.");

	assert_eq!(bare.name, "remote-acc-3");
	assert_eq!(bare.kind, AccountKind::Other);
	assert_eq!(bare.balance, Decimal::ZERO);
	assert_eq!(bare.currency, "USD");

	// Re-running against the unchanged remote list updates in place.
	let second = broker.sync_accounts(&user, None).await.expect("Second sync should succeed.");

	assert_eq!(second.synced, 3);
	assert!(second.accounts.iter().all(|item| item.action == SyncAction::Updated));
	assert_eq!(
		backends.accounts.list_for_user(&user).await.expect("Listing should succeed.").len(),
		3,
		"re-running a sync must not duplicate accounts"
	);

	accounts_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn account_sync_isolates_a_malformed_record() {
	let server = MockServer::start_async().await;
	let (broker, backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let user = owner();
	let _credential = seed_credential(&broker, &user).await;
	let _accounts_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/my/accounts");
			then.status(200).header("content-type", "application/json").body(
				"{\"accounts\":[\
					{\"id\":\"remote-acc-1\",\"label\":\"Good One\",\"balance\":{\"amount\":\"10.00\"}},\
					{\"id\":\"remote-acc-2\",\"label\":\"Corrupt One\",\"balance\":{\"amount\":\"not-a-number\"}},\
					{\"id\":\"remote-acc-3\",\"label\":\"Good Two\",\"balance\":{\"amount\":\"20.00\"}}\
				]}",
			);
		})
		.await;
	let report = broker.sync_accounts(&user, None).await.expect("Account sync should succeed.");

	assert_eq!(report.synced, 2);
	assert_eq!(report.errors.len(), 1);
	assert_eq!(report.errors[0].label, "Corrupt One");
	assert!(report.errors[0].message.contains("not-a-number"));

	let stored = backends.accounts.list_for_user(&user).await.expect("Listing should succeed.");

	assert_eq!(stored.len(), 2, "the malformed record must not abort its neighbors");
	assert!(
		backends
			.accounts
			.find_by_external_id(&user, "remote-acc-2")
			.await
			.expect("Lookup should succeed.")
			.is_none()
	);
}

#[tokio::test]
async fn account_sync_without_a_credential_fails_fast() {
	let server = MockServer::start_async().await;
	let (broker, _backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let accounts_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/my/accounts");
			then.status(200).header("content-type", "application/json").body("{\"accounts\":[]}");
		})
		.await;
	let err = broker
		.sync_accounts(&owner(), None)
		.await
		.expect_err("Sync without a stored credential must fail.");

	assert!(matches!(err, Error::NoCredential { ref provider } if provider == "mock-bank"));

	// Nothing to sign with means no provider traffic at all.
	accounts_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn account_sync_rejects_an_unknown_token_id() {
	let server = MockServer::start_async().await;
	let (broker, _backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let user = owner();
	let _credential = seed_credential(&broker, &user).await;
	let unknown: TokenId = "tok-unknown".parse().expect("Token id fixture should be valid.");
	let err = broker
		.sync_accounts(&user, Some(&unknown))
		.await
		.expect_err("An explicit token id that does not exist must fail.");

	assert!(matches!(err, Error::NotFound { resource: "bank token" }));
}

#[tokio::test]
async fn account_sync_retries_server_errors_before_giving_up() {
	let server = MockServer::start_async().await;
	let (broker, _backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let broker =
		broker.with_retry_policy(RetryPolicy { max_attempts: 3, base_delay: Duration::ZERO });
	let user = owner();
	let _credential = seed_credential(&broker, &user).await;
	let accounts_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/my/accounts");
			then.status(500).body("database is on fire");
		})
		.await;
	let err = broker
		.sync_accounts(&user, None)
		.await
		.expect_err("A persistently failing endpoint must surface an error.");

	assert!(matches!(err, Error::Remote(RemoteError::Endpoint { status: 500, .. })));

	// Idempotent reads are retried up to the policy's attempt budget.
	accounts_mock.assert_calls_async(3).await;
}
