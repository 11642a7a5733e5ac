#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use time::macros;
// self
use bankbridge::{
	_preludet::*,
	auth::{AccountId, BankToken, NewBankToken, ProviderId, UserId},
	flows::ReqwestBroker,
	ledger::{
		AccountKind, Category, FinancialAccount, ImportSource, NewFinancialAccount, SyncStatus,
		TransactionKind,
	},
	provider::ProviderDescriptor,
	store::{AccountStore, TransactionStore},
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

async fn seed_linked_account(
	backends: &TestStores,
	user: &UserId,
	credential: &BankToken,
	external_id: &str,
) -> FinancialAccount {
	backends
		.accounts
		.create(NewFinancialAccount {
			user_id: user.clone(),
			name: "Everyday Checking".into(),
			kind: AccountKind::Checking,
			balance: Decimal::ZERO,
			currency: "USD".into(),
			external_account_id: Some(external_id.to_owned()),
			bank_id: Some(credential.id.clone()),
			last_synced_at: None,
		})
		.await
		.expect("Seeding the linked account should succeed.")
}

#[tokio::test]
async fn transaction_sync_imports_and_classifies_new_records() {
	let server = MockServer::start_async().await;
	let (broker, backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let user = owner();
	let credential = seed_credential(&broker, &user).await;
	let account = seed_linked_account(&backends, &user, &credential, "remote-acc-1").await;
	let transactions_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/my/accounts/remote-acc-1/transactions")
				.query_param("limit", "200")
				.header_exists("authorization");
			then.status(200).header("content-type", "application/json").body(
				"{\"transactions\":[\
					{\"id\":\"remote-tx-1\",\"details\":{\"value\":{\"amount\":\"-42.50\"},\"description\":\"Shell Gas Station\"},\"counterparty\":{\"name\":\"Shell\"},\"booked_at\":\"2026-08-20T10:00:00Z\"},\
					{\"id\":\"remote-tx-2\",\"details\":{\"value\":{\"amount\":\"2500.00\"},\"description\":\"ACME Payroll Salary\"}},\
					{\"id\":\"remote-tx-3\",\"details\":{\"value\":{\"amount\":\"0\"},\"description\":\"Card Balance Adjustment\"}}\
				]}",
			);
		})
		.await;
	let report = broker
		.sync_transactions(&user, &account.id, None)
		.await
		.expect("Transaction sync should succeed.");

	assert_eq!(report.synced, 3);
	assert_eq!(report.skipped, 0);
	assert!(report.errors.is_empty());
	assert!(report.transactions.iter().all(|item| item.action == SyncAction::Created));

	let fuel = backends
		.transactions
		.find_by_external_id(&user, "remote-tx-1")
		.await
		.expect("Lookup should succeed.")
		.expect("Imported expense should exist.");

	assert_eq!(fuel.account_id, account.id);
	assert_eq!(fuel.amount, Decimal::new(4_250, 2));
	assert_eq!(fuel.kind, TransactionKind::Expense);
	assert_eq!(fuel.category, Category::Transportation);
	assert_eq!(fuel.merchant.as_deref(), Some("Shell"));
	assert_eq!(fuel.occurred_at, macros::datetime!(2026-08-20 10:00 UTC));
	assert_eq!(fuel.import_source, ImportSource::BankSync);
	assert_eq!(fuel.sync_status, SyncStatus::Synced);

	let salary = backends
		.transactions
		.find_by_external_id(&user, "remote-tx-2")
		.await
		.expect("Lookup should succeed.")
		.expect("Imported income should exist.");

	assert_eq!(salary.kind, TransactionKind::Income);
	assert_eq!(salary.category, Category::Income);
	assert_eq!(salary.merchant.as_deref(), Some("ACME Payroll Salary"));

	let adjustment = backends
		.transactions
		.find_by_external_id(&user, "remote-tx-3")
		.await
		.expect("Lookup should succeed.")
		.expect("Imported zero-amount record should exist.");

	assert_eq!(adjustment.kind, TransactionKind::Transfer);
	assert_eq!(adjustment.category, Category::Other);

	let stamped = backends
		.accounts
		.find_by_id(&user, &account.id)
		.await
		.expect("Account lookup should succeed.")
		.expect("Account should remain present.");

	assert!(stamped.last_synced_at.is_some());

	// Re-running the same window only skips; the ledger row count is unchanged.
	let second = broker
		.sync_transactions(&user, &account.id, None)
		.await
		.expect("Second sync should succeed.");

	assert_eq!(second.synced, 0);
	assert_eq!(second.skipped, 3);
	assert!(second.transactions.iter().all(|item| item.action == SyncAction::AlreadyPresent));
	assert_eq!(
		backends.transactions.count_for_user(&user).await.expect("Count should succeed."),
		3,
		"re-running a sync must not duplicate transactions"
	);

	transactions_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn transaction_sync_honors_an_explicit_limit() {
	let server = MockServer::start_async().await;
	let (broker, backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let user = owner();
	let credential = seed_credential(&broker, &user).await;
	let account = seed_linked_account(&backends, &user, &credential, "remote-acc-9").await;
	let transactions_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/my/accounts/remote-acc-9/transactions")
				.query_param("limit", "5");
			then.status(200).header("content-type", "application/json").body(
				"{\"transactions\":[{\"id\":\"remote-tx-9\",\"details\":{\"value\":{\"amount\":\"-1.00\"},\"description\":\"Paper Cup\"}}]}",
			);
		})
		.await;
	let report = broker
		.sync_transactions(&user, &account.id, Some(5))
		.await
		.expect("Transaction sync should succeed.");

	assert_eq!(report.synced, 1);

	transactions_mock.assert_async().await;
}

#[tokio::test]
async fn transaction_sync_reports_bad_records_and_still_stamps_the_account() {
	let server = MockServer::start_async().await;
	let (broker, backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let user = owner();
	let credential = seed_credential(&broker, &user).await;
	let account = seed_linked_account(&backends, &user, &credential, "remote-acc-1").await;
	let _transactions_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/my/accounts/remote-acc-1/transactions");
			then.status(200).header("content-type", "application/json").body(
				"{\"transactions\":[\
					{\"id\":\"remote-tx-a\",\"details\":{\"description\":\"No Amount Here\"}},\
					{\"id\":\"remote-tx-b\",\"details\":{\"value\":{\"amount\":\"-3.40\"},\"description\":\"Bus Ticket\"}}\
				]}",
			);
		})
		.await;
	let report = broker
		.sync_transactions(&user, &account.id, None)
		.await
		.expect("Transaction sync should succeed despite one bad record.");

	assert_eq!(report.synced, 1);
	assert_eq!(report.errors.len(), 1);
	assert_eq!(report.errors[0].label, "No Amount Here");
	assert!(report.errors[0].message.contains("remote-tx-a"));
	assert!(
		backends
			.transactions
			.find_by_external_id(&user, "remote-tx-b")
			.await
			.expect("Lookup should succeed.")
			.is_some(),
		"the good record must land despite its bad neighbor"
	);

	let stamped = backends
		.accounts
		.find_by_id(&user, &account.id)
		.await
		.expect("Account lookup should succeed.")
		.expect("Account should remain present.");

	assert!(stamped.last_synced_at.is_some(), "item errors must not block the sync stamp");
}

#[tokio::test]
async fn transaction_sync_rejects_unlinked_and_unknown_accounts() {
	let server = MockServer::start_async().await;
	let (broker, backends) =
		build_reqwest_test_broker(build_descriptor(&server), CONSUMER_KEY, CONSUMER_SECRET);
	let user = owner();
	let _credential = seed_credential(&broker, &user).await;
	let manual = backends
		.accounts
		.create(NewFinancialAccount {
			user_id: user.clone(),
			name: "Cash Jar".into(),
			kind: AccountKind::Other,
			balance: Decimal::ZERO,
			currency: "USD".into(),
			external_account_id: None,
			bank_id: None,
			last_synced_at: None,
		})
		.await
		.expect("Seeding the manual account should succeed.");
	let err = broker
		.sync_transactions(&user, &manual.id, None)
		.await
		.expect_err("A manually created account cannot take part in transaction sync.");

	assert!(matches!(err, Error::AccountNotLinked { ref account } if account == "Cash Jar"));

	let unknown: AccountId = "acc-unknown".parse().expect("Account id fixture should be valid.");
	let err = broker
		.sync_transactions(&user, &unknown, None)
		.await
		.expect_err("An unknown account id must fail.");

	assert!(matches!(err, Error::NotFound { resource: "account" }));
}
