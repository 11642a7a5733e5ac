//! Seeds a linked bank credential, mocks the provider's data endpoints, and runs a full
//! sync pass: accounts first, then transactions for every linked account.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use bankbridge::{
	auth::{NewBankToken, ProviderId, UserId},
	flows::{Broker, BrokerStores},
	http::{ReqwestProviderClient, ReqwestTransportErrorMapper},
	oauth::ConsumerCredentials,
	provider::ProviderDescriptor,
	reqwest::Client,
	store::{
		MemoryAccountStore, MemoryBankTokenStore, MemoryRequestTokenStore, MemoryTransactionStore,
		TransactionStore,
	},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let _accounts_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/my/accounts").header_exists("authorization");
			then.status(200).header("content-type", "application/json").body(
				"{\"accounts\":[\
					{\"id\":\"demo-acc-1\",\"label\":\"Everyday Checking\",\"balance\":{\"amount\":\"1240.55\",\"currency\":\"USD\"},\"account_type\":\"CHECKING\"},\
					{\"id\":\"demo-acc-2\",\"label\":\"Rainy Day Savings\",\"balance\":{\"amount\":\"8000.00\",\"currency\":\"USD\"},\"account_type\":\"SAVINGS\"}\
				]}",
			);
		})
		.await;
	let _checking_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/my/accounts/demo-acc-1/transactions");
			then.status(200).header("content-type", "application/json").body(
				"{\"transactions\":[\
					{\"id\":\"demo-tx-1\",\"details\":{\"value\":{\"amount\":\"-42.50\"},\"description\":\"Shell Gas Station\"},\"counterparty\":{\"name\":\"Shell\"}},\
					{\"id\":\"demo-tx-2\",\"details\":{\"value\":{\"amount\":\"2500.00\"},\"description\":\"ACME Payroll Salary\"}}\
				]}",
			);
		})
		.await;
	let _savings_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/my/accounts/demo-acc-2/transactions");
			then.status(200).header("content-type", "application/json").body(
				"{\"transactions\":[{\"id\":\"demo-tx-3\",\"details\":{\"value\":{\"amount\":\"150.00\"},\"description\":\"Monthly Transfer In\"}}]}",
			);
		})
		.await;
	let descriptor = ProviderDescriptor::builder(ProviderId::new("demo-bank")?)
		.base_url(Url::parse(&server.url(""))?)
		.callback(Url::parse("https://app.example.com/banking/callback")?)
		.build()?;
	let transactions_backend = Arc::new(MemoryTransactionStore::default());
	let stores = BrokerStores {
		tokens: Arc::new(MemoryBankTokenStore::default()),
		accounts: Arc::new(MemoryAccountStore::default()),
		transactions: transactions_backend.clone(),
		pending: Arc::new(MemoryRequestTokenStore::default()),
	};
	let http_client = ReqwestProviderClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let mapper = <Arc<ReqwestTransportErrorMapper>>::new(ReqwestTransportErrorMapper);
	let broker = <Broker<ReqwestProviderClient, ReqwestTransportErrorMapper>>::with_http_client(
		stores,
		descriptor,
		ConsumerCredentials::new("demo-consumer-key", "demo-consumer-secret")?,
		http_client,
		mapper,
	);
	let user = UserId::new("user-123")?;

	// Normally a completed handshake stores this credential; the demo seeds it directly.
	broker
		.create_credential(
			NewBankToken::builder(user.clone(), ProviderId::new("demo-bank")?)
				.access_token("demo-access-token")
				.access_token_secret("demo-access-secret")
				.build()?,
		)
		.await?;

	let report = broker.sync_all(&user, None).await?;

	println!(
		"Accounts synced: {} ({} errors).",
		report.accounts.synced,
		report.accounts.errors.len()
	);
	println!(
		"Transactions imported: {} ({} errors).",
		report.transactions.synced,
		report.transactions.errors.len()
	);

	for error in report.accounts.errors.iter().chain(&report.transactions.errors) {
		eprintln!("  {}: {}", &error.label, &error.message);
	}

	println!(
		"Ledger now holds {} transactions for {}.",
		transactions_backend.count_for_user(&user).await?,
		&user
	);

	let rerun = broker.sync_all(&user, None).await?;

	println!(
		"Second pass imported {} new transactions; sync is idempotent.",
		rerun.transactions.synced
	);

	Ok(())
}
