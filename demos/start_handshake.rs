//! Walks through the full three-legged handshake against a mock provider: obtain a request
//! token, send the user off to authorize, then trade the verifier for a stored credential.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use bankbridge::{
	auth::{ProviderId, UserId},
	flows::{Broker, BrokerStores},
	http::{ReqwestProviderClient, ReqwestTransportErrorMapper},
	oauth::ConsumerCredentials,
	provider::ProviderDescriptor,
	reqwest::Client,
	store::{
		MemoryAccountStore, MemoryBankTokenStore, MemoryRequestTokenStore, MemoryTransactionStore,
	},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let initiate_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/initiate").header_exists("authorization");
			then.status(200).header("content-type", "application/x-www-form-urlencoded").body(
				"oauth_token=demo-request-token&oauth_token_secret=demo-request-secret&oauth_callback_confirmed=true",
			);
		})
		.await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").header_exists("authorization");
			then.status(200).header("content-type", "application/x-www-form-urlencoded").body(
				"oauth_token=demo-access-token&oauth_token_secret=demo-access-secret",
			);
		})
		.await;
	let descriptor = ProviderDescriptor::builder(ProviderId::new("demo-bank")?)
		.base_url(Url::parse(&server.url(""))?)
		.callback(Url::parse("https://app.example.com/banking/callback")?)
		.build()?;
	let stores = BrokerStores {
		tokens: Arc::new(MemoryBankTokenStore::default()),
		accounts: Arc::new(MemoryAccountStore::default()),
		transactions: Arc::new(MemoryTransactionStore::default()),
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
	let redirect = broker.start_handshake().await?;

	println!("Send your user to {}.", &redirect.authorize_url);

	// Simulate the provider redirecting back with the approved token and a verifier.
	let credential = broker
		.complete_handshake(&UserId::new("user-123")?, &redirect.request_token, "demo-verifier")
		.await?;
	let summary = credential.summary();

	println!("Linked provider {} as credential {}.", &summary.provider, &summary.id);
	println!("Credential stored at {}; secrets never leave the store.", &summary.created_at);

	initiate_mock.assert_async().await;
	token_mock.assert_async().await;

	Ok(())
}
