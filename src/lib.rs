//! Rust's turnkey bank-data bridge - OAuth 1.0a signed handshakes, idempotent
//! account/transaction sync, and partial-failure reporting in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod ledger;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod remote;
pub mod store;
pub mod sync;
#[cfg(feature = "reqwest")]
pub mod _preludet {
	//! Convenience re-exports and helpers shared by integration tests and demos.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::{Broker, BrokerStores},
		http::{ReqwestProviderClient, ReqwestTransportErrorMapper},
		oauth::ConsumerCredentials,
		provider::ProviderDescriptor,
		store::{
			MemoryAccountStore, MemoryBankTokenStore, MemoryRequestTokenStore,
			MemoryTransactionStore,
		},
	};

	/// Broker type alias used by reqwest-backed integration tests.
	pub type ReqwestTestBroker = Broker<ReqwestProviderClient, ReqwestTransportErrorMapper>;

	/// In-memory store backends kept alongside a test broker so assertions can inspect
	/// persisted state directly.
	#[derive(Clone, Debug, Default)]
	pub struct TestStores {
		/// Bank credential store backend.
		pub tokens: Arc<MemoryBankTokenStore>,
		/// Financial account store backend.
		pub accounts: Arc<MemoryAccountStore>,
		/// Transaction store backend.
		pub transactions: Arc<MemoryTransactionStore>,
		/// Pending request-token store backend.
		pub pending: Arc<MemoryRequestTokenStore>,
	}
	impl TestStores {
		/// Bundles the backends into the trait-object handles a [`Broker`] consumes.
		pub fn handles(&self) -> BrokerStores {
			BrokerStores {
				tokens: self.tokens.clone(),
				accounts: self.accounts.clone(),
				transactions: self.transactions.clone(),
				pending: self.pending.clone(),
			}
		}
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_provider_client() -> ReqwestProviderClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestProviderClient::with_client(client)
	}

	/// Constructs a [`Broker`] backed by in-memory stores and the insecure reqwest transport
	/// used across integration tests.
	pub fn build_reqwest_test_broker(
		descriptor: ProviderDescriptor,
		consumer_key: &str,
		consumer_secret: &str,
	) -> (ReqwestTestBroker, TestStores) {
		let consumer = ConsumerCredentials::new(consumer_key, consumer_secret)
			.expect("Failed to build consumer credentials for tests.");
		let backends = TestStores::default();
		let broker = Broker::with_http_client(
			backends.handles(),
			descriptor,
			consumer,
			test_reqwest_provider_client(),
			Arc::new(ReqwestTransportErrorMapper),
		);

		(broker, backends)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use rust_decimal::Decimal;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
