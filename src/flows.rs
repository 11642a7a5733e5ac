//! High-level flow orchestrators powered by the bridge broker.

pub mod handshake;

mod account_sync;
mod common;
mod credentials;
mod full_sync;
mod metrics;
mod transaction_sync;

pub use handshake::*;
pub use metrics::SyncMetrics;

// self
use crate::{
	_prelude::*,
	auth::UserId,
	http::{ProviderHttpClient, TransportErrorMapper},
	oauth::ConsumerCredentials,
	provider::ProviderDescriptor,
	remote::{RemoteClient, RetryPolicy},
	store::{AccountStore, BankTokenStore, RequestTokenStore, TransactionStore},
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestProviderClient, ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestBroker = Broker<ReqwestProviderClient, ReqwestTransportErrorMapper>;

/// Storage handles consumed by every flow.
#[derive(Clone)]
pub struct BrokerStores {
	/// Long-lived bank credentials.
	pub tokens: Arc<dyn BankTokenStore>,
	/// Ledger accounts.
	pub accounts: Arc<dyn AccountStore>,
	/// Ledger transactions.
	pub transactions: Arc<dyn TransactionStore>,
	/// Short-lived request tokens parked mid-handshake.
	pub pending: Arc<dyn RequestTokenStore>,
}
impl Debug for BrokerStores {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("BrokerStores(..)")
	}
}

/// Coordinates handshake and sync flows against a single provider descriptor.
///
/// The broker owns the signed remote client, the storage handles, and the per-user sync
/// guards, so individual flow implementations can focus on their own reconciliation
/// logic. Consumer credentials live inside the remote client and are applied to every
/// outbound request signature.
pub struct Broker<C, M>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Signed client for the provider's handshake and data endpoints.
	pub remote: RemoteClient<C, M>,
	/// Storage handles serving every flow.
	pub stores: BrokerStores,
	/// Shared metrics recorder for sync flow outcomes.
	pub sync_metrics: Arc<SyncMetrics>,
	sync_guards: Arc<Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>>,
}
impl<C, M> Broker<C, M>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		stores: BrokerStores,
		descriptor: ProviderDescriptor,
		consumer: ConsumerCredentials,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			remote: RemoteClient::new(http_client.into(), mapper.into(), descriptor, consumer),
			stores,
			sync_metrics: Default::default(),
			sync_guards: Default::default(),
		}
	}

	/// Overrides the retry policy applied to idempotent provider reads.
	pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
		self.remote.retry_policy = policy;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestProviderClient, ReqwestTransportErrorMapper> {
	/// Creates a broker with the crate's default reqwest transport.
	///
	/// The broker provisions its own reqwest-backed client (bounded timeout, redirects
	/// disabled) so callers do not need to pass HTTP handles explicitly.
	pub fn new(
		stores: BrokerStores,
		descriptor: ProviderDescriptor,
		consumer: ConsumerCredentials,
	) -> Result<Self> {
		Ok(Self::with_http_client(
			stores,
			descriptor,
			consumer,
			ReqwestProviderClient::new()?,
			Arc::new(ReqwestTransportErrorMapper),
		))
	}
}
impl<C, M> Clone for Broker<C, M>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			remote: self.remote.clone(),
			stores: self.stores.clone(),
			sync_metrics: Arc::clone(&self.sync_metrics),
			sync_guards: Arc::clone(&self.sync_guards),
		}
	}
}
impl<C, M> Debug for Broker<C, M>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("descriptor", &self.remote.descriptor)
			.field("consumer_key", &self.remote.consumer.key)
			.finish()
	}
}
