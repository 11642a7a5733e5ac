//! Storage contracts and built-in store implementations for bridge records.
//!
//! Four contracts cover the bridge's persistence needs: [`BankTokenStore`] for long-lived
//! credentials, [`AccountStore`] and [`TransactionStore`] for the local ledger, and
//! [`RequestTokenStore`] for the short-lived handshake state. `create` operations mint the
//! record identifier and stamp `created_at`/`updated_at`; `update` operations persist the
//! record verbatim, leaving timestamp ownership with the caller.

pub mod memory;

pub use memory::{
	MemoryAccountStore, MemoryBankTokenStore, MemoryRequestTokenStore, MemoryTransactionStore,
};

// self
use crate::{
	_prelude::*,
	auth::{AccountId, BankToken, NewBankToken, PendingHandshake, ProviderId, TokenId, UserId},
	ledger::{FinancialAccount, NewFinancialAccount, NewTransaction, Transaction},
};

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Error type produced by store implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// Uniqueness violation on a correlation key.
	#[error("Conflict: {message}.")]
	Conflict {
		/// Human-readable error payload.
		message: String,
	},
}

/// Persistence contract for long-lived bank credentials.
pub trait BankTokenStore
where
	Self: Send + Sync,
{
	/// Persists a new credential.
	///
	/// Fails with [`StoreError::Conflict`] when the user already holds a credential for
	/// the draft's provider.
	fn create(&self, draft: NewBankToken) -> StoreFuture<'_, BankToken>;

	/// Fetches a credential by id, scoped to its owner.
	fn find_by_id<'a>(
		&'a self,
		user_id: &'a UserId,
		id: &'a TokenId,
	) -> StoreFuture<'a, Option<BankToken>>;

	/// Fetches the user's credential for a provider, if any.
	fn first_for_provider<'a>(
		&'a self,
		user_id: &'a UserId,
		provider: &'a ProviderId,
	) -> StoreFuture<'a, Option<BankToken>>;

	/// Lists every credential the user holds.
	fn list_for_user<'a>(&'a self, user_id: &'a UserId) -> StoreFuture<'a, Vec<BankToken>>;

	/// Persists the record verbatim, keyed by its id.
	fn update(&self, token: BankToken) -> StoreFuture<'_, ()>;

	/// Deletes a credential; reports whether a record was removed.
	fn delete<'a>(&'a self, user_id: &'a UserId, id: &'a TokenId) -> StoreFuture<'a, bool>;
}

/// Persistence contract for ledger accounts.
pub trait AccountStore
where
	Self: Send + Sync,
{
	/// Persists a new account.
	fn create(&self, draft: NewFinancialAccount) -> StoreFuture<'_, FinancialAccount>;

	/// Fetches an account by id, scoped to its owner.
	fn find_by_id<'a>(
		&'a self,
		user_id: &'a UserId,
		id: &'a AccountId,
	) -> StoreFuture<'a, Option<FinancialAccount>>;

	/// Fetches the user's account correlated with a provider-side account id.
	fn find_by_external_id<'a>(
		&'a self,
		user_id: &'a UserId,
		external_account_id: &'a str,
	) -> StoreFuture<'a, Option<FinancialAccount>>;

	/// Lists every account the user holds.
	fn list_for_user<'a>(&'a self, user_id: &'a UserId) -> StoreFuture<'a, Vec<FinancialAccount>>;

	/// Persists the record verbatim, keyed by its id.
	fn update(&self, account: FinancialAccount) -> StoreFuture<'_, ()>;
}

/// Persistence contract for ledger transactions.
pub trait TransactionStore
where
	Self: Send + Sync,
{
	/// Persists a new transaction.
	fn create(&self, draft: NewTransaction) -> StoreFuture<'_, Transaction>;

	/// Fetches the user's transaction correlated with a provider-side transaction id.
	fn find_by_external_id<'a>(
		&'a self,
		user_id: &'a UserId,
		external_transaction_id: &'a str,
	) -> StoreFuture<'a, Option<Transaction>>;

	/// Counts the user's transactions.
	fn count_for_user<'a>(&'a self, user_id: &'a UserId) -> StoreFuture<'a, usize>;
}

/// Short-lived request token storage backing the handshake.
pub trait RequestTokenStore
where
	Self: Send + Sync,
{
	/// Stores a pending handshake under its request token.
	fn insert(&self, pending: PendingHandshake) -> StoreFuture<'_, ()>;

	/// Atomically removes and returns the pending handshake for a request token.
	///
	/// Expired entries read as absent, so a successful claim proves the token was live
	/// and had never been claimed before.
	fn claim<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<PendingHandshake>>;

	/// Drops expired entries; returns how many were removed.
	fn evict_expired(&self) -> StoreFuture<'_, usize>;
}
