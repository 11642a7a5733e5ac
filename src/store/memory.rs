//! Thread-safe in-memory store implementations for local development and tests.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{
		AccountId, BankToken, NewBankToken, PendingHandshake, ProviderId, TokenId, TransactionId,
		UserId,
	},
	ledger::{FinancialAccount, NewFinancialAccount, NewTransaction, Transaction},
	store::{
		AccountStore, BankTokenStore, RequestTokenStore, StoreError, StoreFuture, TransactionStore,
	},
};

/// Request token TTL applied by [`MemoryRequestTokenStore::default`].
pub const DEFAULT_HANDSHAKE_TTL: Duration = Duration::minutes(10);

/// In-memory [`BankTokenStore`] keyed by token id.
#[derive(Clone, Debug, Default)]
pub struct MemoryBankTokenStore {
	records: Arc<RwLock<HashMap<TokenId, BankToken>>>,
	sequence: Arc<AtomicU64>,
}
impl MemoryBankTokenStore {
	fn create_now(&self, draft: NewBankToken) -> Result<BankToken, StoreError> {
		let mut guard = self.records.write();

		if guard
			.values()
			.any(|token| token.user_id == draft.user_id && token.provider == draft.provider)
		{
			return Err(StoreError::Conflict {
				message: format!("bank token already exists for provider `{}`", draft.provider),
			});
		}

		let id = next_id::<TokenId>(&self.sequence, "tok")?;
		let now = OffsetDateTime::now_utc();
		let token = BankToken {
			id: id.clone(),
			user_id: draft.user_id,
			provider: draft.provider,
			access_token: draft.access_token,
			access_token_secret: draft.access_token_secret,
			refresh_token: draft.refresh_token,
			expires_at: draft.expires_at,
			created_at: now,
			updated_at: now,
		};

		guard.insert(id, token.clone());

		Ok(token)
	}
}
impl BankTokenStore for MemoryBankTokenStore {
	fn create(&self, draft: NewBankToken) -> StoreFuture<'_, BankToken> {
		Box::pin(async move { self.create_now(draft) })
	}

	fn find_by_id<'a>(
		&'a self,
		user_id: &'a UserId,
		id: &'a TokenId,
	) -> StoreFuture<'a, Option<BankToken>> {
		Box::pin(async move {
			Ok(self.records.read().get(id).filter(|token| &token.user_id == user_id).cloned())
		})
	}

	fn first_for_provider<'a>(
		&'a self,
		user_id: &'a UserId,
		provider: &'a ProviderId,
	) -> StoreFuture<'a, Option<BankToken>> {
		Box::pin(async move {
			Ok(self
				.records
				.read()
				.values()
				.find(|token| &token.user_id == user_id && &token.provider == provider)
				.cloned())
		})
	}

	fn list_for_user<'a>(&'a self, user_id: &'a UserId) -> StoreFuture<'a, Vec<BankToken>> {
		Box::pin(async move {
			let mut tokens = self
				.records
				.read()
				.values()
				.filter(|token| &token.user_id == user_id)
				.cloned()
				.collect::<Vec<_>>();

			tokens.sort_by(|a, b| a.id.cmp(&b.id));

			Ok(tokens)
		})
	}

	fn update(&self, token: BankToken) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.records.write().insert(token.id.clone(), token);

			Ok(())
		})
	}

	fn delete<'a>(&'a self, user_id: &'a UserId, id: &'a TokenId) -> StoreFuture<'a, bool> {
		Box::pin(async move {
			let mut guard = self.records.write();

			match guard.get(id) {
				Some(token) if &token.user_id == user_id => {
					guard.remove(id);

					Ok(true)
				},
				_ => Ok(false),
			}
		})
	}
}

/// In-memory [`AccountStore`] keyed by account id.
#[derive(Clone, Debug, Default)]
pub struct MemoryAccountStore {
	records: Arc<RwLock<HashMap<AccountId, FinancialAccount>>>,
	sequence: Arc<AtomicU64>,
}
impl MemoryAccountStore {
	fn create_now(&self, draft: NewFinancialAccount) -> Result<FinancialAccount, StoreError> {
		let id = next_id::<AccountId>(&self.sequence, "acc")?;
		let now = OffsetDateTime::now_utc();
		let account = FinancialAccount {
			id: id.clone(),
			user_id: draft.user_id,
			name: draft.name,
			kind: draft.kind,
			balance: draft.balance,
			currency: draft.currency,
			external_account_id: draft.external_account_id,
			bank_id: draft.bank_id,
			last_synced_at: draft.last_synced_at,
			created_at: now,
			updated_at: now,
		};

		self.records.write().insert(id, account.clone());

		Ok(account)
	}
}
impl AccountStore for MemoryAccountStore {
	fn create(&self, draft: NewFinancialAccount) -> StoreFuture<'_, FinancialAccount> {
		Box::pin(async move { self.create_now(draft) })
	}

	fn find_by_id<'a>(
		&'a self,
		user_id: &'a UserId,
		id: &'a AccountId,
	) -> StoreFuture<'a, Option<FinancialAccount>> {
		Box::pin(async move {
			Ok(self.records.read().get(id).filter(|account| &account.user_id == user_id).cloned())
		})
	}

	fn find_by_external_id<'a>(
		&'a self,
		user_id: &'a UserId,
		external_account_id: &'a str,
	) -> StoreFuture<'a, Option<FinancialAccount>> {
		Box::pin(async move {
			Ok(self
				.records
				.read()
				.values()
				.find(|account| {
					&account.user_id == user_id
						&& account.external_account_id.as_deref() == Some(external_account_id)
				})
				.cloned())
		})
	}

	fn list_for_user<'a>(&'a self, user_id: &'a UserId) -> StoreFuture<'a, Vec<FinancialAccount>> {
		Box::pin(async move {
			let mut accounts = self
				.records
				.read()
				.values()
				.filter(|account| &account.user_id == user_id)
				.cloned()
				.collect::<Vec<_>>();

			accounts.sort_by(|a, b| a.id.cmp(&b.id));

			Ok(accounts)
		})
	}

	fn update(&self, account: FinancialAccount) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.records.write().insert(account.id.clone(), account);

			Ok(())
		})
	}
}

/// In-memory [`TransactionStore`] keyed by transaction id.
#[derive(Clone, Debug, Default)]
pub struct MemoryTransactionStore {
	records: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
	sequence: Arc<AtomicU64>,
}
impl MemoryTransactionStore {
	fn create_now(&self, draft: NewTransaction) -> Result<Transaction, StoreError> {
		let id = next_id::<TransactionId>(&self.sequence, "txn")?;
		let transaction = Transaction {
			id: id.clone(),
			user_id: draft.user_id,
			account_id: draft.account_id,
			amount: draft.amount,
			kind: draft.kind,
			description: draft.description,
			merchant: draft.merchant,
			category: draft.category,
			occurred_at: draft.occurred_at,
			external_transaction_id: draft.external_transaction_id,
			import_source: draft.import_source,
			sync_status: draft.sync_status,
			created_at: OffsetDateTime::now_utc(),
		};

		self.records.write().insert(id, transaction.clone());

		Ok(transaction)
	}
}
impl TransactionStore for MemoryTransactionStore {
	fn create(&self, draft: NewTransaction) -> StoreFuture<'_, Transaction> {
		Box::pin(async move { self.create_now(draft) })
	}

	fn find_by_external_id<'a>(
		&'a self,
		user_id: &'a UserId,
		external_transaction_id: &'a str,
	) -> StoreFuture<'a, Option<Transaction>> {
		Box::pin(async move {
			Ok(self
				.records
				.read()
				.values()
				.find(|transaction| {
					&transaction.user_id == user_id
						&& transaction.external_transaction_id.as_deref()
							== Some(external_transaction_id)
				})
				.cloned())
		})
	}

	fn count_for_user<'a>(&'a self, user_id: &'a UserId) -> StoreFuture<'a, usize> {
		Box::pin(async move {
			Ok(self
				.records
				.read()
				.values()
				.filter(|transaction| &transaction.user_id == user_id)
				.count())
		})
	}
}

/// In-memory [`RequestTokenStore`] with TTL eviction.
///
/// Expired entries are swept on every insert and treated as absent by `claim`, so the
/// store never hands back a token past its window even without a background sweeper.
#[derive(Clone, Debug)]
pub struct MemoryRequestTokenStore {
	entries: Arc<RwLock<HashMap<String, PendingHandshake>>>,
	ttl: Duration,
}
impl MemoryRequestTokenStore {
	/// Creates a store with a custom TTL.
	pub fn with_ttl(ttl: Duration) -> Self {
		Self { entries: Arc::default(), ttl }
	}

	/// TTL applied to stored request tokens.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	fn insert_now(&self, pending: PendingHandshake) {
		let now = OffsetDateTime::now_utc();
		let mut guard = self.entries.write();

		guard.retain(|_, entry| !entry.is_expired_at(now, self.ttl));
		guard.insert(pending.token.clone(), pending);
	}

	fn claim_now(&self, token: &str) -> Option<PendingHandshake> {
		let now = OffsetDateTime::now_utc();

		match self.entries.write().remove(token) {
			Some(entry) if entry.is_expired_at(now, self.ttl) => None,
			other => other,
		}
	}

	fn evict_now(&self) -> usize {
		let now = OffsetDateTime::now_utc();
		let mut guard = self.entries.write();
		let before = guard.len();

		guard.retain(|_, entry| !entry.is_expired_at(now, self.ttl));

		before - guard.len()
	}
}
impl Default for MemoryRequestTokenStore {
	fn default() -> Self {
		Self::with_ttl(DEFAULT_HANDSHAKE_TTL)
	}
}
impl RequestTokenStore for MemoryRequestTokenStore {
	fn insert(&self, pending: PendingHandshake) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.insert_now(pending);

			Ok(())
		})
	}

	fn claim<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<PendingHandshake>> {
		Box::pin(async move { Ok(self.claim_now(token)) })
	}

	fn evict_expired(&self) -> StoreFuture<'_, usize> {
		Box::pin(async move { Ok(self.evict_now()) })
	}
}

fn next_id<T>(sequence: &AtomicU64, prefix: &str) -> Result<T, StoreError>
where
	T: FromStr,
	T::Err: Display,
{
	let n = sequence.fetch_add(1, Ordering::Relaxed) + 1;

	T::from_str(&format!("{prefix}-{n}"))
		.map_err(|err| StoreError::Backend { message: err.to_string() })
}
