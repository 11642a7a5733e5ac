//! Transaction import flow.
//!
//! Imports are keyed on the provider-assigned transaction identifier, so re-running a
//! sync never duplicates ledger rows; already-imported records count as skipped. One
//! bad remote record is reported and skipped rather than aborting the batch, and the
//! account's last-synced stamp is written even when individual items failed.

// self
use crate::{
	_prelude::*,
	auth::{AccountId, UserId},
	flows::{Broker, common},
	http::{ProviderHttpClient, TransportErrorMapper},
	ledger::{ImportSource, NewTransaction, SyncStatus},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	remote::{RemoteTransaction, transaction_kind_for},
	store::{AccountStore, BankTokenStore, TransactionStore},
	sync::{SyncAction, TransactionSyncItem, TransactionSyncReport, classify},
};

impl<C, M> Broker<C, M>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Pulls one linked account's transactions and imports the new ones.
	pub async fn sync_transactions(
		&self,
		user_id: &UserId,
		account_id: &AccountId,
		limit: Option<u32>,
	) -> Result<TransactionSyncReport> {
		const KIND: FlowKind = FlowKind::TransactionSync;

		let span = FlowSpan::new(KIND, "sync_transactions");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.sync_metrics.record_attempt();

		let result = span
			.instrument(async move {
				let guard = common::sync_guard(self, user_id);
				let _singleflight = guard.lock().await;

				self.sync_transactions_locked(user_id, account_id, limit).await
			})
			.await;

		match &result {
			Ok(report) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
				self.sync_metrics.record_success();
				self.sync_metrics.record_items(report.synced, report.errors.len());
			},
			Err(_) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				self.sync_metrics.record_failure();
			},
		}

		result
	}

	/// Transaction sync body; the caller must already hold the user's sync guard.
	pub(crate) async fn sync_transactions_locked(
		&self,
		user_id: &UserId,
		account_id: &AccountId,
		limit: Option<u32>,
	) -> Result<TransactionSyncReport> {
		let mut account =
			<dyn AccountStore>::find_by_id(self.stores.accounts.as_ref(), user_id, account_id)
				.await?
				.ok_or(Error::NotFound { resource: "account" })?;
		let (external_account_id, bank_id) = match account.sync_link() {
			Some(link) => (link.external_account_id.to_owned(), link.bank_id.clone()),
			None => return Err(Error::AccountNotLinked { account: account.name.clone() }),
		};
		let credential =
			<dyn BankTokenStore>::find_by_id(self.stores.tokens.as_ref(), user_id, &bank_id)
				.await?
				.ok_or(Error::NotFound { resource: "bank token" })?;
		let limit =
			limit.unwrap_or(self.remote.descriptor.quirks.default_transaction_limit);
		let remote_transactions =
			self.remote.fetch_transactions(&credential, &external_account_id, limit).await?;
		let mut report = TransactionSyncReport::default();
		let now = OffsetDateTime::now_utc();

		for remote in remote_transactions {
			match self.reconcile_transaction(user_id, account_id, &remote, now).await {
				Ok(item) => report.record(item),
				Err(err) => report.record_error(remote.display_label(), &err),
			}
		}

		// The stamp lands even when individual items failed; only a storage fault on the
		// stamp itself joins the error list.
		account.last_synced_at = Some(now);
		account.updated_at = now;

		if let Err(err) =
			<dyn AccountStore>::update(self.stores.accounts.as_ref(), account.clone()).await
		{
			report.record_error(account.name.as_str(), &Error::from(err));
		}

		Ok(report)
	}

	async fn reconcile_transaction(
		&self,
		user_id: &UserId,
		account_id: &AccountId,
		remote: &RemoteTransaction,
		now: OffsetDateTime,
	) -> Result<TransactionSyncItem> {
		let existing = <dyn TransactionStore>::find_by_external_id(
			self.stores.transactions.as_ref(),
			user_id,
			&remote.id,
		)
		.await?;

		if let Some(transaction) = existing {
			return Ok(TransactionSyncItem {
				transaction_id: transaction.id,
				external_transaction_id: remote.id.clone(),
				description: transaction.description,
				action: SyncAction::AlreadyPresent,
			});
		}

		let signed = remote.signed_amount()?;
		let description = remote.display_label().to_owned();
		let draft = NewTransaction {
			user_id: user_id.clone(),
			account_id: account_id.clone(),
			amount: signed.abs(),
			kind: transaction_kind_for(signed),
			description: description.clone(),
			merchant: classify::merchant_name(remote),
			category: classify::categorize(&description),
			occurred_at: remote.booked_at_or(now),
			external_transaction_id: Some(remote.id.clone()),
			import_source: ImportSource::BankSync,
			sync_status: SyncStatus::Synced,
		};
		let created =
			<dyn TransactionStore>::create(self.stores.transactions.as_ref(), draft).await?;

		Ok(TransactionSyncItem {
			transaction_id: created.id,
			external_transaction_id: remote.id.clone(),
			description: created.description,
			action: SyncAction::Created,
		})
	}
}
