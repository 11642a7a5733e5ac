//! Account reconciliation flow.
//!
//! Remote accounts are matched to local ones by their provider-assigned identifier
//! (scoped to the user). Matches get their mutable fields refreshed, misses become new
//! linked accounts, and any per-account failure lands in the report's error list while
//! the rest of the batch keeps going.

// self
use crate::{
	_prelude::*,
	auth::{BankToken, TokenId, UserId},
	flows::{Broker, common},
	http::{ProviderHttpClient, TransportErrorMapper},
	ledger::NewFinancialAccount,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	remote::{RemoteAccount, account_kind_for},
	store::AccountStore,
	sync::{AccountSyncItem, AccountSyncReport, SyncAction},
};

/// Currency recorded for accounts whose provider omits one.
pub(crate) const DEFAULT_CURRENCY: &str = "USD";

impl<C, M> Broker<C, M>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Pulls the provider's accounts and reconciles them into local storage.
	pub async fn sync_accounts(
		&self,
		user_id: &UserId,
		token_id: Option<&TokenId>,
	) -> Result<AccountSyncReport> {
		const KIND: FlowKind = FlowKind::AccountSync;

		let span = FlowSpan::new(KIND, "sync_accounts");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.sync_metrics.record_attempt();

		let result = span
			.instrument(async move {
				let guard = common::sync_guard(self, user_id);
				let _singleflight = guard.lock().await;

				self.sync_accounts_locked(user_id, token_id).await
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

	/// Account sync body; the caller must already hold the user's sync guard.
	pub(crate) async fn sync_accounts_locked(
		&self,
		user_id: &UserId,
		token_id: Option<&TokenId>,
	) -> Result<AccountSyncReport> {
		let credential = common::resolve_credential(self, user_id, token_id).await?;
		let remote_accounts = self.remote.fetch_accounts(&credential).await?;
		let mut report = AccountSyncReport::default();

		for remote in remote_accounts {
			match self.reconcile_account(user_id, &credential, &remote).await {
				Ok(item) => report.record(item),
				Err(err) => report.record_error(remote.display_label(), &err),
			}
		}

		Ok(report)
	}

	async fn reconcile_account(
		&self,
		user_id: &UserId,
		credential: &BankToken,
		remote: &RemoteAccount,
	) -> Result<AccountSyncItem> {
		let now = OffsetDateTime::now_utc();
		let balance = remote.balance_amount()?;
		let existing = <dyn AccountStore>::find_by_external_id(
			self.stores.accounts.as_ref(),
			user_id,
			&remote.id,
		)
		.await?;

		match existing {
			Some(mut account) => {
				account.name = remote.display_label().to_owned();
				account.balance = balance;

				if let Some(currency) = remote.currency() {
					account.currency = currency.to_owned();
				}

				account.last_synced_at = Some(now);
				account.updated_at = now;

				<dyn AccountStore>::update(self.stores.accounts.as_ref(), account.clone())
					.await?;

				Ok(AccountSyncItem {
					account_id: account.id,
					external_account_id: remote.id.clone(),
					name: account.name,
					action: SyncAction::Updated,
				})
			},
			None => {
				let draft = NewFinancialAccount {
					user_id: user_id.clone(),
					name: remote.display_label().to_owned(),
					kind: account_kind_for(remote.account_type.as_deref().unwrap_or_default()),
					balance,
					currency: remote.currency().unwrap_or(DEFAULT_CURRENCY).to_owned(),
					external_account_id: Some(remote.id.clone()),
					bank_id: Some(credential.id.clone()),
					last_synced_at: Some(now),
				};
				let account =
					<dyn AccountStore>::create(self.stores.accounts.as_ref(), draft).await?;

				Ok(AccountSyncItem {
					account_id: account.id,
					external_account_id: remote.id.clone(),
					name: account.name,
					action: SyncAction::Created,
				})
			},
		}
	}
}
