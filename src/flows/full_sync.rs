//! Combined account + transaction sync flow.
//!
//! Accounts are reconciled first so freshly discovered accounts take part in the same
//! run's transaction pass. A failing account pass fails the whole call (there is
//! nothing sensible to iterate afterwards), while a transaction pass that fails for
//! one account is folded into the report and the remaining accounts still run.

// self
use crate::{
	_prelude::*,
	auth::UserId,
	flows::{Broker, common},
	http::{ProviderHttpClient, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::AccountStore,
	sync::{FullSyncReport, SyncTally},
};

impl<C, M> Broker<C, M>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Reconciles accounts, then imports transactions for every linked account.
	pub async fn sync_all(
		&self,
		user_id: &UserId,
		transaction_limit: Option<u32>,
	) -> Result<FullSyncReport> {
		const KIND: FlowKind = FlowKind::FullSync;

		let span = FlowSpan::new(KIND, "sync_all");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.sync_metrics.record_attempt();

		let result = span
			.instrument(async move {
				let guard = common::sync_guard(self, user_id);
				let _singleflight = guard.lock().await;
				let accounts = self.sync_accounts_locked(user_id, None).await?.tally();
				let mut transactions = SyncTally::default();
				let linked =
					<dyn AccountStore>::list_for_user(self.stores.accounts.as_ref(), user_id)
						.await?
						.into_iter()
						.filter(|account| account.sync_link().is_some());

				for account in linked {
					match self
						.sync_transactions_locked(user_id, &account.id, transaction_limit)
						.await
					{
						Ok(report) => transactions.absorb(report.tally()),
						Err(err) => transactions.record_failure(account.name.as_str(), &err),
					}
				}

				Ok(FullSyncReport { accounts, transactions })
			})
			.await;

		match &result {
			Ok(report) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
				self.sync_metrics.record_success();
				self.sync_metrics.record_items(
					report.accounts.synced + report.transactions.synced,
					report.accounts.errors.len() + report.transactions.errors.len(),
				);
			},
			Err(_) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				self.sync_metrics.record_failure();
			},
		}

		result
	}
}
