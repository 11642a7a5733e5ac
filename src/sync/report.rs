// self
use crate::{
	_prelude::*,
	auth::{AccountId, TransactionId},
};

/// How the reconciliation handled one remote record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
	/// A local record was created for the remote record.
	Created,
	/// An existing local record was refreshed in place.
	Updated,
	/// The remote record was already present and left untouched.
	AlreadyPresent,
}

/// One remote record the reconciliation could not land.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncItemError {
	/// Display label or remote identifier of the failed record.
	pub label: String,
	/// Rendered failure message.
	pub message: String,
}

/// Per-account outcome inside an [`AccountSyncReport`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountSyncItem {
	/// Local account id.
	pub account_id: AccountId,
	/// Provider-side account id.
	pub external_account_id: String,
	/// Local display name after the sync.
	pub name: String,
	/// What the reconciliation did.
	pub action: SyncAction,
}

/// Outcome of one account sync run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountSyncReport {
	/// Accounts created or updated this run.
	pub synced: usize,
	/// Remote records that failed to land, with reasons.
	pub errors: Vec<SyncItemError>,
	/// Per-account outcomes in provider order.
	pub accounts: Vec<AccountSyncItem>,
}
impl AccountSyncReport {
	/// Records a reconciled account.
	pub fn record(&mut self, item: AccountSyncItem) {
		if matches!(item.action, SyncAction::Created | SyncAction::Updated) {
			self.synced += 1;
		}

		self.accounts.push(item);
	}

	/// Records a failed remote record without aborting the run.
	pub fn record_error(&mut self, label: impl Into<String>, error: &Error) {
		self.errors.push(SyncItemError { label: label.into(), message: error.to_string() });
	}

	/// Collapses the report into a tally for merging.
	pub fn tally(&self) -> SyncTally {
		SyncTally { synced: self.synced, errors: self.errors.clone() }
	}
}

/// Per-transaction outcome inside a [`TransactionSyncReport`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionSyncItem {
	/// Local transaction id.
	pub transaction_id: TransactionId,
	/// Provider-side transaction id.
	pub external_transaction_id: String,
	/// Stored description.
	pub description: String,
	/// What the reconciliation did.
	pub action: SyncAction,
}

/// Outcome of one transaction sync run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransactionSyncReport {
	/// Transactions imported this run.
	pub synced: usize,
	/// Remote records already present locally and left untouched.
	pub skipped: usize,
	/// Remote records that failed to land, with reasons.
	pub errors: Vec<SyncItemError>,
	/// Per-transaction outcomes in provider order.
	pub transactions: Vec<TransactionSyncItem>,
}
impl TransactionSyncReport {
	/// Records a reconciled transaction.
	pub fn record(&mut self, item: TransactionSyncItem) {
		match item.action {
			SyncAction::Created | SyncAction::Updated => self.synced += 1,
			SyncAction::AlreadyPresent => self.skipped += 1,
		}

		self.transactions.push(item);
	}

	/// Records a failed remote record without aborting the run.
	pub fn record_error(&mut self, label: impl Into<String>, error: &Error) {
		self.errors.push(SyncItemError { label: label.into(), message: error.to_string() });
	}

	/// Collapses the report into a tally for merging.
	pub fn tally(&self) -> SyncTally {
		SyncTally { synced: self.synced, errors: self.errors.clone() }
	}
}

/// Merged counters and error list for one leg of a full sync.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTally {
	/// Records created or updated.
	pub synced: usize,
	/// Failures carried over from the per-item error lists.
	pub errors: Vec<SyncItemError>,
}
impl SyncTally {
	/// Folds another tally into this one.
	pub fn absorb(&mut self, other: Self) {
		self.synced += other.synced;
		self.errors.extend(other.errors);
	}

	/// Appends one failure entry.
	pub fn record_failure(&mut self, label: impl Into<String>, error: &Error) {
		self.errors.push(SyncItemError { label: label.into(), message: error.to_string() });
	}
}

/// Aggregate outcome of a full sync pass.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FullSyncReport {
	/// Account leg, from the single account sync run.
	pub accounts: SyncTally,
	/// Transaction leg, merged across every linked account.
	pub transactions: SyncTally,
}
