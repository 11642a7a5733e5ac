//! Ledger transaction records and their classification enums.

// self
use crate::{
	_prelude::*,
	auth::id::{AccountId, TransactionId, UserId},
};

/// Direction of a ledger transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
	/// Money flowing into the account.
	Income,
	/// Money flowing out of the account.
	Expense,
	/// Movement between accounts with no net direction.
	Transfer,
}

/// Origin of a ledger transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportSource {
	/// Entered by hand inside the application.
	Manual,
	/// Imported from a provider by the sync engine.
	BankSync,
}

/// Reconciliation state of a ledger transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
	/// Never matched against provider data.
	Unsynced,
	/// Confirmed against provider data.
	Synced,
}

/// Spending category assigned by the keyword heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
	/// Salary, payroll, and other incoming funds.
	Income,
	/// Groceries, restaurants, and cafes.
	#[serde(rename = "Food & Dining")]
	FoodAndDining,
	/// Fuel and transport.
	Transportation,
	/// Pharmacies and medical services.
	Healthcare,
	/// Utilities and recurring household bills.
	#[serde(rename = "Bills & Utilities")]
	BillsAndUtilities,
	/// Retail and online shopping.
	Shopping,
	/// Everything the heuristic cannot place.
	Other,
}
impl Category {
	/// Returns the human-readable label used across the application.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Income => "Income",
			Self::FoodAndDining => "Food & Dining",
			Self::Transportation => "Transportation",
			Self::Healthcare => "Healthcare",
			Self::BillsAndUtilities => "Bills & Utilities",
			Self::Shopping => "Shopping",
			Self::Other => "Other",
		}
	}
}
impl Display for Category {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Draft transaction awaiting store-assigned identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewTransaction {
	/// Owning application user.
	pub user_id: UserId,
	/// Local account the transaction belongs to.
	pub account_id: AccountId,
	/// Magnitude of the transaction; direction lives in `kind`.
	pub amount: Decimal,
	/// Direction of the transaction.
	pub kind: TransactionKind,
	/// Human-readable description.
	pub description: String,
	/// Merchant or counterparty name, when one could be derived.
	pub merchant: Option<String>,
	/// Spending category assigned by the keyword heuristic.
	pub category: Category,
	/// Instant the transaction occurred at the provider.
	pub occurred_at: OffsetDateTime,
	/// Provider-assigned transaction identifier; drives idempotent imports.
	pub external_transaction_id: Option<String>,
	/// Origin of the record.
	pub import_source: ImportSource,
	/// Reconciliation state.
	pub sync_status: SyncStatus,
}

/// Ledger transaction, either entered manually or imported by the sync engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
	/// Store-assigned identifier.
	pub id: TransactionId,
	/// Owning application user.
	pub user_id: UserId,
	/// Local account the transaction belongs to.
	pub account_id: AccountId,
	/// Magnitude of the transaction; direction lives in `kind`.
	pub amount: Decimal,
	/// Direction of the transaction.
	pub kind: TransactionKind,
	/// Human-readable description.
	pub description: String,
	/// Merchant or counterparty name, when one could be derived.
	pub merchant: Option<String>,
	/// Spending category assigned by the keyword heuristic.
	pub category: Category,
	/// Instant the transaction occurred at the provider.
	pub occurred_at: OffsetDateTime,
	/// Provider-assigned transaction identifier; drives idempotent imports.
	pub external_transaction_id: Option<String>,
	/// Origin of the record.
	pub import_source: ImportSource,
	/// Reconciliation state.
	pub sync_status: SyncStatus,
	/// Creation instant stamped by the store.
	pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn category_labels_match_their_serialized_form() {
		for category in [
			Category::Income,
			Category::FoodAndDining,
			Category::Transportation,
			Category::Healthcare,
			Category::BillsAndUtilities,
			Category::Shopping,
			Category::Other,
		] {
			let serialized =
				serde_json::to_string(&category).expect("Category should serialize to JSON.");

			assert_eq!(serialized, format!("\"{}\"", category.as_str()));
		}
	}
}
