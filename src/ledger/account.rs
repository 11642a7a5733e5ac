//! Financial account records and their provider correlation metadata.

// self
use crate::{
	_prelude::*,
	auth::id::{AccountId, TokenId, UserId},
};

/// Product category of a financial account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
	/// Day-to-day current account.
	Checking,
	/// Interest-bearing savings account.
	Savings,
	/// Revolving credit card account.
	CreditCard,
	/// Brokerage or investment account.
	Investment,
	/// Loan or mortgage account.
	Loan,
	/// Anything the bridge does not recognize.
	Other,
}

/// Correlation ids required before an account can take part in transaction sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncLink<'a> {
	/// Provider-assigned account identifier.
	pub external_account_id: &'a str,
	/// Credential the account was imported through.
	pub bank_id: &'a TokenId,
}

/// Draft account awaiting store-assigned identity and timestamps.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewFinancialAccount {
	/// Owning application user.
	pub user_id: UserId,
	/// Display name shown to the user.
	pub name: String,
	/// Product category.
	pub kind: AccountKind,
	/// Current balance.
	pub balance: Decimal,
	/// ISO currency code reported by the provider.
	pub currency: String,
	/// Provider-assigned account identifier, for synced accounts.
	pub external_account_id: Option<String>,
	/// Credential the account was imported through.
	pub bank_id: Option<TokenId>,
	/// Instant of the last successful sync touching this account.
	pub last_synced_at: Option<OffsetDateTime>,
}

/// Local financial account, either entered manually or imported from a provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FinancialAccount {
	/// Store-assigned identifier.
	pub id: AccountId,
	/// Owning application user.
	pub user_id: UserId,
	/// Display name shown to the user.
	pub name: String,
	/// Product category.
	pub kind: AccountKind,
	/// Current balance.
	pub balance: Decimal,
	/// ISO currency code reported by the provider.
	pub currency: String,
	/// Provider-assigned account identifier, for synced accounts.
	pub external_account_id: Option<String>,
	/// Credential the account was imported through.
	pub bank_id: Option<TokenId>,
	/// Instant of the last successful sync touching this account.
	pub last_synced_at: Option<OffsetDateTime>,
	/// Creation instant stamped by the store.
	pub created_at: OffsetDateTime,
	/// Last modification instant.
	pub updated_at: OffsetDateTime,
}
impl FinancialAccount {
	/// Returns the correlation ids when the account is fully linked to a provider.
	///
	/// Manually created accounts, or accounts whose credential was revoked before they were
	/// ever linked, return `None` and are skipped by transaction sync.
	pub fn sync_link(&self) -> Option<SyncLink<'_>> {
		match (self.external_account_id.as_deref(), self.bank_id.as_ref()) {
			(Some(external_account_id), Some(bank_id)) =>
				Some(SyncLink { external_account_id, bank_id }),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn account() -> FinancialAccount {
		FinancialAccount {
			id: AccountId::new("acc-1").expect("Account id fixture should be valid."),
			user_id: UserId::new("user-1").expect("User fixture should be valid."),
			name: "Checking".into(),
			kind: AccountKind::Checking,
			balance: Decimal::ZERO,
			currency: "USD".into(),
			external_account_id: Some("ext-1".into()),
			bank_id: Some(TokenId::new("tok-1").expect("Token id fixture should be valid.")),
			last_synced_at: None,
			created_at: macros::datetime!(2025-01-01 00:00 UTC),
			updated_at: macros::datetime!(2025-01-01 00:00 UTC),
		}
	}

	#[test]
	fn sync_link_requires_both_correlation_ids() {
		let linked = account();

		assert!(linked.sync_link().is_some());

		let mut missing_external = account();

		missing_external.external_account_id = None;

		assert!(missing_external.sync_link().is_none());

		let mut missing_bank = account();

		missing_bank.bank_id = None;

		assert!(missing_bank.sync_link().is_none());
	}

	#[test]
	fn account_kind_serializes_snake_case() {
		assert_eq!(
			serde_json::to_string(&AccountKind::CreditCard)
				.expect("Account kind should serialize."),
			"\"credit_card\""
		);
	}
}
