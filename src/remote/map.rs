// std
use std::cmp::Ordering;
// self
use crate::{
	_prelude::*,
	ledger::{AccountKind, TransactionKind},
	obs,
};

/// Maps a provider's account type vocabulary onto [`AccountKind`].
///
/// Unknown values land on [`AccountKind::Other`] instead of failing the sync; the
/// fallback is recorded so new provider vocabulary shows up in the logs.
pub fn account_kind_for(remote_type: &str) -> AccountKind {
	match remote_type.trim().to_ascii_uppercase().as_str() {
		"CURRENT" | "CHECKING" => AccountKind::Checking,
		"SAVINGS" | "SAVING" => AccountKind::Savings,
		"CREDIT_CARD" | "CREDIT" => AccountKind::CreditCard,
		"INVESTMENT" => AccountKind::Investment,
		"LOAN" => AccountKind::Loan,
		other => {
			obs::record_mapping_fallback(obs::MappingFallback::AccountKind, other);

			AccountKind::Other
		},
	}
}

/// Classifies a signed amount into [`TransactionKind`].
///
/// Positive means money in, negative means money out. Zero-value records are rare
/// provider artifacts; they are kept as transfers rather than dropped.
pub fn transaction_kind_for(amount: Decimal) -> TransactionKind {
	match amount.cmp(&Decimal::ZERO) {
		Ordering::Greater => TransactionKind::Income,
		Ordering::Less => TransactionKind::Expense,
		Ordering::Equal => {
			obs::record_mapping_fallback(obs::MappingFallback::TransactionKind, "0");

			TransactionKind::Transfer
		},
	}
}
