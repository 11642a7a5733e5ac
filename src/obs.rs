//! Optional observability helpers for bridge flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `bankbridge.flow` with the `flow`
//!   (operation) and `stage` (call site) fields, plus warning events when remote
//!   vocabulary falls back to a default mapping.
//! - Enable `metrics` to increment the `bankbridge_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and the
//!   `bankbridge_mapping_fallback_total` counter labeled by `kind`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Bridge operations observed by the flows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// First handshake leg: request token and authorization redirect.
	Handshake,
	/// Final handshake leg: verifier exchange and credential persistence.
	Exchange,
	/// Account reconciliation for one user.
	AccountSync,
	/// Transaction import for one account.
	TransactionSync,
	/// Accounts plus transactions for every linked account.
	FullSync,
	/// Credential probe against the accounts endpoint.
	ConnectionTest,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Handshake => "handshake",
			FlowKind::Exchange => "exchange",
			FlowKind::AccountSync => "account_sync",
			FlowKind::TransactionSync => "transaction_sync",
			FlowKind::FullSync => "full_sync",
			FlowKind::ConnectionTest => "connection_test",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a bridge flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Remote-vocabulary fallbacks recorded during mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MappingFallback {
	/// Unknown remote account type defaulted to `Other`.
	AccountKind,
	/// Zero-value amount defaulted to `Transfer`.
	TransactionKind,
}
impl MappingFallback {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			MappingFallback::AccountKind => "account_kind",
			MappingFallback::TransactionKind => "transaction_kind",
		}
	}
}
impl Display for MappingFallback {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
