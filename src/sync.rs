//! Sync vocabulary shared by the reconciliation flows.
//!
//! `report` holds the partial-failure report types every sync operation returns; one bad
//! remote record lands in an error list instead of aborting the batch. `classify` holds
//! the merchant and category heuristics applied to imported transactions.

/// Merchant extraction and category heuristics.
pub mod classify;
/// Partial-failure reports produced by sync flows.
pub mod report;

pub use classify::*;
pub use report::*;
