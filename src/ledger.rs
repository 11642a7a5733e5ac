//! Local ledger models kept in sync with provider data.

pub mod account;
pub mod transaction;

pub use account::*;
pub use transaction::*;
