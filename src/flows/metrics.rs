// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for sync flow runs.
#[derive(Debug, Default)]
pub struct SyncMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	items_synced: AtomicU64,
	item_errors: AtomicU64,
}
impl SyncMetrics {
	/// Returns the total number of sync flow attempts.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of sync calls that produced a report.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of sync calls that failed outright.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the cumulative count of records written by sync runs.
	pub fn items_synced(&self) -> u64 {
		self.items_synced.load(Ordering::Relaxed)
	}

	/// Returns the cumulative count of per-item errors captured in reports.
	pub fn item_errors(&self) -> u64 {
		self.item_errors.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_items(&self, synced: usize, errors: usize) {
		self.items_synced.fetch_add(synced as u64, Ordering::Relaxed);
		self.item_errors.fetch_add(errors as u64, Ordering::Relaxed);
	}
}
