// self
use crate::_prelude::*;

/// Retry policy for idempotent provider reads.
///
/// Handshake legs are never retried: replaying a POST could consume a one-shot token
/// server-side even when the response never arrived. GET requests re-sign and resend on
/// transport failures and on HTTP 429/5xx, with exponential backoff between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total attempts including the first; `1` disables retries.
	pub max_attempts: u32,
	/// Delay before the first retry, doubled for each one after.
	pub base_delay: Duration,
}
impl RetryPolicy {
	/// Whether another attempt may follow the given completed attempt.
	pub fn allows_another(&self, attempt: u32) -> bool {
		attempt < self.max_attempts
	}

	/// Whether the HTTP status is worth retrying.
	pub fn is_retryable_status(&self, status: u16) -> bool {
		status == 429 || status >= 500
	}

	/// Backoff delay applied after the given attempt.
	pub fn backoff(&self, attempt: u32) -> Duration {
		// Capped exponent keeps the multiplication comfortably inside i64 nanoseconds.
		self.base_delay * 2_i32.pow(attempt.saturating_sub(1).min(16))
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { max_attempts: 3, base_delay: Duration::milliseconds(500) }
	}
}
