//! Pending handshake records tracking the gap between the authorize redirect and the callback.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret, error::HandshakeError};

/// Observable states of a three-legged handshake session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeState {
	/// Request token issued; waiting for the user to return from the consent page.
	Initiated,
	/// Request token claimed by a callback and spent on a token exchange.
	Exchanged,
}

/// Request-token session persisted between the authorize redirect and the provider callback.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingHandshake {
	/// Provider-issued request token; appears openly in redirect URLs.
	pub token: String,
	/// Request token secret used to sign the exchange call.
	pub secret: TokenSecret,
	/// Current session state.
	pub state: HandshakeState,
	/// Instant the handshake was initiated; drives TTL eviction.
	pub initiated_at: OffsetDateTime,
}
impl PendingHandshake {
	/// Creates a freshly initiated session.
	pub fn new(
		token: impl Into<String>,
		secret: TokenSecret,
		initiated_at: OffsetDateTime,
	) -> Self {
		Self { token: token.into(), secret, state: HandshakeState::Initiated, initiated_at }
	}

	/// Returns `true` once the session has outlived the supplied TTL.
	pub fn is_expired_at(&self, now: OffsetDateTime, ttl: Duration) -> bool {
		now - self.initiated_at >= ttl
	}

	/// Transitions the session into [`HandshakeState::Exchanged`].
	///
	/// A session can be exchanged exactly once; a second attempt means the request token is
	/// being replayed and is rejected as expired.
	pub fn begin_exchange(&mut self) -> Result<(), HandshakeError> {
		match self.state {
			HandshakeState::Initiated => {
				self.state = HandshakeState::Exchanged;

				Ok(())
			},
			HandshakeState::Exchanged => Err(HandshakeError::SessionExpired),
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn exchange_transition_is_one_shot() {
		let mut pending = PendingHandshake::new(
			"req-token",
			TokenSecret::new("req-secret"),
			macros::datetime!(2025-01-01 00:00 UTC),
		);

		assert_eq!(pending.state, HandshakeState::Initiated);

		pending.begin_exchange().expect("First exchange should be accepted.");

		assert_eq!(pending.state, HandshakeState::Exchanged);
		assert!(matches!(
			pending.begin_exchange().expect_err("Replayed exchange must be rejected."),
			HandshakeError::SessionExpired
		));
	}

	#[test]
	fn ttl_expiry_is_inclusive_at_the_boundary() {
		let initiated = macros::datetime!(2025-01-01 00:00 UTC);
		let pending = PendingHandshake::new("req-token", TokenSecret::new("s"), initiated);
		let ttl = Duration::minutes(10);

		assert!(!pending.is_expired_at(initiated + Duration::minutes(9), ttl));
		assert!(pending.is_expired_at(initiated + Duration::minutes(10), ttl));
		assert!(pending.is_expired_at(initiated + Duration::minutes(11), ttl));
	}
}
