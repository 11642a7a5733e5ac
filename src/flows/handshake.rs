//! Three-legged handshake orchestration.
//!
//! The broker exposes [`Broker::start_handshake`] and [`Broker::complete_handshake`] as
//! the two server-side legs of the OAuth 1.0a dance. `start_handshake` obtains a
//! request token, parks it in the pending store, and hands back the provider's
//! authorization URL; `complete_handshake` claims the parked token exactly once,
//! exchanges it for a long-lived credential, and persists (or rotates) the user's
//! bank token.

// self
use crate::{
	_prelude::*,
	auth::{BankToken, NewBankToken, PendingHandshake, TokenSecret, UserId},
	error::HandshakeError,
	flows::{Broker, common},
	http::{ProviderHttpClient, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{BankTokenStore, RequestTokenStore},
};

/// Outcome of a successful [`Broker::start_handshake`] call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeRedirect {
	/// Provider page the user must visit to approve access.
	pub authorize_url: Url,
	/// Request token embedded in the redirect; echoed back on the callback leg.
	pub request_token: String,
}

impl<C, M> Broker<C, M>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Starts a handshake by obtaining and parking a fresh request token.
	pub async fn start_handshake(&self) -> Result<HandshakeRedirect> {
		const KIND: FlowKind = FlowKind::Handshake;

		let span = FlowSpan::new(KIND, "start_handshake");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let grant = self.remote.request_token().await?;
				let pending = PendingHandshake::new(
					grant.token.clone(),
					grant.secret,
					OffsetDateTime::now_utc(),
				);

				<dyn RequestTokenStore>::insert(self.stores.pending.as_ref(), pending).await?;

				Ok(HandshakeRedirect {
					authorize_url: self.remote.descriptor.authorize_url(&grant.token),
					request_token: grant.token,
				})
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Completes a handshake from the provider's callback parameters.
	///
	/// The parked request token is claimed exactly once; replays and expired sessions
	/// surface as [`HandshakeError::SessionExpired`]. When the user already holds a
	/// credential for this provider the stored record is rotated in place instead of
	/// creating a duplicate.
	pub async fn complete_handshake(
		&self,
		user_id: &UserId,
		oauth_token: &str,
		oauth_verifier: &str,
	) -> Result<BankToken> {
		const KIND: FlowKind = FlowKind::Exchange;

		let span = FlowSpan::new(KIND, "complete_handshake");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut pending =
					<dyn RequestTokenStore>::claim(self.stores.pending.as_ref(), oauth_token)
						.await?
						.ok_or(HandshakeError::SessionExpired)?;

				pending.begin_exchange()?;

				let grant = self
					.remote
					.exchange_request_token(&pending.token, &pending.secret, oauth_verifier)
					.await?;
				let provider = self.remote.descriptor.id.clone();
				let existing = <dyn BankTokenStore>::first_for_provider(
					self.stores.tokens.as_ref(),
					user_id,
					&provider,
				)
				.await?;

				match existing {
					Some(mut credential) => {
						credential.rotate(
							TokenSecret::new(grant.token),
							Some(grant.secret),
							OffsetDateTime::now_utc(),
						);

						<dyn BankTokenStore>::update(
							self.stores.tokens.as_ref(),
							credential.clone(),
						)
						.await?;

						Ok(credential)
					},
					None => {
						let draft = NewBankToken::builder(user_id.clone(), provider)
							.access_token(grant.token)
							.access_token_secret(grant.secret.expose())
							.build()
							.map_err(common::map_token_builder_error)?;

						Ok(<dyn BankTokenStore>::create(self.stores.tokens.as_ref(), draft)
							.await?)
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
