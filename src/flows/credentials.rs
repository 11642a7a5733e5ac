//! Credential management entry points (create, list, revoke, connectivity probe).

// self
use crate::{
	_prelude::*,
	auth::{BankToken, CredentialSummary, NewBankToken, TokenId, UserId},
	flows::{Broker, common},
	http::{ProviderHttpClient, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::BankTokenStore,
};

impl<C, M> Broker<C, M>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Persists a caller-supplied credential, rejecting a second one per provider.
	pub async fn create_credential(&self, draft: NewBankToken) -> Result<BankToken> {
		let existing = <dyn BankTokenStore>::first_for_provider(
			self.stores.tokens.as_ref(),
			&draft.user_id,
			&draft.provider,
		)
		.await?;

		if existing.is_some() {
			return Err(Error::DuplicateCredential { provider: draft.provider.to_string() });
		}

		Ok(<dyn BankTokenStore>::create(self.stores.tokens.as_ref(), draft).await?)
	}

	/// Lists the user's stored credentials without exposing secret material.
	pub async fn list_credentials(&self, user_id: &UserId) -> Result<Vec<CredentialSummary>> {
		let records =
			<dyn BankTokenStore>::list_for_user(self.stores.tokens.as_ref(), user_id).await?;

		Ok(records.iter().map(BankToken::summary).collect())
	}

	/// Deletes a stored credential owned by the user.
	pub async fn revoke_credential(&self, user_id: &UserId, token_id: &TokenId) -> Result<()> {
		let deleted =
			<dyn BankTokenStore>::delete(self.stores.tokens.as_ref(), user_id, token_id).await?;

		if deleted { Ok(()) } else { Err(Error::NotFound { resource: "bank token" }) }
	}

	/// Probes the provider's accounts endpoint with a stored credential.
	///
	/// Any probe failure reads as `false`; only credential lookup errors surface.
	pub async fn test_connection(
		&self,
		user_id: &UserId,
		token_id: Option<&TokenId>,
	) -> Result<bool> {
		const KIND: FlowKind = FlowKind::ConnectionTest;

		let span = FlowSpan::new(KIND, "test_connection");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let credential = common::resolve_credential(self, user_id, token_id).await?;

				Ok(self.remote.probe_connection(&credential).await)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
