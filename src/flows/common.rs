//! Shared helpers for flow implementations (credential lookup, sync guards).

// self
use crate::{
	_prelude::*,
	auth::{BankToken, BankTokenBuilderError, TokenId, UserId},
	error::ConfigError,
	flows::Broker,
	http::{ProviderHttpClient, TransportErrorMapper},
	store::BankTokenStore,
};

/// Returns (and creates on demand) the singleflight guard for a user's sync runs.
pub(crate) fn sync_guard<C, M>(broker: &Broker<C, M>, user_id: &UserId) -> Arc<AsyncMutex<()>>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	let mut guards = broker.sync_guards.lock();

	guards.entry(user_id.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
}

/// Resolves the credential a flow should sign with.
///
/// An explicit token id must exist and belong to the user; without one the user's
/// first credential for the broker's provider is used.
pub(crate) async fn resolve_credential<C, M>(
	broker: &Broker<C, M>,
	user_id: &UserId,
	token_id: Option<&TokenId>,
) -> Result<BankToken>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	match token_id {
		Some(id) => <dyn BankTokenStore>::find_by_id(broker.stores.tokens.as_ref(), user_id, id)
			.await?
			.ok_or(Error::NotFound { resource: "bank token" }),
		None => <dyn BankTokenStore>::first_for_provider(
			broker.stores.tokens.as_ref(),
			user_id,
			&broker.remote.descriptor.id,
		)
		.await?
		.ok_or_else(|| Error::NoCredential { provider: broker.remote.descriptor.id.to_string() }),
	}
}

/// Normalizes token builder errors into broker errors.
pub(crate) fn map_token_builder_error(err: BankTokenBuilderError) -> Error {
	ConfigError::from(err).into()
}
