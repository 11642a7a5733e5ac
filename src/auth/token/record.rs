//! Bank credential records, drafts, and builders.

// self
use crate::{
	_prelude::*,
	auth::{
		id::{ProviderId, TokenId, UserId},
		token::secret::TokenSecret,
	},
};

/// Errors produced by [`BankTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum BankTokenBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
}

/// Draft bank credential awaiting store-assigned identity and timestamps.
#[derive(Clone, Serialize, Deserialize)]
pub struct NewBankToken {
	/// Owning application user.
	pub user_id: UserId,
	/// Provider this credential authenticates against.
	pub provider: ProviderId,
	/// OAuth 1.0a access token; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Companion token secret used to sign requests, if the provider issued one.
	pub access_token_secret: Option<TokenSecret>,
	/// Refresh token, for providers that layer one on top of the handshake.
	pub refresh_token: Option<TokenSecret>,
	/// Absolute expiry instant; `None` means the credential never expires.
	pub expires_at: Option<OffsetDateTime>,
}
impl NewBankToken {
	/// Returns a builder for assembling a credential draft.
	pub fn builder(user_id: UserId, provider: ProviderId) -> BankTokenBuilder {
		BankTokenBuilder::new(user_id, provider)
	}
}
impl Debug for NewBankToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("NewBankToken")
			.field("user_id", &self.user_id)
			.field("provider", &self.provider)
			.field("access_token", &"<redacted>")
			.field("access_token_secret", &self.access_token_secret.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Stored bank credential issued by a completed handshake or a manual import.
#[derive(Clone, Serialize, Deserialize)]
pub struct BankToken {
	/// Store-assigned identifier.
	pub id: TokenId,
	/// Owning application user.
	pub user_id: UserId,
	/// Provider this credential authenticates against.
	pub provider: ProviderId,
	/// OAuth 1.0a access token; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Companion token secret used to sign requests, if the provider issued one.
	pub access_token_secret: Option<TokenSecret>,
	/// Refresh token, for providers that layer one on top of the handshake.
	pub refresh_token: Option<TokenSecret>,
	/// Absolute expiry instant; `None` means the credential never expires.
	pub expires_at: Option<OffsetDateTime>,
	/// Creation instant stamped by the store.
	pub created_at: OffsetDateTime,
	/// Last modification instant.
	pub updated_at: OffsetDateTime,
}
impl BankToken {
	/// Returns `true` if the credential has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns `true` if the credential is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Replaces the token material after a re-authorization handshake.
	///
	/// Fresh OAuth 1.0a grants carry no expiry, so any previous expiry is cleared.
	pub fn rotate(
		&mut self,
		access_token: TokenSecret,
		access_token_secret: Option<TokenSecret>,
		now: OffsetDateTime,
	) {
		self.access_token = access_token;
		self.access_token_secret = access_token_secret;
		self.expires_at = None;
		self.updated_at = now;
	}

	/// Produces the secret-free summary exposed by credential listings.
	pub fn summary(&self) -> CredentialSummary {
		CredentialSummary {
			id: self.id.clone(),
			provider: self.provider.clone(),
			expires_at: self.expires_at,
			created_at: self.created_at,
			updated_at: self.updated_at,
		}
	}
}
impl Debug for BankToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BankToken")
			.field("id", &self.id)
			.field("user_id", &self.user_id)
			.field("provider", &self.provider)
			.field("access_token", &"<redacted>")
			.field("access_token_secret", &self.access_token_secret.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("created_at", &self.created_at)
			.field("updated_at", &self.updated_at)
			.finish()
	}
}

/// Secret-free view of a stored credential, safe to return from listing APIs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSummary {
	/// Store-assigned identifier.
	pub id: TokenId,
	/// Provider this credential authenticates against.
	pub provider: ProviderId,
	/// Absolute expiry instant; `None` means the credential never expires.
	pub expires_at: Option<OffsetDateTime>,
	/// Creation instant.
	pub created_at: OffsetDateTime,
	/// Last modification instant.
	pub updated_at: OffsetDateTime,
}

/// Builder for [`NewBankToken`].
#[derive(Clone, Debug)]
pub struct BankTokenBuilder {
	user_id: UserId,
	provider: ProviderId,
	access_token: Option<TokenSecret>,
	access_token_secret: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	expires_at: Option<OffsetDateTime>,
}
impl BankTokenBuilder {
	fn new(user_id: UserId, provider: ProviderId) -> Self {
		Self {
			user_id,
			provider,
			access_token: None,
			access_token_secret: None,
			refresh_token: None,
			expires_at: None,
		}
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the companion token secret.
	pub fn access_token_secret(mut self, secret: impl Into<String>) -> Self {
		self.access_token_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Consumes the builder and produces a [`NewBankToken`] draft.
	pub fn build(self) -> Result<NewBankToken, BankTokenBuilderError> {
		let access_token = self.access_token.ok_or(BankTokenBuilderError::MissingAccessToken)?;

		Ok(NewBankToken {
			user_id: self.user_id,
			provider: self.provider,
			access_token,
			access_token_secret: self.access_token_secret,
			refresh_token: self.refresh_token,
			expires_at: self.expires_at,
		})
	}
}
