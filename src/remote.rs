//! Signed client for a provider's handshake and data endpoints.
//!
//! [`RemoteClient`] owns the consumer credentials and the provider descriptor, signs every
//! outgoing request through [`crate::oauth::SignatureBuilder`], and parses the responses
//! into typed payloads. Handshake legs (`POST`) run exactly once; data reads (`GET`) are
//! idempotent and retried per [`RetryPolicy`] with a fresh nonce and timestamp on every
//! attempt, since a signature is only valid for the attempt it was computed for.

/// Remote-to-local vocabulary mapping.
pub mod map;
/// Retry policy for idempotent provider reads.
pub mod retry;

pub use map::*;
pub use retry::*;

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	auth::{BankToken, TokenSecret},
	error::{HandshakeError, RemoteError, TransportError},
	http::{ProviderHttpClient, ProviderRequest, ProviderResponse, TransportErrorMapper},
	oauth::{ConsumerCredentials, HttpMethod, SignatureBuilder},
	provider::{ProviderDescriptor, TokenResponseFormat},
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Token credential issued by a provider's token endpoints.
///
/// Covers both handshake legs: the initiate endpoint issues a request token and the
/// exchange endpoint issues the long-lived access token.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Public token key; travels on the wire with every signed request.
	pub token: String,
	/// Matching secret; enters the signing key, never the wire.
	pub secret: TokenSecret,
}
impl TokenGrant {
	/// Picks the wire format for a token response from its `Content-Type` header.
	pub fn detect_format(content_type: Option<&str>) -> Result<TokenResponseFormat, HandshakeError> {
		let Some(raw) = content_type else {
			return Err(HandshakeError::UnsupportedResponseFormat {
				content_type: "(missing)".into(),
			});
		};
		let lowered = raw.to_ascii_lowercase();

		if lowered.contains("json") {
			Ok(TokenResponseFormat::Json)
		} else if lowered.contains("x-www-form-urlencoded") || lowered.contains("text/plain") {
			Ok(TokenResponseFormat::FormEncoded)
		} else {
			Err(HandshakeError::UnsupportedResponseFormat { content_type: raw.to_owned() })
		}
	}

	/// Parses a token endpoint response body in the given format.
	///
	/// Blank `oauth_token`/`oauth_token_secret` values count as missing; a blank token
	/// cannot be signed with.
	pub fn parse(format: TokenResponseFormat, body: &str) -> Result<Self, HandshakeError> {
		let (token, secret) = match format {
			TokenResponseFormat::FormEncoded => {
				let mut token = None;
				let mut secret = None;

				for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
					match key.as_ref() {
						"oauth_token" => token = Some(value.into_owned()),
						"oauth_token_secret" => secret = Some(value.into_owned()),
						_ => (),
					}
				}

				(token, secret)
			},
			TokenResponseFormat::Json => {
				let mut deserializer = serde_json::Deserializer::from_str(body);
				let raw: RawTokenGrant = serde_path_to_error::deserialize(&mut deserializer)
					.map_err(|source| HandshakeError::GrantParse { source })?;

				(raw.oauth_token, raw.oauth_token_secret)
			},
		};
		let token = token
			.filter(|token| !token.is_empty())
			.ok_or(HandshakeError::MissingTokenField { field: "oauth_token" })?;
		let secret = secret
			.filter(|secret| !secret.is_empty())
			.ok_or(HandshakeError::MissingTokenField { field: "oauth_token_secret" })?;

		Ok(Self { token, secret: TokenSecret::new(secret) })
	}
}

#[derive(Deserialize)]
struct RawTokenGrant {
	oauth_token: Option<String>,
	oauth_token_secret: Option<String>,
}

/// Account collection envelope returned by the accounts endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct AccountsEnvelope {
	/// Remote accounts in provider order.
	#[serde(default)]
	pub accounts: Vec<RemoteAccount>,
}

/// Transaction collection envelope returned by the transactions endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct TransactionsEnvelope {
	/// Remote transactions in provider order.
	#[serde(default)]
	pub transactions: Vec<RemoteTransaction>,
}

/// Account record as the provider reports it.
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteAccount {
	/// Provider-scoped account identifier; the sync correlation key.
	pub id: String,
	/// Human-readable label, when the provider sends one.
	#[serde(default)]
	pub label: Option<String>,
	/// Balance block; absent means the balance is unknown.
	#[serde(default)]
	pub balance: Option<RemoteBalance>,
	/// Provider's account type vocabulary, mapped locally via [`account_kind_for`].
	#[serde(default)]
	pub account_type: Option<String>,
}
impl RemoteAccount {
	/// Label to store locally; falls back to the remote identifier.
	pub fn display_label(&self) -> &str {
		self.label.as_deref().filter(|label| !label.trim().is_empty()).unwrap_or(&self.id)
	}

	/// Parses the balance amount; a missing balance block reads as zero.
	pub fn balance_amount(&self) -> Result<Decimal, RemoteError> {
		let Some(balance) = &self.balance else { return Ok(Decimal::ZERO) };

		Decimal::from_str(balance.amount.trim())
			.map_err(|_| RemoteError::MalformedAmount { value: balance.amount.clone() })
	}

	/// Currency code, when present.
	pub fn currency(&self) -> Option<&str> {
		self.balance.as_ref().and_then(|balance| balance.currency.as_deref())
	}
}

/// Balance block nested inside a remote account.
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteBalance {
	/// Decimal amount carried as a string to avoid float drift.
	pub amount: String,
	/// ISO 4217 currency code.
	#[serde(default)]
	pub currency: Option<String>,
}

/// Transaction record as the provider reports it.
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteTransaction {
	/// Provider-scoped transaction identifier; the sync correlation key.
	pub id: String,
	/// Amount and description block.
	#[serde(default)]
	pub details: RemoteTransactionDetails,
	/// Counterparty block used for merchant extraction.
	#[serde(default)]
	pub counterparty: Option<RemoteCounterparty>,
	/// Booking time as RFC 3339, when the provider sends one.
	#[serde(default)]
	pub booked_at: Option<String>,
}
impl RemoteTransaction {
	/// Signed amount parsed as a decimal; negative means money out.
	pub fn signed_amount(&self) -> Result<Decimal, RemoteError> {
		let value = self
			.details
			.value
			.as_ref()
			.ok_or_else(|| RemoteError::MissingAmount { id: self.id.clone() })?;

		Decimal::from_str(value.amount.trim())
			.map_err(|_| RemoteError::MalformedAmount { value: value.amount.clone() })
	}

	/// Description to store locally; falls back to the remote identifier.
	pub fn display_label(&self) -> &str {
		self.details
			.description
			.as_deref()
			.filter(|description| !description.trim().is_empty())
			.unwrap_or(&self.id)
	}

	/// Booking time, or `fallback` when the field is absent or malformed.
	pub fn booked_at_or(&self, fallback: OffsetDateTime) -> OffsetDateTime {
		self.booked_at
			.as_deref()
			.and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok())
			.unwrap_or(fallback)
	}
}

/// Amount and description block nested inside a remote transaction.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RemoteTransactionDetails {
	/// Signed amount; absent means the record is unusable.
	#[serde(default)]
	pub value: Option<RemoteAmount>,
	/// Primary description line.
	#[serde(default)]
	pub description: Option<String>,
	/// Secondary narrative line some providers emit instead of a counterparty.
	#[serde(default)]
	pub narrative: Option<String>,
}

/// Amount block nested inside the transaction details.
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteAmount {
	/// Decimal amount carried as a string to avoid float drift.
	pub amount: String,
}

/// Counterparty block nested inside a remote transaction.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RemoteCounterparty {
	/// Counterparty display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Account holder name some providers send instead of `name`.
	#[serde(default)]
	pub holder_name: Option<String>,
}

/// Signed client bound to one provider descriptor and one consumer credential.
pub struct RemoteClient<C, M>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	pub(crate) http_client: Arc<C>,
	pub(crate) transport_mapper: Arc<M>,
	/// Descriptor the client signs against.
	pub descriptor: ProviderDescriptor,
	pub(crate) consumer: ConsumerCredentials,
	/// Retry policy applied to idempotent reads.
	pub retry_policy: RetryPolicy,
}
impl<C, M> RemoteClient<C, M>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	/// Creates a client from its parts with the default retry policy.
	pub fn new(
		http_client: Arc<C>,
		transport_mapper: Arc<M>,
		descriptor: ProviderDescriptor,
		consumer: ConsumerCredentials,
	) -> Self {
		Self {
			http_client,
			transport_mapper,
			descriptor,
			consumer,
			retry_policy: RetryPolicy::default(),
		}
	}

	/// First handshake leg: obtains an unauthorized request token.
	pub async fn request_token(&self) -> Result<TokenGrant> {
		let url = self.descriptor.endpoints.initiate.clone();
		let authorization =
			self.signer(HttpMethod::Post, &url).with_callback(&self.descriptor.callback).build();
		let response = self
			.execute(ProviderRequest { method: HttpMethod::Post, url, authorization })
			.await?;

		if !response.is_success() {
			return Err(HandshakeError::InitiateRejected {
				status: response.status,
				body: body_preview(&response.body),
			}
			.into());
		}

		self.parse_grant(&response).map_err(Into::into)
	}

	/// Final handshake leg: trades an authorized request token for an access token.
	pub async fn exchange_request_token(
		&self,
		token: &str,
		secret: &TokenSecret,
		verifier: &str,
	) -> Result<TokenGrant> {
		let url = self.descriptor.endpoints.token.clone();
		let authorization = self
			.signer(HttpMethod::Post, &url)
			.with_token(token, Some(secret))
			.with_verifier(verifier)
			.build();
		let response = self
			.execute(ProviderRequest { method: HttpMethod::Post, url, authorization })
			.await?;

		if !response.is_success() {
			return Err(HandshakeError::ExchangeRejected {
				status: response.status,
				body: body_preview(&response.body),
			}
			.into());
		}

		self.parse_grant(&response).map_err(Into::into)
	}

	/// Lists the accounts the token's owner holds at the provider.
	pub async fn fetch_accounts(&self, token: &BankToken) -> Result<Vec<RemoteAccount>> {
		let url = self.descriptor.endpoints.accounts.clone();
		let response = self.signed_get(url, token).await?;
		let envelope = parse_payload::<AccountsEnvelope>(&response.body)?;

		Ok(envelope.accounts)
	}

	/// Lists recent transactions for one remote account.
	pub async fn fetch_transactions(
		&self,
		token: &BankToken,
		external_account_id: &str,
		limit: u32,
	) -> Result<Vec<RemoteTransaction>> {
		let mut url = self.descriptor.transactions_url(external_account_id);

		url.query_pairs_mut().append_pair("limit", &limit.to_string());

		let response = self.signed_get(url, token).await?;
		let envelope = parse_payload::<TransactionsEnvelope>(&response.body)?;

		Ok(envelope.transactions)
	}

	/// Probes the accounts endpoint and reports whether the credential still works.
	pub async fn probe_connection(&self, token: &BankToken) -> bool {
		let url = self.descriptor.endpoints.accounts.clone();

		self.signed_get(url, token).await.is_ok()
	}

	fn signer<'a>(&'a self, method: HttpMethod, url: &'a Url) -> SignatureBuilder<'a> {
		let mut builder = SignatureBuilder::new(&self.consumer, method, url);

		if let Some(realm) = self.descriptor.quirks.realm.as_deref() {
			builder = builder.with_realm(realm);
		}

		builder
	}

	async fn signed_get(&self, url: Url, token: &BankToken) -> Result<ProviderResponse> {
		let mut attempt = 1_u32;

		loop {
			// Nonce and timestamp are baked into the signature, so each attempt signs afresh.
			let authorization = self
				.signer(HttpMethod::Get, &url)
				.with_token(token.access_token.expose(), token.access_token_secret.as_ref())
				.build();
			let result = self
				.execute(ProviderRequest {
					method: HttpMethod::Get,
					url: url.clone(),
					authorization,
				})
				.await;

			match result {
				Ok(response) if response.is_success() => return Ok(response),
				Ok(response) => {
					if self.retry_policy.is_retryable_status(response.status)
						&& self.retry_policy.allows_another(attempt)
					{
						self.http_client.sleep(self.retry_policy.backoff(attempt)).await;

						attempt += 1;

						continue;
					}

					return Err(RemoteError::Endpoint {
						status: response.status,
						body: body_preview(&response.body),
					}
					.into());
				},
				Err(error) => {
					if error.is_retryable() && self.retry_policy.allows_another(attempt) {
						self.http_client.sleep(self.retry_policy.backoff(attempt)).await;

						attempt += 1;

						continue;
					}

					return Err(error.into());
				},
			}
		}
	}

	async fn execute(&self, request: ProviderRequest) -> Result<ProviderResponse, TransportError> {
		self.http_client
			.execute(request)
			.await
			.map_err(|error| self.transport_mapper.map_transport_error(error))
	}

	fn parse_grant(&self, response: &ProviderResponse) -> Result<TokenGrant, HandshakeError> {
		let format = match self.descriptor.quirks.token_response_format {
			Some(format) => format,
			None => TokenGrant::detect_format(response.content_type.as_deref())?,
		};

		TokenGrant::parse(format, &response.body)
	}
}
impl<C, M> Clone for RemoteClient<C, M>
where
	C: ProviderHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			transport_mapper: Arc::clone(&self.transport_mapper),
			descriptor: self.descriptor.clone(),
			consumer: self.consumer.clone(),
			retry_policy: self.retry_policy,
		}
	}
}

fn parse_payload<'a, T>(body: &'a str) -> Result<T, RemoteError>
where
	T: Deserialize<'a>,
{
	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| RemoteError::Payload { source })
}

fn body_preview(body: &str) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn detect_format_reads_content_type_families() {
		assert_eq!(
			TokenGrant::detect_format(Some("application/json; charset=utf-8"))
				.expect("JSON content type should be detected."),
			TokenResponseFormat::Json,
		);
		assert_eq!(
			TokenGrant::detect_format(Some("application/x-www-form-urlencoded"))
				.expect("Form content type should be detected."),
			TokenResponseFormat::FormEncoded,
		);
		assert_eq!(
			TokenGrant::detect_format(Some("text/plain"))
				.expect("Plain text should fall back to form decoding."),
			TokenResponseFormat::FormEncoded,
		);
		assert!(matches!(
			TokenGrant::detect_format(Some("text/html")),
			Err(HandshakeError::UnsupportedResponseFormat { .. }),
		));
		assert!(matches!(
			TokenGrant::detect_format(None),
			Err(HandshakeError::UnsupportedResponseFormat { .. }),
		));
	}

	#[test]
	fn grants_parse_from_both_wire_formats() {
		let form = TokenGrant::parse(
			TokenResponseFormat::FormEncoded,
			"oauth_token=req%2Dtoken&oauth_token_secret=req%2Dsecret&oauth_callback_confirmed=true",
		)
		.expect("Form grant should parse.");

		assert_eq!(form.token, "req-token");
		assert_eq!(form.secret.expose(), "req-secret");

		let json = TokenGrant::parse(
			TokenResponseFormat::Json,
			r#"{"oauth_token":"acc-token","oauth_token_secret":"acc-secret"}"#,
		)
		.expect("JSON grant should parse.");

		assert_eq!(json.token, "acc-token");
		assert_eq!(json.secret.expose(), "acc-secret");
	}

	#[test]
	fn grants_reject_missing_or_blank_fields() {
		assert!(matches!(
			TokenGrant::parse(TokenResponseFormat::FormEncoded, "oauth_token=only"),
			Err(HandshakeError::MissingTokenField { field: "oauth_token_secret" }),
		));
		assert!(matches!(
			TokenGrant::parse(TokenResponseFormat::FormEncoded, "oauth_token=&oauth_token_secret=s"),
			Err(HandshakeError::MissingTokenField { field: "oauth_token" }),
		));
		assert!(matches!(
			TokenGrant::parse(TokenResponseFormat::Json, "{not json"),
			Err(HandshakeError::GrantParse { .. }),
		));
	}

	#[test]
	fn account_helpers_normalize_remote_payloads() {
		let account: RemoteAccount = serde_json::from_str(
			r#"{"id":"acc1","label":"  ","balance":{"amount":" 120.55 ","currency":"USD"}}"#,
		)
		.expect("Account payload should deserialize.");

		assert_eq!(account.display_label(), "acc1");
		assert_eq!(
			account.balance_amount().expect("Padded decimal should parse."),
			Decimal::new(12_055, 2),
		);
		assert_eq!(account.currency(), Some("USD"));

		let bare: RemoteAccount =
			serde_json::from_str(r#"{"id":"acc2"}"#).expect("Minimal payload should deserialize.");

		assert_eq!(bare.balance_amount().expect("Missing balance should read as zero."), Decimal::ZERO);
		assert_eq!(bare.currency(), None);

		let malformed: RemoteAccount =
			serde_json::from_str(r#"{"id":"acc3","balance":{"amount":"12,00"}}"#)
				.expect("Payload should deserialize even with a bad amount.");

		assert!(matches!(
			malformed.balance_amount(),
			Err(RemoteError::MalformedAmount { .. }),
		));
	}

	#[test]
	fn transaction_helpers_normalize_remote_payloads() {
		let transaction: RemoteTransaction = serde_json::from_str(
			r#"{"id":"tx1","details":{"value":{"amount":"-42.50"},"description":"Shell Gas Station"},"booked_at":"2026-08-20T10:00:00Z"}"#,
		)
		.expect("Transaction payload should deserialize.");

		assert_eq!(
			transaction.signed_amount().expect("Signed amount should parse."),
			Decimal::new(-4_250, 2),
		);
		assert_eq!(transaction.display_label(), "Shell Gas Station");
		assert_eq!(
			transaction.booked_at_or(OffsetDateTime::UNIX_EPOCH),
			time::macros::datetime!(2026-08-20 10:00:00 UTC),
		);

		let missing: RemoteTransaction =
			serde_json::from_str(r#"{"id":"tx2"}"#).expect("Minimal payload should deserialize.");

		assert!(matches!(missing.signed_amount(), Err(RemoteError::MissingAmount { .. })));
		assert_eq!(missing.display_label(), "tx2");
		assert_eq!(missing.booked_at_or(OffsetDateTime::UNIX_EPOCH), OffsetDateTime::UNIX_EPOCH);
	}
}
