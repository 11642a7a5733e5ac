//! OAuth 1.0a request signing.
//!
//! Every provider call carries an `Authorization: OAuth ...` header produced here. The
//! signature base string follows RFC 5849: the uppercase method, the percent-encoded URL
//! stripped of its query string, and the percent-encoded parameter set (protocol parameters,
//! URL query pairs, and any extra request parameters), each parameter encoded before sorting.
//! The HMAC-SHA1 key is `encode(consumer_secret) & encode(token_secret)`, where the token
//! segment is empty until a token has been issued.

// std
use std::borrow::Cow;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngCore;
use sha1::Sha1;
// self
use crate::{_prelude::*, auth::token::secret::TokenSecret, error::ConfigError};

type HmacSha1 = Hmac<Sha1>;

const NONCE_LEN: usize = 16;
const OAUTH_VERSION: &str = "1.0";
const SIGNATURE_METHOD: &str = "HMAC-SHA1";
// RFC 3986 unreserved characters survive; everything else is escaped, including the
// sub-delimiters `!*'()` that stdlib-ish encoders often leave alone.
const PARAMETER_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Application credentials registered with the provider.
#[derive(Clone, Debug)]
pub struct ConsumerCredentials {
	/// Public consumer key sent with every signed request.
	pub key: String,
	/// Consumer secret; enters the signing key, never the wire.
	pub secret: TokenSecret,
}
impl ConsumerCredentials {
	/// Validates and wraps a consumer key/secret pair.
	pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self, ConfigError> {
		let key = key.into();

		if key.trim().is_empty() {
			return Err(ConfigError::MissingConsumerKey);
		}

		let secret = secret.into();

		if secret.trim().is_empty() {
			return Err(ConfigError::MissingConsumerSecret);
		}

		Ok(Self { key, secret: TokenSecret::new(secret) })
	}
}

/// HTTP methods the bridge signs; the method is part of the signature base string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
	/// Idempotent data fetch; eligible for retry.
	Get,
	/// Handshake leg; never retried.
	Post,
}
impl HttpMethod {
	/// Returns the uppercase wire form used in the base string.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Signed `Authorization` header plus the inputs a caller may want to audit.
#[derive(Clone, Debug)]
pub struct AuthorizationHeader {
	/// Full header value, `OAuth k="v", ...` with keys in sorted order.
	pub value: String,
	/// Base64 HMAC-SHA1 signature before percent-encoding.
	pub signature: String,
	/// Nonce used for this request.
	pub nonce: String,
	/// Unix timestamp used for this request.
	pub timestamp: i64,
}

struct SigningToken<'a> {
	key: &'a str,
	secret: Option<&'a TokenSecret>,
}

/// One-shot builder assembling a signed header for a single provider request.
///
/// Nonce and timestamp are freshly generated per [`build`](Self::build) unless overridden,
/// which the deterministic signature tests rely on.
pub struct SignatureBuilder<'a> {
	consumer: &'a ConsumerCredentials,
	method: HttpMethod,
	url: &'a Url,
	token: Option<SigningToken<'a>>,
	realm: Option<&'a str>,
	oauth_params: Vec<(&'static str, String)>,
	request_params: Vec<(String, String)>,
	nonce: Option<String>,
	timestamp: Option<i64>,
}
impl<'a> SignatureBuilder<'a> {
	/// Starts a builder for the given consumer, method, and request URL.
	///
	/// Query pairs already present on `url` are signed automatically.
	pub fn new(consumer: &'a ConsumerCredentials, method: HttpMethod, url: &'a Url) -> Self {
		Self {
			consumer,
			method,
			url,
			token: None,
			realm: None,
			oauth_params: Vec::new(),
			request_params: Vec::new(),
			nonce: None,
			timestamp: None,
		}
	}

	/// Signs with a token credential (request token or access token).
	pub fn with_token(mut self, key: &'a str, secret: Option<&'a TokenSecret>) -> Self {
		self.token = Some(SigningToken { key, secret });

		self
	}

	/// Adds the `oauth_callback` protocol parameter carried by the initiate leg.
	pub fn with_callback(mut self, callback: &Url) -> Self {
		self.oauth_params.push(("oauth_callback", callback.as_str().to_owned()));

		self
	}

	/// Adds the `oauth_verifier` protocol parameter carried by the exchange leg.
	pub fn with_verifier(mut self, verifier: &str) -> Self {
		self.oauth_params.push(("oauth_verifier", verifier.to_owned()));

		self
	}

	/// Adds a non-protocol parameter that travels outside the URL (for example a form body
	/// pair) and must still enter the signature base string.
	pub fn with_request_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.request_params.push((key.into(), value.into()));

		self
	}

	/// Prefixes the header with an unsigned `realm` attribute.
	pub fn with_realm(mut self, realm: &'a str) -> Self {
		self.realm = Some(realm);

		self
	}

	/// Overrides the generated nonce; intended for deterministic tests.
	pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
		self.nonce = Some(nonce.into());

		self
	}

	/// Overrides the generated timestamp; intended for deterministic tests.
	pub fn with_timestamp(mut self, timestamp: i64) -> Self {
		self.timestamp = Some(timestamp);

		self
	}

	/// Assembles the signature base string, signs it, and renders the header.
	pub fn build(self) -> AuthorizationHeader {
		let nonce = self.nonce.unwrap_or_else(fresh_nonce);
		let timestamp =
			self.timestamp.unwrap_or_else(|| OffsetDateTime::now_utc().unix_timestamp());
		let mut base_url = self.url.clone();

		base_url.set_query(None);
		base_url.set_fragment(None);

		let mut protocol_params = vec![
			("oauth_consumer_key".to_owned(), self.consumer.key.clone()),
			("oauth_nonce".to_owned(), nonce.clone()),
			("oauth_signature_method".to_owned(), SIGNATURE_METHOD.to_owned()),
			("oauth_timestamp".to_owned(), timestamp.to_string()),
			("oauth_version".to_owned(), OAUTH_VERSION.to_owned()),
		];

		if let Some(token) = &self.token {
			protocol_params.push(("oauth_token".to_owned(), token.key.to_owned()));
		}

		protocol_params
			.extend(self.oauth_params.iter().map(|(key, value)| ((*key).to_owned(), value.clone())));

		let mut base_params = protocol_params
			.iter()
			.map(|(key, value)| (oauth_encode(key).into_owned(), oauth_encode(value).into_owned()))
			.collect::<Vec<_>>();

		base_params.extend(
			self.url
				.query_pairs()
				.map(|(key, value)| (oauth_encode(&key).into_owned(), oauth_encode(&value).into_owned())),
		);
		base_params.extend(
			self.request_params
				.iter()
				.map(|(key, value)| (oauth_encode(key).into_owned(), oauth_encode(value).into_owned())),
		);
		// Sorted after encoding, by name then value.
		base_params.sort();

		let parameter_string =
			base_params.iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&");
		let base_string = format!(
			"{}&{}&{}",
			self.method.as_str(),
			oauth_encode(base_url.as_str()),
			oauth_encode(&parameter_string)
		);
		let token_secret = self
			.token
			.as_ref()
			.and_then(|token| token.secret)
			.map(TokenSecret::expose)
			.unwrap_or_default();
		let signing_key = format!(
			"{}&{}",
			oauth_encode(self.consumer.secret.expose()),
			oauth_encode(token_secret)
		);
		let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
			.expect("HMAC-SHA1 accepts keys of any length.");

		mac.update(base_string.as_bytes());

		let signature = STANDARD.encode(mac.finalize().into_bytes());
		let mut header_params = protocol_params;

		header_params.push(("oauth_signature".to_owned(), signature.clone()));
		header_params.sort();

		let rendered = header_params
			.iter()
			.map(|(key, value)| format!(r#"{}="{}""#, oauth_encode(key), oauth_encode(value)))
			.collect::<Vec<_>>()
			.join(", ");
		let value = match self.realm {
			Some(realm) => format!(r#"OAuth realm="{realm}", {rendered}"#),
			None => format!("OAuth {rendered}"),
		};

		AuthorizationHeader { value, signature, nonce, timestamp }
	}
}

fn fresh_nonce() -> String {
	let mut bytes = [0_u8; NONCE_LEN];

	rand::rng().fill_bytes(&mut bytes);

	bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn oauth_encode(value: &str) -> Cow<'_, str> {
	utf8_percent_encode(value, PARAMETER_ENCODE_SET).into()
}
