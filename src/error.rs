//! Bridge-level error types shared across flows, the remote client, and stores.

// self
use crate::_prelude::*;

/// Bridge-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical bridge error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// OAuth 1.0a handshake failure.
	#[error(transparent)]
	Handshake(#[from] HandshakeError),
	/// Provider data endpoint failure.
	#[error(transparent)]
	Remote(#[from] RemoteError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Requested resource does not exist or belongs to another user.
	#[error("{resource} was not found.")]
	NotFound {
		/// Resource label (bank token, account).
		resource: &'static str,
	},
	/// No stored credential matches the provider and none was supplied.
	#[error("No bank credential is stored for provider `{provider}`.")]
	NoCredential {
		/// Provider identifier string.
		provider: String,
	},
	/// A credential already exists for the (user, provider) pair.
	#[error("A bank credential already exists for provider `{provider}`.")]
	DuplicateCredential {
		/// Provider identifier string.
		provider: String,
	},
	/// Transaction sync was requested for an account without correlation ids.
	#[error("Account `{account}` is not linked to a provider account.")]
	AccountNotLinked {
		/// Local account display name.
		account: String,
	},
}

/// Configuration and validation failures raised by the bridge.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Consumer key was empty or whitespace.
	#[error("Consumer key must not be empty.")]
	MissingConsumerKey,
	/// Consumer secret was empty or whitespace.
	#[error("Consumer secret must not be empty.")]
	MissingConsumerSecret,
	/// Token record builder validation failed.
	#[error("Unable to build bank token record.")]
	TokenBuild(#[from] crate::auth::BankTokenBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised during the three-legged handshake.
#[derive(Debug, ThisError)]
pub enum HandshakeError {
	/// Provider rejected the initiate request.
	#[error("Initiate endpoint returned HTTP {status}: {body}.")]
	InitiateRejected {
		/// HTTP status code returned by the provider.
		status: u16,
		/// Truncated response body for diagnostics.
		body: String,
	},
	/// Provider rejected the token exchange request.
	#[error("Token exchange endpoint returned HTTP {status}: {body}.")]
	ExchangeRejected {
		/// HTTP status code returned by the provider.
		status: u16,
		/// Truncated response body for diagnostics.
		body: String,
	},
	/// Token grant response omitted a required field.
	#[error("Token grant response is missing `{field}`.")]
	MissingTokenField {
		/// Missing field name.
		field: &'static str,
	},
	/// Token grant response used a content type the bridge does not accept.
	#[error("Token grant response used an unsupported content type: {content_type}.")]
	UnsupportedResponseFormat {
		/// Content-Type header as received, or a placeholder when absent.
		content_type: String,
	},
	/// Token grant response was declared JSON but could not be parsed.
	#[error("Token grant response contained malformed JSON.")]
	GrantParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Request token is unknown, already consumed, or past its TTL.
	#[error("Handshake session expired or the request token was already used.")]
	SessionExpired,
}

/// Failures raised by provider data endpoints during sync.
#[derive(Debug, ThisError)]
pub enum RemoteError {
	/// Provider returned a non-200 status for a data call.
	#[error("Provider endpoint returned HTTP {status}: {body}.")]
	Endpoint {
		/// HTTP status code returned by the provider.
		status: u16,
		/// Truncated response body for diagnostics.
		body: String,
	},
	/// Provider payload could not be deserialized.
	#[error("Provider payload contained malformed JSON.")]
	Payload {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Remote record carried an amount that does not parse as a decimal.
	#[error("Remote amount `{value}` is not a valid decimal.")]
	MalformedAmount {
		/// Offending amount string.
		value: String,
	},
	/// Remote record omitted its amount entirely.
	#[error("Remote transaction `{id}` carries no amount.")]
	MissingAmount {
		/// Provider-assigned transaction identifier.
		id: String,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the transport's deadline.
	#[error("Request to the provider timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Returns `true` when retrying an idempotent request could help.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Network { .. } | Self::Timeout { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}
