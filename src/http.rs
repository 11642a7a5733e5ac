//! Transport primitives for signed provider calls.
//!
//! [`ProviderHttpClient`] is the bridge's only dependency on an HTTP stack. Implementations
//! execute one already-signed [`ProviderRequest`] and buffer the entire response so the
//! caller can inspect the status, content type, and body without holding a connection open.
//! The companion [`TransportErrorMapper`] translates the transport's native error into the
//! bridge's [`TransportError`], keeping retry classification uniform across HTTP stacks.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
#[cfg(feature = "reqwest")] use std::time::Duration as StdDuration;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	Method,
	header::{AUTHORIZATION, CONTENT_TYPE},
	redirect::Policy,
};
// self
use crate::{
	_prelude::*,
	error::TransportError,
	oauth::{AuthorizationHeader, HttpMethod},
};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

#[cfg(feature = "reqwest")] const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Boxed response future keeping [`ProviderHttpClient`] object-safe.
pub type TransportFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + 'a + Send>>;
/// Boxed timer future used to pause between retry attempts.
pub type SleepFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing signed provider requests.
///
/// The bridge signs each request before handing it over, so implementations only move
/// bytes; they must not mutate the URL, add query parameters, or follow redirects, any
/// of which would invalidate the signature. Implementations must be `Send + Sync +
/// 'static` so a single transport can be shared across every flow of a broker instance.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes a signed request and buffers the complete response.
	fn execute(
		&self,
		request: ProviderRequest,
	) -> TransportFuture<'_, ProviderResponse, Self::TransportError>;

	/// Sleeps between retry attempts.
	///
	/// The default is a no-op so executors without a timer still work; transports backed
	/// by an async runtime should override it with a real delay.
	fn sleep(&self, _delay: Duration) -> SleepFuture<'_> {
		Box::pin(async {})
	}
}

/// Maps a transport's native error type into [`TransportError`].
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
{
	/// Classifies a transport failure; the result decides retry eligibility.
	fn map_transport_error(&self, error: E) -> TransportError;
}

/// Signed request handed to the transport.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
	/// HTTP method, already baked into the signature.
	pub method: HttpMethod,
	/// Full request URL including any query string.
	pub url: Url,
	/// Signed `Authorization` header matching this exact method and URL.
	pub authorization: AuthorizationHeader,
}

/// Buffered provider response.
#[derive(Clone, Debug)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header when the provider sent one.
	pub content_type: Option<String>,
	/// Response body decoded as UTF-8 text.
	pub body: String,
}
impl ProviderResponse {
	/// Whether the status code sits in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Redirect following is disabled because a redirected request would be re-issued against
/// a URL the signature was never computed for.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestProviderClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestProviderClient {
	/// Builds a client with the bridge's defaults: a 30-second request timeout and no
	/// redirect following.
	pub fn new() -> Result<Self, ConfigError> {
		let client =
			ReqwestClient::builder().timeout(REQUEST_TIMEOUT).redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing [`ReqwestClient`]; configure it to not follow redirects.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestProviderClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestProviderClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestProviderClient {
	type TransportError = ReqwestError;

	fn execute(
		&self,
		request: ProviderRequest,
	) -> TransportFuture<'_, ProviderResponse, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				HttpMethod::Get => Method::GET,
				HttpMethod::Post => Method::POST,
			};
			let response = client
				.request(method, request.url)
				.header(AUTHORIZATION, request.authorization.value)
				.send()
				.await?;
			let status = response.status().as_u16();
			let content_type = response
				.headers()
				.get(CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let body = response.text().await?;

			Ok(ProviderResponse { status, content_type, body })
		})
	}

	fn sleep(&self, delay: Duration) -> SleepFuture<'_> {
		Box::pin(tokio::time::sleep(delay.unsigned_abs()))
	}
}

/// [`TransportErrorMapper`] for [`ReqwestProviderClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, error: ReqwestError) -> TransportError {
		error.into()
	}
}
