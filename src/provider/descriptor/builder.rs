// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{ProviderDescriptor, ProviderEndpoints, ProviderQuirks},
};

const DEFAULT_API_VERSION: &str = "v1";

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Base URL is required; every endpoint derives from it.
	#[error("Missing provider base URL.")]
	MissingBaseUrl,
	/// Callback is required so the provider can redirect after approval.
	#[error("Missing handshake callback URL.")]
	MissingCallback,
	/// Provider endpoints must use HTTPS.
	#[error("The provider base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// URL that failed validation.
		url: String,
	},
	/// The base URL must be able to carry additional path segments.
	#[error("The provider base URL does not support path segments: {url}.")]
	UnsupportedBaseUrl {
		/// URL that failed validation.
		url: String,
	},
	/// The API version becomes a path segment and must be non-empty.
	#[error("API version must not be empty.")]
	EmptyApiVersion,
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// HTTPS base URL every endpoint derives from.
	pub base_url: Option<Url>,
	/// Callback the provider redirects to once the user approves access.
	pub callback: Option<Url>,
	/// Version segment used when deriving data endpoints.
	pub api_version: String,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			base_url: None,
			callback: None,
			api_version: DEFAULT_API_VERSION.to_owned(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the base URL endpoints derive from.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the handshake callback.
	///
	/// Plain HTTP is accepted here so local development callbacks keep working; the
	/// provider-side endpoints are the ones held to HTTPS.
	pub fn callback(mut self, url: Url) -> Self {
		self.callback = Some(url);

		self
	}

	/// Overrides the API version segment.
	pub fn api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = version.into();

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder, derives the endpoint set, and validates the result.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let base = self.base_url.ok_or(ProviderDescriptorError::MissingBaseUrl)?;

		if base.scheme() != "https" {
			return Err(ProviderDescriptorError::InsecureBaseUrl { url: base.to_string() });
		}

		let callback = self.callback.ok_or(ProviderDescriptorError::MissingCallback)?;
		let api_version = self.api_version;

		if api_version.trim().is_empty() {
			return Err(ProviderDescriptorError::EmptyApiVersion);
		}

		let endpoints = ProviderEndpoints {
			initiate: endpoint_from(&base, &["oauth", "initiate"])?,
			authorize: endpoint_from(&base, &["oauth", "authorize"])?,
			token: endpoint_from(&base, &["oauth", "token"])?,
			accounts: endpoint_from(&base, &[api_version.as_str(), "my", "accounts"])?,
		};

		Ok(ProviderDescriptor {
			id: self.id,
			endpoints,
			callback,
			api_version,
			quirks: self.quirks,
		})
	}
}

fn endpoint_from(base: &Url, segments: &[&str]) -> Result<Url, ProviderDescriptorError> {
	let mut url = base.clone();

	{
		let mut path = url
			.path_segments_mut()
			.map_err(|()| ProviderDescriptorError::UnsupportedBaseUrl { url: base.to_string() })?;

		path.pop_if_empty().extend(segments);
	}

	Ok(url)
}
