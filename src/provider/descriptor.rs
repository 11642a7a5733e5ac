//! Provider descriptor data structures and helpers shared by all flows.
//!
//! The descriptor derives every endpoint from a single HTTPS base URL so a provider
//! integration stays a handful of declarative lines, while quirks capture the
//! per-provider deviations the flows honor at runtime.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// Wire format of the token endpoint responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenResponseFormat {
	/// `application/x-www-form-urlencoded` body, the protocol default.
	FormEncoded,
	/// JSON object carrying the same `oauth_token`/`oauth_token_secret` fields.
	Json,
}

/// Endpoint set derived from the provider's base URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Request token endpoint, the first handshake leg.
	pub initiate: Url,
	/// User-facing authorization page.
	pub authorize: Url,
	/// Access token endpoint, the final handshake leg.
	pub token: Url,
	/// Account listing endpoint.
	pub accounts: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions derived from the base URL.
	pub endpoints: ProviderEndpoints,
	/// Callback the provider redirects to once the user approves access.
	pub callback: Url,
	/// Version segment used when deriving data endpoints.
	pub api_version: String,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Authorization page URL carrying the request token the user approves.
	pub fn authorize_url(&self, request_token: &str) -> Url {
		let mut url = self.endpoints.authorize.clone();

		url.query_pairs_mut().append_pair("oauth_token", request_token);

		url
	}

	/// Transactions endpoint for a single remote account.
	pub fn transactions_url(&self, external_account_id: &str) -> Url {
		let mut url = self.endpoints.accounts.clone();

		// Infallible for descriptors built through the validated builder.
		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().extend([external_account_id, "transactions"]);
		}

		url
	}
}
