// self
use crate::{_prelude::*, provider::TokenResponseFormat};

/// Provider-specific quirks that influence how flows behave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Optional `realm` attribute rendered, unsigned, into every `Authorization` header.
	pub realm: Option<String>,
	/// Declared token response format; `None` falls back to `Content-Type` detection.
	pub token_response_format: Option<TokenResponseFormat>,
	/// Page size requested when fetching transactions without an explicit limit.
	pub default_transaction_limit: u32,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { realm: None, token_response_format: None, default_transaction_limit: 200 }
	}
}
