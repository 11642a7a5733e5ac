//! Provider-facing descriptors.
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`): an HTTPS-only base URL
//! every handshake and data endpoint derives from, the callback the provider redirects to
//! after user approval, and provider quirks (realm attribute, token response format,
//! default transaction page size) the flows honor at runtime.

pub mod descriptor;

pub use descriptor::*;
