//! Bank credential records, handshake state, and secret handling.

pub mod handshake;
pub mod record;
pub mod secret;
