//! Auth-domain identifiers, bank credential records, and handshake state.

pub mod id;
pub mod token;

pub use id::*;
pub use token::{handshake::*, record::*, secret::*};
