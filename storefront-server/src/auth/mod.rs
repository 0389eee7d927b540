//! Authentication
//!
//! - [`token`]: HS256 bearer token codec
//! - [`guard`]: header parsing, identity extraction, role checks

pub mod guard;
pub mod token;

pub use guard::{AdminIdentity, AuthError, Identity, authenticate, require};
pub use token::{Claim, TokenCodec, TokenError};
