//! Bearer token inspection.
//!
//! - [`expiry`] - `exp` claim extraction and cache TTL derivation

pub mod expiry;

pub use expiry::{
    ExpiryClaim, TokenTtl, decode_expiry_unverified, ttl_from_credential, ttl_from_credential_at,
};
