//! # rampart-auth
//!
//! Bearer credential helpers for the Rampart data-access layer.
//!
//! Signature verification happens upstream, in the service that accepted the
//! credential. This crate only reads what an already-authenticated token says
//! about its own lifetime, so that derived values (validated token lookups,
//! friend-id lists) can be cached no longer than the credential they came
//! from.
//!
//! ## Modules
//!
//! - [`token`] - Unverified claim extraction and TTL derivation
//! - [`error`] - Credential decoding errors

pub mod error;
pub mod token;

pub use error::CredentialError;
pub use token::{
    ExpiryClaim, TokenTtl, decode_expiry_unverified, ttl_from_credential, ttl_from_credential_at,
};

/// Type alias for credential decoding results.
pub type CredentialResult<T> = Result<T, CredentialError>;
