//! Cache TTL derivation from a bearer credential's `exp` claim.
//!
//! The credential has already been verified by the service that accepted it;
//! here the payload is decoded structurally and only the expiry is read.
//!
//! ## Outcomes
//!
//! | Credential                         | Result                  |
//! |------------------------------------|-------------------------|
//! | `exp` in the future                | `Remaining(floor(exp - now))` |
//! | `exp` in the past, or floor is 0   | `Expired` (TTL 0)       |
//! | `exp` past year 9999               | clamped, `Remaining`    |
//! | malformed token or `exp` value     | `Expired` (TTL 0)       |
//! | no `exp` claim                     | `NoExpiry` (skip cache) |
//!
//! # Warning
//!
//! Nothing in this module checks the signature. Never use it to decide
//! whether a credential is trustworthy.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::CredentialResult;
use crate::error::CredentialError;

/// Cache lifetime derived from a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTtl {
    /// Whole seconds left before the credential expires (always > 0).
    Remaining(Duration),
    /// The credential is expired or unreadable: do not cache, or cache with
    /// immediate expiry.
    Expired,
    /// The credential carries no expiry: skip caching entirely.
    NoExpiry,
}

impl TokenTtl {
    /// TTL in seconds: `Some(n)`, `Some(0)` for expired, `None` for no expiry.
    #[must_use]
    pub fn as_secs(&self) -> Option<u64> {
        match self {
            Self::Remaining(ttl) => Some(ttl.as_secs()),
            Self::Expired => Some(0),
            Self::NoExpiry => None,
        }
    }

    /// TTL suitable for a cache write, `None` when nothing should be cached.
    #[must_use]
    pub fn cache_ttl(&self) -> Option<Duration> {
        match self {
            Self::Remaining(ttl) => Some(*ttl),
            Self::Expired | Self::NoExpiry => None,
        }
    }

    /// Returns `true` if a cache write is allowed.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Self::Remaining(_))
    }
}

/// The `exp` claim of a credential as an absolute instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryClaim {
    pub expires_at: OffsetDateTime,
}

impl ExpiryClaim {
    /// Time left until expiry at `now`, negative once expired.
    #[must_use]
    pub fn remaining_at(&self, now: OffsetDateTime) -> time::Duration {
        self.expires_at - now
    }
}

/// Derives a cache TTL from a bearer credential using the current clock.
pub fn ttl_from_credential(token: &str) -> TokenTtl {
    ttl_from_credential_at(token, OffsetDateTime::now_utc())
}

/// Derives a cache TTL from a bearer credential as of `now`.
pub fn ttl_from_credential_at(token: &str, now: OffsetDateTime) -> TokenTtl {
    let claim = match decode_expiry_unverified(token) {
        Ok(Some(claim)) => claim,
        Ok(None) => {
            tracing::debug!("credential has no exp claim, skipping cache");
            return TokenTtl::NoExpiry;
        }
        Err(e) => {
            tracing::debug!(error = %e, "undecodable credential, treating as expired");
            return TokenTtl::Expired;
        }
    };

    let remaining = claim.remaining_at(now);
    if remaining <= time::Duration::ZERO {
        return TokenTtl::Expired;
    }

    // whole_seconds truncates toward zero, which is floor for positive spans
    match remaining.whole_seconds() {
        secs if secs > 0 => TokenTtl::Remaining(Duration::from_secs(secs as u64)),
        _ => TokenTtl::Expired,
    }
}

/// Extracts the `exp` claim from a JWT without verifying its signature.
///
/// Returns `Ok(None)` when the payload has no `exp` claim (or it is `null`).
///
/// # Errors
///
/// Returns a [`CredentialError`] if the token is not a three-segment JWT,
/// the payload is not base64url JSON object, or `exp` is not a numeric date.
pub fn decode_expiry_unverified(token: &str) -> CredentialResult<Option<ExpiryClaim>> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(CredentialError::InvalidFormat {
            segments: parts.len(),
        });
    }

    // Tolerate padded payloads produced by lenient encoders
    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| CredentialError::invalid_encoding(e.to_string()))?;

    let claims: Map<String, Value> = serde_json::from_slice(&payload_bytes)
        .map_err(|e| CredentialError::invalid_json(e.to_string()))?;

    match claims.get("exp") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            let secs = n
                .as_f64()
                .ok_or_else(|| CredentialError::invalid_expiry(format!("unrepresentable: {n}")))?;
            numeric_date(secs).map(Some)
        }
        Some(other) => Err(CredentialError::invalid_expiry(format!(
            "expected a number, found {other}"
        ))),
    }
}

/// Converts a NumericDate (seconds since the epoch, possibly fractional).
///
/// Instants outside the representable range are clamped to its bounds, so a
/// far-future `exp` still yields a long positive TTL.
fn numeric_date(secs: f64) -> CredentialResult<ExpiryClaim> {
    if !secs.is_finite() {
        return Err(CredentialError::invalid_expiry("not a finite number"));
    }

    let min = PrimitiveDateTime::MIN.assume_utc().unix_timestamp_nanos();
    let max = PrimitiveDateTime::MAX.assume_utc().unix_timestamp_nanos();
    let nanos = ((secs * 1_000_000_000.0) as i128).clamp(min, max);
    let expires_at = OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|e| CredentialError::invalid_expiry(e.to_string()))?;

    Ok(ExpiryClaim { expires_at })
}
