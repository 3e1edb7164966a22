//! Credential decoding errors.

/// Errors raised while reading claims out of an unverified bearer credential.
///
/// None of these cross the public TTL boundary: [`crate::ttl_from_credential`]
/// folds every variant into [`crate::TokenTtl::Expired`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The token does not have the `header.payload.signature` shape.
    #[error("Invalid JWT format: expected 3 segments, found {segments}")]
    InvalidFormat {
        /// Number of dot-separated segments found.
        segments: usize,
    },

    /// The payload segment is not valid base64url.
    #[error("Invalid JWT payload encoding: {message}")]
    InvalidEncoding {
        /// Decoder message.
        message: String,
    },

    /// The payload is not a JSON object.
    #[error("Invalid JWT payload JSON: {message}")]
    InvalidJson {
        /// Parser message.
        message: String,
    },

    /// The `exp` claim is present but is not a numeric date.
    #[error("Invalid exp claim: {message}")]
    InvalidExpiry {
        /// Description of the offending value.
        message: String,
    },
}

impl CredentialError {
    /// Creates a new `InvalidEncoding` error.
    #[must_use]
    pub fn invalid_encoding(message: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidJson` error.
    #[must_use]
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::InvalidJson {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidExpiry` error.
    #[must_use]
    pub fn invalid_expiry(message: impl Into<String>) -> Self {
        Self::InvalidExpiry {
            message: message.into(),
        }
    }
}
