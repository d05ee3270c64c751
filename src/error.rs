//! Error types for the Bullish client library.

use thiserror::Error;

/// The main error type for all Bullish client operations.
#[derive(Error, Debug)]
pub enum BullishError {
    /// Key material could not be parsed (malformed PEM, base64 or key bytes)
    #[error("Key format error: {0}")]
    KeyFormat(String),

    /// Underlying cryptographic operation failed
    #[error("Signature error: {0}")]
    Signature(String),

    /// Login handshake failed or the response carried no token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The API returned a non-success status for a signed request
    #[error("Bullish API error (HTTP {status}): {body}")]
    Api {
        /// HTTP status code returned by the API
        status: u16,
        /// Raw response body, surfaced for diagnosis
        body: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid response from the API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing required credentials
    #[error("Missing credentials: an API key is required for privileged endpoints")]
    MissingCredentials,

    /// A privileged call was made before a successful login
    #[error("Missing session: call login() before issuing privileged requests")]
    MissingSession,
}

impl BullishError {
    /// Check if this error indicates a server-side signature rejection.
    ///
    /// Bullish rejects requests whose signature does not verify with a 401
    /// and an `INVALID_SIGNATURE` error code in the body.
    pub fn is_invalid_signature(&self) -> bool {
        matches!(self, Self::Api { status: 401, body } if body.contains("INVALID_SIGNATURE"))
    }

    /// Check if this error indicates a rejected (stale or reused) nonce.
    pub fn is_invalid_nonce(&self) -> bool {
        matches!(self, Self::Api { body, .. } if body.contains("INVALID_NONCE"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let error = BullishError::Api {
            status: 401,
            body: r#"{"errorCode":"INVALID_SIGNATURE"}"#.to_string(),
        };
        assert!(error.to_string().contains("401"));
        assert!(error.is_invalid_signature());
        assert!(!error.is_invalid_nonce());
    }

    #[test]
    fn test_missing_session_display() {
        let error = BullishError::MissingSession;
        assert!(error.to_string().contains("login()"));
    }
}
