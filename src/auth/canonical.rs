//! Canonical message construction for request signing.
//!
//! The Bullish API verifies signatures over an exact byte sequence, so the
//! functions here must concatenate fields in a fixed order with no
//! separators, and the body passed in must be byte-identical to the body
//! actually transmitted. Any mismatch (field order, null handling, number
//! formatting) makes the server reject the signature even though the client
//! signed consistently.
//!
//! The two schemes do not share one canonical shape for login:
//!
//! ```text
//! Privileged calls: timestamp + nonce + METHOD + path + body
//! HMAC login:       timestamp + nonce + "GET" + loginPath
//! ECDSA login:      the serialized login-request body only
//! ```

use sha2::{Digest, Sha256};

/// Build the canonical message for a signed privileged request.
///
/// `body` must be the exact serialized request body that will be transmitted
/// (empty string for bodiless requests).
pub fn privileged_payload(
    timestamp: &str,
    nonce: &str,
    method: &str,
    path: &str,
    body: &str,
) -> String {
    format!("{timestamp}{nonce}{method}{path}{body}")
}

/// Build the canonical message for the HMAC login handshake.
///
/// The HMAC login is a bodiless GET; only timestamp, nonce, method and path
/// are authenticated.
pub fn hmac_login_payload(timestamp: &str, nonce: &str, login_path: &str) -> String {
    format!("{timestamp}{nonce}GET{login_path}")
}

/// Lowercase hex SHA-256 digest of a message.
///
/// This is the pre-hash step of the order-signing HMAC mode: the order
/// endpoint keys the HMAC over this hex string rather than over the raw
/// canonical message.
pub fn sha256_hexdigest(message: &str) -> String {
    hex::encode(Sha256::digest(message.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_payload_concatenation() {
        let message = privileged_payload(
            "1700000000000",
            "1700000000000000",
            "POST",
            "/trading-api/v2/orders",
            r#"{"symbol":"BTCUSDC","price":"1.5000"}"#,
        );
        assert_eq!(
            message,
            "17000000000001700000000000000POST/trading-api/v2/orders{\"symbol\":\"BTCUSDC\",\"price\":\"1.5000\"}"
        );
    }

    #[test]
    fn test_privileged_payload_deterministic() {
        let build = || {
            privileged_payload(
                "1696841072969",
                "85548fae-5fec-44ab-83a4-c6bf2d4c8788",
                "POST",
                "/trading-api/v1/wallets/withdrawal",
                r#"{"nonce":"85548fae-5fec-44ab-83a4-c6bf2d4c8788"}"#,
            )
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_privileged_payload_empty_body() {
        let message = privileged_payload("1", "2", "GET", "/trading-api/v1/nonce", "");
        assert_eq!(message, "12GET/trading-api/v1/nonce");
    }

    #[test]
    fn test_hmac_login_payload() {
        let message =
            hmac_login_payload("1700000000000", "1700000000", "/trading-api/v1/users/hmac/login");
        assert_eq!(
            message,
            "17000000000001700000000GET/trading-api/v1/users/hmac/login"
        );
    }

    #[test]
    fn test_sha256_hexdigest_nist_vector() {
        assert_eq!(
            sha256_hexdigest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
