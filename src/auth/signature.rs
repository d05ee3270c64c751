//! Signature generation for Bullish API authentication.
//!
//! Privileged Bullish endpoints require a signature over the canonical
//! message built by [`crate::auth::canonical`]:
//!
//! ```text
//! ECDSA:       base64(DER(ECDSA-P256-SHA256(message)))
//! HMAC direct: hex(HMAC-SHA256(secret, message))          (login, withdrawals)
//! HMAC orders: hex(HMAC-SHA256(secret, hex(SHA256(message))))
//! ```
//!
//! The order endpoint requires pre-hashing the canonical message before
//! keying the HMAC; login and withdrawal signing key the raw message. Both
//! modes are load-bearing and selected per endpoint class by
//! [`RequestSigner`], not negotiated.

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use p256::ecdsa::signature::{Signer as _, Verifier as _};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePublicKey;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::auth::canonical::{privileged_payload, sha256_hexdigest};
use crate::auth::credentials::{Credentials, EcdsaKeyPair, HmacKey, Scheme};
use crate::auth::nonce::{NonceProvider, epoch_millis};
use crate::error::BullishError;

type HmacSha256 = Hmac<Sha256>;

/// Signature header attached to every signed request.
pub const BX_SIGNATURE: &str = "BX-SIGNATURE";
/// Nonce header (decimal string).
pub const BX_NONCE: &str = "BX-NONCE";
/// Epoch-millisecond timestamp header (decimal string).
pub const BX_TIMESTAMP: &str = "BX-TIMESTAMP";
/// Public identifier header, sent only on HMAC login.
pub const BX_PUBLIC_KEY: &str = "BX-PUBLIC-KEY";

/// ECDSA P-256 signer.
///
/// Signs SHA-256 digests of the canonical message and emits base64-encoded
/// DER signatures, matching what the API's verifier expects.
#[derive(Clone)]
pub struct EcdsaSigner {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl EcdsaSigner {
    /// Create a signer from a parsed key pair.
    pub fn new(key_pair: &EcdsaKeyPair) -> Self {
        Self {
            signing_key: key_pair.signing_key().clone(),
            verifying_key: *key_pair.verifying_key(),
        }
    }

    /// Sign a canonical message.
    ///
    /// Computes ECDSA over SHA-256 of the message and base64-encodes the
    /// DER signature.
    pub fn sign(&self, message: &str) -> Result<String, BullishError> {
        let signature: Signature = self
            .signing_key
            .try_sign(message.as_bytes())
            .map_err(|e| BullishError::Signature(format!("ECDSA signing failed: {e}")))?;
        Ok(BASE64.encode(signature.to_der().as_bytes()))
    }

    /// Verify a base64 DER signature over a message.
    ///
    /// Returns `false` for structurally invalid signatures (bad base64, bad
    /// DER, or a signature that does not verify); never panics.
    pub fn verify(&self, message: &str, signature_b64: &str) -> bool {
        verify_with_key(&self.verifying_key, message, signature_b64)
    }
}

impl std::fmt::Debug for EcdsaSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaSigner")
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

/// Verify a base64 DER signature against an SPKI PEM public key.
///
/// Fails with [`BullishError::KeyFormat`] only for malformed key material;
/// an invalid signature yields `Ok(false)`.
pub fn verify_with_public_key_pem(
    public_key_pem: &str,
    message: &str,
    signature_b64: &str,
) -> Result<bool, BullishError> {
    let verifying_key = VerifyingKey::from_public_key_pem(public_key_pem.trim())
        .map_err(|e| BullishError::KeyFormat(format!("Invalid SPKI public key: {e}")))?;
    Ok(verify_with_key(&verifying_key, message, signature_b64))
}

fn verify_with_key(verifying_key: &VerifyingKey, message: &str, signature_b64: &str) -> bool {
    let Ok(der_bytes) = BASE64.decode(signature_b64) else {
        return false;
    };
    let Ok(signature) = Signature::from_der(&der_bytes) else {
        return false;
    };
    verifying_key.verify(message.as_bytes(), &signature).is_ok()
}

/// HMAC-SHA256 signer.
///
/// Supports the two sub-protocols the API uses: direct keying of the
/// canonical message, and keying over the hex SHA-256 digest of the message
/// (orders only). Verification is a server-side concern for this scheme.
#[derive(Clone)]
pub struct HmacSigner {
    public_id: String,
    secret: SecretString,
}

impl HmacSigner {
    /// Create a signer from an HMAC key.
    pub fn new(key: &HmacKey) -> Self {
        Self {
            public_id: key.public_id().to_string(),
            secret: SecretString::from(key.expose_secret().to_string()),
        }
    }

    /// Direct mode: `hex(HMAC-SHA256(secret, message))`.
    pub fn sign(&self, message: &str) -> Result<String, BullishError> {
        self.mac_hex(message.as_bytes())
    }

    /// Digest mode: `hex(HMAC-SHA256(secret, hex(SHA256(message))))`.
    pub fn sign_prehashed(&self, message: &str) -> Result<String, BullishError> {
        let digest = sha256_hexdigest(message);
        self.mac_hex(digest.as_bytes())
    }

    /// The public identifier, sent in the `BX-PUBLIC-KEY` header on login.
    pub fn public_id(&self) -> &str {
        &self.public_id
    }

    fn mac_hex(&self, message: &[u8]) -> Result<String, BullishError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| BullishError::Signature(format!("Invalid HMAC key: {e}")))?;
        mac.update(message);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner")
            .field("public_id", &self.public_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Scheme-dispatching signer, selected once at client construction.
///
/// Call sites never branch on the credential scheme; they ask for a direct
/// signature ([`Signer::sign`]) or an order-class signature
/// ([`Signer::sign_order`]) and the variant picks the right algorithm.
#[derive(Debug, Clone)]
pub enum Signer {
    /// ECDSA P-256 variant
    Ecdsa(EcdsaSigner),
    /// HMAC-SHA256 variant
    Hmac(HmacSigner),
}

impl Signer {
    /// Build the signer variant matching the supplied credentials.
    pub fn for_credentials(credentials: &Credentials) -> Self {
        match credentials {
            Credentials::Ecdsa(key_pair) => Self::Ecdsa(EcdsaSigner::new(key_pair)),
            Credentials::Hmac(key) => Self::Hmac(HmacSigner::new(key)),
        }
    }

    /// The scheme this signer implements.
    pub fn scheme(&self) -> Scheme {
        match self {
            Self::Ecdsa(_) => Scheme::Ecdsa,
            Self::Hmac(_) => Scheme::Hmac,
        }
    }

    /// Direct-mode signature (login and withdrawal class).
    pub fn sign(&self, message: &str) -> Result<String, BullishError> {
        match self {
            Self::Ecdsa(signer) => signer.sign(message),
            Self::Hmac(signer) => signer.sign(message),
        }
    }

    /// Order-class signature.
    ///
    /// The HMAC variant pre-hashes the canonical message before keying;
    /// ECDSA signs the message directly for every endpoint class.
    pub fn sign_order(&self, message: &str) -> Result<String, BullishError> {
        match self {
            Self::Ecdsa(signer) => signer.sign(message),
            Self::Hmac(signer) => signer.sign_prehashed(message),
        }
    }
}

/// The signature material attached to an outgoing privileged request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    /// Signature string (base64 for ECDSA, hex for HMAC)
    pub signature: String,
    /// Nonce as a decimal (or UUID, for withdrawals) string
    pub nonce: String,
    /// Epoch-millisecond timestamp, byte-identical to the signed value
    pub timestamp: String,
    /// Public identifier, present only for HMAC login
    pub public_key: Option<String>,
}

impl SignedEnvelope {
    /// Header name/value pairs to attach to the request.
    pub fn headers(&self) -> Vec<(&'static str, &str)> {
        let mut headers = vec![
            (BX_SIGNATURE, self.signature.as_str()),
            (BX_NONCE, self.nonce.as_str()),
            (BX_TIMESTAMP, self.timestamp.as_str()),
        ];
        if let Some(public_key) = &self.public_key {
            headers.push((BX_PUBLIC_KEY, public_key.as_str()));
        }
        headers
    }
}

/// Per-request signing for privileged calls.
///
/// Generates a fresh nonce and timestamp, builds the canonical message and
/// returns the headers to attach. Transport and response handling stay with
/// the caller.
pub struct RequestSigner {
    signer: Signer,
    nonce_provider: Arc<dyn NonceProvider>,
}

impl RequestSigner {
    /// Create a request signer sharing a nonce source.
    pub fn new(signer: Signer, nonce_provider: Arc<dyn NonceProvider>) -> Self {
        Self {
            signer,
            nonce_provider,
        }
    }

    /// Sign an order-class request.
    ///
    /// Draws a fresh microsecond nonce from the shared provider and reads
    /// the timestamp immediately before signing. `body` must be the exact
    /// serialized bytes that will be transmitted.
    pub fn sign_order_request(
        &self,
        method: &str,
        path: &str,
        body: &str,
    ) -> Result<SignedEnvelope, BullishError> {
        let timestamp = epoch_millis().to_string();
        let nonce = self.nonce_provider.next_nonce().to_string();
        let message = privileged_payload(&timestamp, &nonce, method, path, body);
        let signature = self.signer.sign_order(&message)?;
        Ok(SignedEnvelope {
            signature,
            nonce,
            timestamp,
            public_key: None,
        })
    }

    /// Sign a transfer-class request (withdrawals).
    ///
    /// These requests embed their nonce and timestamp in the body, so the
    /// caller passes both in; the signature uses the direct mode under both
    /// schemes.
    pub fn sign_transfer_request(
        &self,
        method: &str,
        path: &str,
        body: &str,
        nonce: &str,
        timestamp: &str,
    ) -> Result<SignedEnvelope, BullishError> {
        let message = privileged_payload(timestamp, nonce, method, path, body);
        let signature = self.signer.sign(&message)?;
        Ok(SignedEnvelope {
            signature,
            nonce: nonce.to_string(),
            timestamp: timestamp.to_string(),
            public_key: None,
        })
    }

    /// The underlying scheme-dispatching signer.
    pub fn signer(&self) -> &Signer {
        &self.signer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::test_keys::{PRIVATE_KEY_PEM, PUBLIC_KEY_PEM};
    use crate::auth::credentials::{CredentialsConfig, EcdsaKeyPair};

    fn test_key_pair() -> EcdsaKeyPair {
        EcdsaKeyPair::from_pem(PRIVATE_KEY_PEM, PUBLIC_KEY_PEM).unwrap()
    }

    fn test_hmac_signer() -> HmacSigner {
        HmacSigner::new(&HmacKey::new("HMAC-1234", "test-secret").unwrap())
    }

    #[test]
    fn test_ecdsa_sign_verify_round_trip() {
        let signer = EcdsaSigner::new(&test_key_pair());
        let message = "17000000000001700000000000000POST/trading-api/v2/orders{\"symbol\":\"BTCUSDC\",\"price\":\"1.5000\"}";

        // ECDSA is not required to be deterministic, so only assert that
        // repeated signatures both verify.
        let sig1 = signer.sign(message).unwrap();
        let sig2 = signer.sign(message).unwrap();
        assert!(signer.verify(message, &sig1));
        assert!(signer.verify(message, &sig2));
    }

    #[test]
    fn test_ecdsa_verify_rejects_structural_garbage() {
        let signer = EcdsaSigner::new(&test_key_pair());
        let message = "payload";
        let signature = signer.sign(message).unwrap();

        assert!(!signer.verify(message, "not base64 !!!"));
        assert!(!signer.verify(message, &BASE64.encode(b"not der")));
        assert!(!signer.verify("different payload", &signature));
    }

    #[test]
    fn test_verify_with_public_key_pem() {
        let signer = EcdsaSigner::new(&test_key_pair());
        let signature = signer.sign("payload").unwrap();

        assert!(verify_with_public_key_pem(PUBLIC_KEY_PEM, "payload", &signature).unwrap());
        assert!(!verify_with_public_key_pem(PUBLIC_KEY_PEM, "tampered", &signature).unwrap());
        assert!(matches!(
            verify_with_public_key_pem("not a pem", "payload", &signature),
            Err(BullishError::KeyFormat(_))
        ));
    }

    #[test]
    fn test_hmac_rfc4231_vector() {
        // RFC 4231 test case 2.
        let signer = HmacSigner::new(&HmacKey::new("HMAC-1234", "Jefe").unwrap());
        let signature = signer.sign("what do ya want for nothing?").unwrap();
        assert_eq!(
            signature,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_hmac_modes_differ() {
        let signer = test_hmac_signer();
        let message = "17000000000001700000000000000POST/trading-api/v2/orders{}";

        let direct = signer.sign(message).unwrap();
        let prehashed = signer.sign_prehashed(message).unwrap();
        assert_ne!(direct, prehashed);

        // Digest mode is exactly direct mode over the hex digest.
        assert_eq!(prehashed, signer.sign(&sha256_hexdigest(message)).unwrap());
    }

    #[test]
    fn test_signer_dispatch_per_endpoint_class() {
        let hmac = Signer::for_credentials(
            &CredentialsConfig::hmac("HMAC-1234", "test-secret").build().unwrap(),
        );
        let message = "canonical";
        assert_eq!(hmac.scheme(), Scheme::Hmac);
        assert_eq!(hmac.sign(message).unwrap(), test_hmac_signer().sign(message).unwrap());
        assert_eq!(
            hmac.sign_order(message).unwrap(),
            test_hmac_signer().sign_prehashed(message).unwrap()
        );

        let ecdsa = Signer::for_credentials(&Credentials::Ecdsa(test_key_pair()));
        assert_eq!(ecdsa.scheme(), Scheme::Ecdsa);
        let signature = ecdsa.sign_order(message).unwrap();
        assert!(verify_with_public_key_pem(PUBLIC_KEY_PEM, message, &signature).unwrap());
    }

    #[test]
    fn test_request_signer_order_envelope() {
        let signer = Signer::for_credentials(&Credentials::Ecdsa(test_key_pair()));
        let request_signer = RequestSigner::new(signer, Arc::new(crate::auth::IncreasingNonce::new()));

        let body = r#"{"symbol":"BTCUSDC","price":"1.5000"}"#;
        let envelope = request_signer
            .sign_order_request("POST", "/trading-api/v2/orders", body)
            .unwrap();

        // The signed timestamp/nonce must be the transmitted ones.
        let message = privileged_payload(
            &envelope.timestamp,
            &envelope.nonce,
            "POST",
            "/trading-api/v2/orders",
            body,
        );
        assert!(verify_with_public_key_pem(PUBLIC_KEY_PEM, &message, &envelope.signature).unwrap());
        assert!(envelope.public_key.is_none());
        assert_eq!(envelope.headers().len(), 3);
    }

    #[test]
    fn test_request_signer_transfer_envelope_uses_direct_mode() {
        let signer = Signer::for_credentials(
            &CredentialsConfig::hmac("HMAC-1234", "test-secret").build().unwrap(),
        );
        let request_signer = RequestSigner::new(signer, Arc::new(crate::auth::IncreasingNonce::new()));

        let body = r#"{"nonce":"85548fae-5fec-44ab-83a4-c6bf2d4c8788"}"#;
        let envelope = request_signer
            .sign_transfer_request(
                "POST",
                "/trading-api/v1/wallets/withdrawal",
                body,
                "85548fae-5fec-44ab-83a4-c6bf2d4c8788",
                "1696841072969",
            )
            .unwrap();

        let message = privileged_payload(
            "1696841072969",
            "85548fae-5fec-44ab-83a4-c6bf2d4c8788",
            "POST",
            "/trading-api/v1/wallets/withdrawal",
            body,
        );
        assert_eq!(envelope.signature, test_hmac_signer().sign(&message).unwrap());
    }
}
