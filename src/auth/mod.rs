//! Authentication module for the Bullish API.
//!
//! This module provides:
//! - Credential management for both API key schemes (ECDSA P-256 and HMAC-SHA256)
//! - Nonce generation for replay attack prevention
//! - Canonical message construction for request signing
//! - Signature generation and the login handshake

mod canonical;
mod credentials;
mod nonce;
mod session;
mod signature;

pub use canonical::{hmac_login_payload, privileged_payload, sha256_hexdigest};
pub use credentials::{ApiKeyMetadata, Credentials, CredentialsConfig, EcdsaKeyPair, HmacKey, Scheme};
pub use nonce::{IncreasingNonce, NonceProvider, epoch_millis, epoch_seconds};
pub use session::{LoginRequest, LoginResponse, Session, SessionAuthenticator, SessionState};
pub use signature::{
    BX_NONCE, BX_PUBLIC_KEY, BX_SIGNATURE, BX_TIMESTAMP, EcdsaSigner, HmacSigner, RequestSigner,
    SignedEnvelope, Signer, verify_with_public_key_pem,
};
