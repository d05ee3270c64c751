//! Login handshake and session state.
//!
//! The two credential schemes log in differently and both asymmetries are
//! part of the external contract:
//!
//! - ECDSA: POST with a JSON body; the canonical message is the serialized
//!   login payload itself (no method/path prefix), and the signature rides
//!   in the body next to the public key.
//! - HMAC: bodiless GET; the canonical message is
//!   `timestamp + nonce + "GET" + loginPath` and everything rides in
//!   `BX-*` headers.
//!
//! On success the server issues a bearer JWT that must accompany every
//! subsequent privileged call. No automatic refresh is performed.

use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::auth::canonical::hmac_login_payload;
use crate::auth::credentials::Credentials;
use crate::auth::nonce::epoch_seconds;
use crate::auth::signature::{BX_NONCE, BX_PUBLIC_KEY, BX_SIGNATURE, BX_TIMESTAMP, Signer};
use crate::error::BullishError;
use crate::rest::endpoints::{ECDSA_LOGIN_PATH, HMAC_LOGIN_PATH};

/// Validity window of the signed ECDSA login request, in seconds.
///
/// This bounds how long the request itself may be replayed, not the lifetime
/// of the issued token.
const LOGIN_EXPIRATION_WINDOW_SECS: u64 = 300;

/// The ECDSA login payload; serialized compactly and signed byte-for-byte.
///
/// Field order matters: the server re-serializes this object to verify the
/// signature, so `sessionKey` is always emitted (as `null`), never skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// User identifier from the API key metadata
    pub user_id: String,
    /// Epoch seconds at request creation
    pub nonce: u64,
    /// `nonce` plus the request validity window
    pub expiration_time: u64,
    /// Always `false` for API access
    pub biometrics_used: bool,
    /// Unused by API keys; serialized as `null`
    pub session_key: Option<String>,
}

impl LoginRequest {
    /// Build the login payload for a given identifier and epoch-second nonce.
    pub fn new(user_id: impl Into<String>, nonce: u64) -> Self {
        Self {
            user_id: user_id.into(),
            nonce,
            expiration_time: nonce + LOGIN_EXPIRATION_WINDOW_SECS,
            biometrics_used: false,
            session_key: None,
        }
    }
}

/// Body of the ECDSA login POST: public key, signature and the signed payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct EcdsaLoginBody {
    public_key: String,
    signature: String,
    login_payload: LoginRequest,
}

/// The login endpoint response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Authorizer identifier, referenced by withdrawal commands
    #[serde(default)]
    pub authorizer: Option<String>,
    /// Owner authorizer identifier
    #[serde(default)]
    pub owner_authorizer: Option<String>,
    /// Bearer token; absence means the login did not succeed
    #[serde(default)]
    pub token: Option<String>,
}

/// An authenticated session: bearer token plus authorizer identifiers.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque bearer token with server-determined expiry
    pub token: String,
    /// Authorizer identifier for withdrawal commands
    pub authorizer: Option<String>,
    /// Owner authorizer identifier
    pub owner_authorizer: Option<String>,
}

/// Login state of a [`SessionAuthenticator`].
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// No successful login yet (or logged out)
    #[default]
    Unauthenticated,
    /// Logged in with a bearer token
    Authenticated(Session),
}

/// Performs the login handshake and holds the resulting session.
///
/// Stays `Unauthenticated` on any login failure, including a cancelled
/// request; the state only transitions on an HTTP success response that
/// carries a token. Retrying is the caller's decision.
pub struct SessionAuthenticator {
    state: RwLock<SessionState>,
}

impl SessionAuthenticator {
    /// Create an authenticator in the `Unauthenticated` state.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::Unauthenticated),
        }
    }

    /// Perform the scheme-specific login handshake.
    pub async fn login(
        &self,
        http_client: &ClientWithMiddleware,
        base_url: &str,
        credentials: &Credentials,
    ) -> Result<Session, BullishError> {
        let signer = Signer::for_credentials(credentials);

        let response = match credentials {
            Credentials::Ecdsa(key_pair) => {
                let user_id = key_pair.user_id().ok_or_else(|| {
                    BullishError::Auth(
                        "ECDSA login requires a user identifier; supply one via \
                         CredentialsConfig::user_id or an API key metadata blob"
                            .to_string(),
                    )
                })?;

                let login_request = LoginRequest::new(user_id, epoch_seconds());
                // The canonical message for this scheme is the serialized
                // payload itself; the same object is transmitted inside the
                // body, so the verifier sees identical bytes.
                let payload = serde_json::to_string(&login_request)?;
                let signature = signer.sign(&payload)?;

                let body = EcdsaLoginBody {
                    public_key: key_pair.public_key_pem().to_string(),
                    signature,
                    login_payload: login_request,
                };

                http_client
                    .post(format!("{base_url}{ECDSA_LOGIN_PATH}"))
                    .json(&body)
                    .send()
                    .await?
            }
            Credentials::Hmac(key) => {
                let nonce = epoch_seconds();
                let timestamp = (nonce * 1000).to_string();
                let message =
                    hmac_login_payload(&timestamp, &nonce.to_string(), HMAC_LOGIN_PATH);
                let signature = signer.sign(&message)?;

                http_client
                    .get(format!("{base_url}{HMAC_LOGIN_PATH}"))
                    .header(BX_PUBLIC_KEY, key.public_id())
                    .header(BX_NONCE, nonce.to_string())
                    .header(BX_SIGNATURE, signature)
                    .header(BX_TIMESTAMP, timestamp)
                    .send()
                    .await?
            }
        };

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Bullish login rejected");
            return Err(BullishError::Auth(format!(
                "Login failed (HTTP {status}): {body}"
            )));
        }

        let parsed: LoginResponse = serde_json::from_str(&body).map_err(|e| {
            BullishError::Auth(format!("Login response is not valid JSON: {e}. Body: {body}"))
        })?;
        let token = parsed
            .token
            .ok_or_else(|| BullishError::Auth("Login response carried no token".to_string()))?;

        let session = Session {
            token,
            authorizer: parsed.authorizer,
            owner_authorizer: parsed.owner_authorizer,
        };
        *self.state.write().await = SessionState::Authenticated(session.clone());
        tracing::debug!("Bullish login succeeded");
        Ok(session)
    }

    /// The current session, if authenticated.
    pub async fn session(&self) -> Option<Session> {
        match &*self.state.read().await {
            SessionState::Authenticated(session) => Some(session.clone()),
            SessionState::Unauthenticated => None,
        }
    }

    /// The current bearer token, if authenticated.
    pub async fn bearer_token(&self) -> Option<String> {
        self.session().await.map(|session| session.token)
    }

    /// Whether a login has succeeded and not been cleared.
    pub async fn is_authenticated(&self) -> bool {
        matches!(&*self.state.read().await, SessionState::Authenticated(_))
    }

    /// Drop the held session, returning to `Unauthenticated`.
    pub async fn logout(&self) {
        *self.state.write().await = SessionState::Unauthenticated;
    }
}

impl Default for SessionAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}
