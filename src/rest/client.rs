//! Bullish REST API client implementation.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use uuid::Uuid;

use crate::auth::{
    BX_SIGNATURE, Credentials, IncreasingNonce, NonceProvider, RequestSigner, Session,
    SessionAuthenticator, Signer, epoch_millis,
};
use crate::error::BullishError;
use crate::rest::endpoints::{
    BULLISH_BASE_URL, InstructionKind, NONCE_PATH, ORDERS_PATH, TRADING_ACCOUNTS_PATH,
    WITHDRAWAL_PATH, withdrawal_instructions_path,
};
use crate::rest::types::{
    CreateOrderRequest, CreateOrderResponse, NonceRange, TradingAccount, WithdrawalAcceptance,
    WithdrawalCommand, WithdrawalInstruction, WithdrawalRequest,
};

/// The Bullish REST API client.
///
/// Handles the login handshake and per-request signing for privileged
/// endpoints. Credentials are optional; without them only unauthenticated
/// endpoints (the nonce range) are available.
///
/// # Example
///
/// ```rust,no_run
/// use bullish_api_client::auth::CredentialsConfig;
/// use bullish_api_client::rest::BullishClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let credentials = CredentialsConfig::hmac("HMAC-1234", "my-secret").build()?;
///     let client = BullishClient::builder().credentials(credentials).build();
///
///     client.login().await?;
///     let account_id = client.first_trading_account_id().await?;
///     println!("Trading account: {account_id}");
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BullishClient {
    http_client: ClientWithMiddleware,
    base_url: String,
    credentials: Option<Arc<Credentials>>,
    request_signer: Option<Arc<RequestSigner>>,
    session: Arc<SessionAuthenticator>,
}

impl BullishClient {
    /// Create a new client with default settings and no credentials.
    ///
    /// Use [`BullishClient::builder()`] to configure credentials for
    /// privileged endpoints.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder.
    pub fn builder() -> BullishClientBuilder {
        BullishClientBuilder::new()
    }

    /// Perform the login handshake for the configured credentials.
    ///
    /// On success the session token is cached and attached to subsequent
    /// privileged calls. No retry is attempted on failure.
    pub async fn login(&self) -> Result<Session, BullishError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(BullishError::MissingCredentials)?;
        self.session
            .login(&self.http_client, &self.base_url, credentials)
            .await
    }

    /// The current session, if logged in.
    pub async fn session(&self) -> Option<Session> {
        self.session.session().await
    }

    /// Whether a login has succeeded and not been cleared.
    pub async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }

    /// Drop the cached session.
    pub async fn logout(&self) {
        self.session.logout().await;
    }

    /// List the trading accounts visible to this session.
    pub async fn get_trading_accounts(&self) -> Result<Vec<TradingAccount>, BullishError> {
        self.get_with_bearer(TRADING_ACCOUNTS_PATH).await
    }

    /// The identifier of the first trading account.
    ///
    /// Convenience for single-account API keys.
    pub async fn first_trading_account_id(&self) -> Result<String, BullishError> {
        let accounts = self.get_trading_accounts().await?;
        accounts
            .into_iter()
            .next()
            .map(|account| account.trading_account_id)
            .ok_or_else(|| {
                BullishError::InvalidResponse("Trading accounts response was empty".to_string())
            })
    }

    /// Get the server-side nonce acceptance window (unauthenticated).
    pub async fn get_nonce_range(&self) -> Result<NonceRange, BullishError> {
        let url = format!("{}{}", self.base_url, NONCE_PATH);
        let response = self.http_client.get(&url).send().await?;
        self.parse_response(response).await
    }

    /// Create an order.
    ///
    /// The body is serialized exactly once; the same bytes are signed and
    /// transmitted so the server's signature verification sees what was
    /// signed.
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, BullishError> {
        let bearer = self.bearer().await?;
        let signer = self.request_signer()?;

        let body = serde_json::to_string(request)?;
        let envelope = signer.sign_order_request("POST", ORDERS_PATH, &body)?;

        let url = format!("{}{}", self.base_url, ORDERS_PATH);
        let mut http_request = self
            .http_client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, bearer);
        for (name, value) in envelope.headers() {
            http_request = http_request.header(name, value);
        }

        let response = http_request.body(body).send().await?;
        self.parse_response(response).await
    }

    /// List signed withdrawal destinations for a symbol.
    pub async fn get_withdrawal_instructions(
        &self,
        kind: InstructionKind,
        symbol: &str,
    ) -> Result<Vec<WithdrawalInstruction>, BullishError> {
        self.get_with_bearer(&withdrawal_instructions_path(kind, symbol))
            .await
    }

    /// Submit a withdrawal to a signed destination.
    ///
    /// Withdrawals embed a fresh UUID nonce and the timestamp in the body
    /// and are signed in direct mode; only `BX-SIGNATURE` is sent as a
    /// header. The authorizer from the login response is attached when the
    /// server provided one.
    pub async fn withdraw(
        &self,
        command: WithdrawalCommand,
    ) -> Result<WithdrawalAcceptance, BullishError> {
        let bearer = self.bearer().await?;
        let signer = self.request_signer()?;
        let authorizer = self.session().await.and_then(|session| session.authorizer);

        let request = WithdrawalRequest {
            nonce: Uuid::new_v4().to_string(),
            timestamp: epoch_millis().to_string(),
            authorizer,
            command,
        };
        let body = serde_json::to_string(&request)?;
        let envelope = signer.sign_transfer_request(
            "POST",
            WITHDRAWAL_PATH,
            &body,
            &request.nonce,
            &request.timestamp,
        )?;

        let url = format!("{}{}", self.base_url, WITHDRAWAL_PATH);
        let response = self
            .http_client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, bearer)
            .header(BX_SIGNATURE, &envelope.signature)
            .body(body)
            .send()
            .await?;
        self.parse_response(response).await
    }

    fn request_signer(&self) -> Result<&RequestSigner, BullishError> {
        self.request_signer
            .as_deref()
            .ok_or(BullishError::MissingCredentials)
    }

    /// `Authorization` header value, failing fast before any network I/O if
    /// no login has succeeded.
    async fn bearer(&self) -> Result<String, BullishError> {
        let token = self
            .session
            .bearer_token()
            .await
            .ok_or(BullishError::MissingSession)?;
        Ok(format!("Bearer {token}"))
    }

    /// Make a bearer-authenticated GET request.
    async fn get_with_bearer<T>(&self, path: &str) -> Result<T, BullishError>
    where
        T: serde::de::DeserializeOwned,
    {
        let bearer = self.bearer().await?;
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, bearer)
            .send()
            .await?;
        self.parse_response(response).await
    }

    /// Parse a response from the Bullish API.
    ///
    /// Any non-success status surfaces as [`BullishError::Api`] carrying the
    /// status and raw body, so a signature rejection is distinguishable from
    /// an unrelated server error.
    async fn parse_response<T>(&self, response: reqwest::Response) -> Result<T, BullishError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Bullish API request rejected");
            return Err(BullishError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            BullishError::InvalidResponse(format!("Failed to parse response: {e}. Body: {body}"))
        })
    }
}

impl Default for BullishClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BullishClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BullishClient")
            .field("base_url", &self.base_url)
            .field("has_credentials", &self.credentials.is_some())
            .finish()
    }
}

/// Builder for [`BullishClient`].
pub struct BullishClientBuilder {
    base_url: String,
    credentials: Option<Credentials>,
    nonce_provider: Option<Arc<dyn NonceProvider>>,
    user_agent: Option<String>,
}

impl BullishClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: BULLISH_BASE_URL.to_string(),
            credentials: None,
            nonce_provider: None,
            user_agent: None,
        }
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the credentials for privileged endpoints.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set a custom nonce provider.
    ///
    /// Clients sharing one credential must share one provider so nonces
    /// stay strictly increasing across them.
    pub fn nonce_provider(mut self, provider: Arc<dyn NonceProvider>) -> Self {
        self.nonce_provider = Some(provider);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> BullishClient {
        // Build default headers.
        let mut headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("bullish-api-client/{}", env!("CARGO_PKG_VERSION")));
        let header_value = HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("bullish-api-client"));
        headers.insert(USER_AGENT, header_value);

        // Build the HTTP client with middleware.
        let reqwest_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        let nonce_provider = self
            .nonce_provider
            .unwrap_or_else(|| Arc::new(IncreasingNonce::new()));

        let request_signer = self.credentials.as_ref().map(|credentials| {
            Arc::new(RequestSigner::new(
                Signer::for_credentials(credentials),
                nonce_provider.clone(),
            ))
        });

        BullishClient {
            http_client: client,
            base_url: self.base_url,
            credentials: self.credentials.map(Arc::new),
            request_signer,
            session: Arc::new(SessionAuthenticator::new()),
        }
    }
}

impl Default for BullishClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
