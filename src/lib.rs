//! # Bullish Client
//!
//! An async Rust client library for the Bullish exchange trading API.
//!
//! ## Features
//!
//! - Login handshake for both credential schemes the API recognizes:
//!   ECDSA (P-256) API keys and HMAC-SHA256 API keys
//! - Per-request signing of privileged calls (order creation, withdrawals)
//! - Strong typing for request/response bodies
//! - Financial precision with `rust_decimal`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bullish_api_client::auth::CredentialsConfig;
//! use bullish_api_client::rest::BullishClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = CredentialsConfig::hmac("HMAC-1234", "my-secret").build()?;
//!     let client = BullishClient::builder().credentials(credentials).build();
//!     let session = client.login().await?;
//!     println!("Authorizer: {:?}", session.authorizer);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod rest;

// Re-export commonly used types at crate root
pub use error::BullishError;
pub use rest::types::{OrderSide, OrderType, TimeInForce};

/// Result type alias using BullishError
pub type Result<T> = std::result::Result<T, BullishError>;
