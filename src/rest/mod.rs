//! Bullish REST API client.
//!
//! Provides the login handshake, signed order creation, withdrawals and the
//! read-only convenience endpoints the signed flows depend on (trading
//! accounts, withdrawal instructions, the server nonce window).

mod client;
pub mod endpoints;
pub mod types;

pub use client::{BullishClient, BullishClientBuilder};
pub use endpoints::{BULLISH_BASE_URL, InstructionKind};
