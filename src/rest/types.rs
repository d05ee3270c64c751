//! Types for the Bullish REST API endpoints.
//!
//! Request bodies here are signed byte-for-byte, so field declaration order
//! follows the wire format exactly and amounts use string-serialized
//! [`Decimal`] values to preserve their scale (`"1.5000"` must not become
//! `"1.5"`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    /// Buy order
    Buy,
    /// Sell order
    Sell,
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Limit order
    Limit,
    /// Market order
    Market,
    /// Stop-limit order
    StopLimit,
    /// Post-only limit order
    PostOnly,
}

/// Time in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good til cancelled
    Gtc,
    /// Immediate or cancel
    Ioc,
    /// Fill or kill
    Fok,
}

/// Order creation request (`V3CreateOrder` command).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Market symbol, e.g. `BTCUSDC`
    pub symbol: String,
    /// Command discriminator, always `V3CreateOrder`
    pub command_type: String,
    /// Order type
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Order side
    pub side: OrderSide,
    /// Order quantity
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    /// Limit price; omitted for market orders
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::str_option"
    )]
    pub price: Option<Decimal>,
    /// Stop trigger price for stop-limit orders
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::str_option"
    )]
    pub stop_price: Option<Decimal>,
    /// Time in force
    pub time_in_force: TimeInForce,
    /// Whether the order may borrow on margin
    pub allow_borrow: bool,
    /// Client-chosen order identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    /// Trading account the order is placed under
    pub trading_account_id: String,
}

impl CreateOrderRequest {
    /// A GTC limit order with borrowing disabled.
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
        trading_account_id: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            command_type: "V3CreateOrder".to_string(),
            order_type: OrderType::Limit,
            side,
            quantity,
            price: Some(price),
            stop_price: None,
            time_in_force: TimeInForce::Gtc,
            allow_borrow: false,
            client_order_id: None,
            trading_account_id: trading_account_id.into(),
        }
    }

    /// A market order with borrowing disabled.
    pub fn market(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        trading_account_id: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            command_type: "V3CreateOrder".to_string(),
            order_type: OrderType::Market,
            side,
            quantity,
            price: None,
            stop_price: None,
            time_in_force: TimeInForce::Ioc,
            allow_borrow: false,
            client_order_id: None,
            trading_account_id: trading_account_id.into(),
        }
    }

    /// Set the client order identifier.
    pub fn client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }
}

/// Order creation acknowledgement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    /// Human-readable acknowledgement message
    #[serde(default)]
    pub message: Option<String>,
    /// Request identifier assigned by the exchange
    #[serde(default)]
    pub request_id: Option<String>,
    /// Exchange order identifier
    pub order_id: String,
    /// Echo of the client order identifier
    #[serde(default)]
    pub client_order_id: Option<String>,
}

/// A trading account, as returned by the accounts listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingAccount {
    /// Trading account identifier
    pub trading_account_id: String,
    /// Whether this is the primary account
    #[serde(default)]
    pub is_primary_account: Option<bool>,
    /// Rate limit token for this account, if issued
    #[serde(default)]
    pub rate_limit_token: Option<String>,
}

/// Server-side nonce window for order nonces.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceRange {
    /// Smallest nonce the server currently accepts
    pub lower_bound: u64,
    /// Largest nonce the server currently accepts
    pub upper_bound: u64,
}

/// A signed withdrawal destination.
///
/// Destinations are signed on the Bullish website; the API only lists them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalInstruction {
    /// Destination identifier referenced by withdrawal commands
    pub destination_id: String,
    /// Asset symbol
    #[serde(default)]
    pub symbol: Option<String>,
    /// Network for crypto destinations
    #[serde(default)]
    pub network: Option<String>,
    /// Destination address for crypto destinations
    #[serde(default)]
    pub address: Option<String>,
    /// Withdrawal fee charged for this destination
    #[serde(default)]
    pub fee: Option<String>,
}

/// Withdrawal command (`V1Withdrawal`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalCommand {
    /// Command discriminator, always `V1Withdrawal`
    pub command_type: String,
    /// Signed destination identifier
    pub destination_id: String,
    /// Network; present for crypto withdrawals only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Asset symbol
    pub symbol: String,
    /// Amount to withdraw
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
}

impl WithdrawalCommand {
    /// A crypto withdrawal to a signed destination.
    pub fn crypto(
        destination_id: impl Into<String>,
        network: impl Into<String>,
        symbol: impl Into<String>,
        quantity: Decimal,
    ) -> Self {
        Self {
            command_type: "V1Withdrawal".to_string(),
            destination_id: destination_id.into(),
            network: Some(network.into()),
            symbol: symbol.into(),
            quantity,
        }
    }

    /// A fiat withdrawal to a signed destination.
    pub fn fiat(
        destination_id: impl Into<String>,
        symbol: impl Into<String>,
        quantity: Decimal,
    ) -> Self {
        Self {
            command_type: "V1Withdrawal".to_string(),
            destination_id: destination_id.into(),
            network: None,
            symbol: symbol.into(),
            quantity,
        }
    }
}

/// Full withdrawal request body.
///
/// Unlike orders, withdrawals embed their nonce and timestamp in the body;
/// the nonce is a fresh UUID per withdrawal, not the monotonic order nonce.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    /// Replay-protection nonce (UUIDv4), unique per withdrawal
    pub nonce: String,
    /// Epoch-millisecond timestamp
    pub timestamp: String,
    /// Authorizer identifier from the login response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorizer: Option<String>,
    /// The withdrawal command
    pub command: WithdrawalCommand,
}

/// Withdrawal acknowledgement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalAcceptance {
    /// Human-readable status
    #[serde(default)]
    pub status_reason: Option<String>,
    /// Numeric status code
    #[serde(default)]
    pub status_reason_code: Option<i64>,
    /// Custody transaction identifier for tracking
    #[serde(default)]
    pub custody_transaction_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_order_serialization_is_byte_stable() {
        let request = CreateOrderRequest::limit(
            "ETHUSDC",
            OrderSide::Sell,
            "1.123".parse().unwrap(),
            "1432.6".parse().unwrap(),
            "111234567890",
        )
        .client_order_id("1234");

        let body = serde_json::to_string(&request).unwrap();
        assert_eq!(
            body,
            r#"{"symbol":"ETHUSDC","commandType":"V3CreateOrder","type":"LIMIT","side":"SELL","quantity":"1.123","price":"1432.6","timeInForce":"GTC","allowBorrow":false,"clientOrderId":"1234","tradingAccountId":"111234567890"}"#
        );
        // Serializing twice yields identical bytes.
        assert_eq!(body, serde_json::to_string(&request).unwrap());
    }

    #[test]
    fn test_decimal_scale_is_preserved() {
        let request = CreateOrderRequest::limit(
            "BTCUSDC",
            OrderSide::Buy,
            "1.87000000".parse().unwrap(),
            "30071.5000".parse().unwrap(),
            "1",
        );
        let body = serde_json::to_string(&request).unwrap();
        assert!(body.contains(r#""quantity":"1.87000000""#));
        assert!(body.contains(r#""price":"30071.5000""#));
    }

    #[test]
    fn test_market_order_omits_price() {
        let request = CreateOrderRequest::market(
            "BTCUSDC",
            OrderSide::Buy,
            "1.0".parse().unwrap(),
            "1",
        );
        let body = serde_json::to_string(&request).unwrap();
        assert!(!body.contains("price"));
        assert!(body.contains(r#""type":"MARKET""#));
        assert!(body.contains(r#""timeInForce":"IOC""#));
    }

    #[test]
    fn test_withdrawal_request_serialization() {
        let request = WithdrawalRequest {
            nonce: "85548fae-5fec-44ab-83a4-c6bf2d4c8788".to_string(),
            timestamp: "1696841072969".to_string(),
            authorizer: Some("AUTH-1".to_string()),
            command: WithdrawalCommand::crypto("2097b237", "EOS", "EOS", "0.1".parse().unwrap()),
        };
        let body = serde_json::to_string(&request).unwrap();
        assert_eq!(
            body,
            r#"{"nonce":"85548fae-5fec-44ab-83a4-c6bf2d4c8788","timestamp":"1696841072969","authorizer":"AUTH-1","command":{"commandType":"V1Withdrawal","destinationId":"2097b237","network":"EOS","symbol":"EOS","quantity":"0.1"}}"#
        );
    }

    #[test]
    fn test_fiat_withdrawal_omits_network() {
        let command = WithdrawalCommand::fiat("2097b237", "USD", "100.00".parse().unwrap());
        let body = serde_json::to_string(&command).unwrap();
        assert!(!body.contains("network"));
        assert!(body.contains(r#""quantity":"100.00""#));
    }

    #[test]
    fn test_nonce_range_deserialization() {
        let range: NonceRange =
            serde_json::from_str(r#"{"lowerBound":1639393131,"upperBound":1639393171}"#).unwrap();
        assert_eq!(range.lower_bound, 1639393131);
        assert_eq!(range.upper_bound, 1639393171);
    }
}
