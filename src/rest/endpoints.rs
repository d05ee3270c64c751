//! Bullish REST API endpoint constants.
//!
//! Paths are external contract; the server signs/verifies over them, so they
//! must not be altered.

/// Base URL for the Bullish production REST API.
pub const BULLISH_BASE_URL: &str = "https://api.exchange.bullish.com";

/// ECDSA login (POST, JSON body).
pub const ECDSA_LOGIN_PATH: &str = "/trading-api/v2/users/login";
/// HMAC login (GET, signed headers only).
pub const HMAC_LOGIN_PATH: &str = "/trading-api/v1/users/hmac/login";
/// Order creation (POST, JSON body).
pub const ORDERS_PATH: &str = "/trading-api/v2/orders";
/// Trading accounts listing (GET).
pub const TRADING_ACCOUNTS_PATH: &str = "/trading-api/v1/accounts/trading-accounts";
/// Server nonce range (GET, unauthenticated).
pub const NONCE_PATH: &str = "/trading-api/v1/nonce";
/// Withdrawal submission (POST, JSON body).
pub const WITHDRAWAL_PATH: &str = "/trading-api/v1/wallets/withdrawal";

/// Withdrawal instructions lookup for a crypto or fiat symbol.
pub fn withdrawal_instructions_path(kind: InstructionKind, symbol: &str) -> String {
    format!("/trading-api/v1/wallets/withdrawal-instructions/{}/{symbol}", kind.as_str())
}

/// Whether a withdrawal destination is a crypto network or a fiat rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    /// Crypto withdrawal destinations
    Crypto,
    /// Fiat withdrawal destinations
    Fiat,
}

impl InstructionKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Fiat => "fiat",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdrawal_instructions_path() {
        assert_eq!(
            withdrawal_instructions_path(InstructionKind::Crypto, "EOS"),
            "/trading-api/v1/wallets/withdrawal-instructions/crypto/EOS"
        );
        assert_eq!(
            withdrawal_instructions_path(InstructionKind::Fiat, "USD"),
            "/trading-api/v1/wallets/withdrawal-instructions/fiat/USD"
        );
    }
}
