//! Balance domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::currency_for_phone;

/// Which ledger a balance was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceKind {
    Wallet,
    Bank,
}

impl BalanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceKind::Wallet => "wallet",
            BalanceKind::Bank => "bank",
        }
    }
}

/// A balance reading labelled with the owner's currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub kind: BalanceKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
}

impl Balance {
    /// Build a balance for the owner of `phone`
    pub fn for_phone(kind: BalanceKind, amount: Decimal, phone: &str) -> Self {
        Self {
            kind,
            amount,
            currency: currency_for_phone(phone).to_string(),
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_currency_from_phone() {
        let balance = Balance::for_phone(BalanceKind::Wallet, dec("250.5"), "+91-9876543210");
        assert_eq!(balance.currency, "INR");
        assert_eq!(balance.to_string(), "250.50 INR");
    }

    #[test]
    fn test_serializes_amount_as_number() {
        let balance = Balance::for_phone(BalanceKind::Bank, dec("10"), "+1-5551234");
        let json = serde_json::to_value(&balance).unwrap();
        assert_eq!(json["kind"], "bank");
        assert_eq!(json["amount"], 10.0);
        assert_eq!(json["currency"], "USD");
    }
}
