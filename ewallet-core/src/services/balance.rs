//! Balance service - wallet and bank balances, bank top-ups

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::adapters::http::{ApiClient, ApiResponse};
use crate::config::ServiceName;
use crate::domain::result::{Error, Result};

pub struct BalanceService {
    client: Arc<ApiClient>,
}

impl BalanceService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `GET /wallet/view/balance`
    pub fn wallet_balance(&self) -> Result<Decimal> {
        let reply = self.client.get(ServiceName::Wallet, "/view/balance")?;
        parse_balance(reply)
    }

    /// `GET /bank/get/balance`
    pub fn bank_balance(&self) -> Result<Decimal> {
        let reply = self.client.get(ServiceName::Bank, "/get/balance")?;
        parse_balance(reply)
    }

    /// `PUT /bank/add/money`, returning the server's confirmation text
    pub fn add_money_to_bank(&self, amount: Decimal) -> Result<String> {
        if amount <= Decimal::ZERO {
            return Err(Error::Other("Amount must be greater than zero".to_string()));
        }
        let body = serde_json::json!({ "amount": decimal_to_json(amount) });
        let reply = self.client.put(ServiceName::Bank, "/add/money", &body)?;
        Ok(reply.into_text())
    }
}

/// JSON number for an amount
pub(crate) fn decimal_to_json(amount: Decimal) -> JsonValue {
    serde_json::from_str::<JsonValue>(&amount.normalize().to_string())
        .unwrap_or(JsonValue::Null)
}

fn parse_balance(reply: ApiResponse) -> Result<Decimal> {
    let raw = match reply {
        ApiResponse::Json(JsonValue::Number(n)) => n.to_string(),
        ApiResponse::Json(JsonValue::String(s)) => s,
        ApiResponse::Text(s) => s,
        ApiResponse::Json(other) => {
            return Err(Error::invalid_response(format!(
                "expected a balance, got {}",
                other
            )))
        }
    };

    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| Error::invalid_response(format!("expected a balance, got '{}'", raw)))
}
