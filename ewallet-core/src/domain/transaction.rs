//! Transaction domain model

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// Direction of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionMethod {
    BankToWallet,
    WalletToBank,
    UserToUser,
    BankToPerson,
    WalletToPerson,
    AdminToUser,
}

impl TransactionMethod {
    pub const ALL: [TransactionMethod; 6] = [
        TransactionMethod::BankToWallet,
        TransactionMethod::WalletToBank,
        TransactionMethod::UserToUser,
        TransactionMethod::BankToPerson,
        TransactionMethod::WalletToPerson,
        TransactionMethod::AdminToUser,
    ];

    /// Wire name, e.g. `BANK_TO_WALLET`
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionMethod::BankToWallet => "BANK_TO_WALLET",
            TransactionMethod::WalletToBank => "WALLET_TO_BANK",
            TransactionMethod::UserToUser => "USER_TO_USER",
            TransactionMethod::BankToPerson => "BANK_TO_PERSON",
            TransactionMethod::WalletToPerson => "WALLET_TO_PERSON",
            TransactionMethod::AdminToUser => "ADMIN_TO_USER",
        }
    }

    /// Human label, e.g. `bank to wallet`
    pub fn label(&self) -> String {
        self.as_str().to_lowercase().replace('_', " ")
    }

    /// Shown on the wallet tab
    pub fn involves_wallet(&self) -> bool {
        self.as_str().contains("WALLET")
    }

    /// Shown on the bank tab
    pub fn involves_bank(&self) -> bool {
        self.as_str().contains("BANK")
    }

    /// Transfers between the user's own bank account and wallet
    pub fn is_self_transfer(&self) -> bool {
        matches!(
            self,
            TransactionMethod::BankToWallet | TransactionMethod::WalletToBank
        )
    }
}

impl fmt::Display for TransactionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionMethod {
    type Err = String;

    /// Accepts `BANK_TO_WALLET`, `bank_to_wallet` and `bank-to-wallet`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        TransactionMethod::ALL
            .iter()
            .find(|m| m.as_str() == normalized)
            .copied()
            .ok_or_else(|| {
                let names: Vec<_> = TransactionMethod::ALL.iter().map(|m| m.as_str()).collect();
                format!("Unknown transaction method '{}'. Expected one of: {}", s, names.join(", "))
            })
    }
}

/// Server-determined settlement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxnStatus {
    Pending,
    Successful,
    Failed,
}

impl TxnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnStatus::Pending => "PENDING",
            TxnStatus::Successful => "SUCCESSFUL",
            TxnStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for TxnStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(TxnStatus::Pending),
            "SUCCESSFUL" => Ok(TxnStatus::Successful),
            "FAILED" => Ok(TxnStatus::Failed),
            other => Err(format!("Unknown transaction status '{}'", other)),
        }
    }
}

/// Which side of a transfer a history row represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Debit,
    Credit,
}

/// A transaction as returned by the transaction service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub txn_id: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub from_currency: Option<String>,
    #[serde(default)]
    pub to_currency: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub txn_status: Option<TxnStatus>,
    #[serde(default)]
    pub transaction_method: Option<TransactionMethod>,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub updated_on: Option<DateTime<Utc>>,
}

/// Timestamps arrive as epoch milliseconds or RFC 3339 strings
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => {
            let ms = n
                .as_i64()
                .ok_or_else(|| D::Error::custom("timestamp out of range"))?;
            Ok(Utc.timestamp_millis_opt(ms).single())
        }
        Some(JsonValue::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .or_else(|_| {
                // Jackson without a zone: 2025-01-15T10:30:00.000+0000
                DateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f%z")
                    .map(|dt| Some(dt.with_timezone(&Utc)))
            })
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", s, e))),
        Some(_) => Err(D::Error::custom("expected number or string for timestamp")),
    }
}

impl Transaction {
    pub fn is_debit(&self) -> bool {
        self.transaction_type == Some(TransactionType::Debit)
    }

    pub fn is_credit(&self) -> bool {
        self.transaction_type == Some(TransactionType::Credit)
    }

    pub fn involves_wallet(&self) -> bool {
        self.transaction_method
            .map(|m| m.involves_wallet())
            .unwrap_or(false)
    }

    pub fn involves_bank(&self) -> bool {
        self.transaction_method
            .map(|m| m.involves_bank())
            .unwrap_or(false)
    }
}

/// Reply of `GET /transaction/get/msg`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatusMessage {
    /// Status name; the server sends the literal "null" while it has none
    pub status: String,
    #[serde(default)]
    pub msg: Option<String>,
}

impl TransactionStatusMessage {
    pub fn parsed_status(&self) -> Option<TxnStatus> {
        self.status.parse().ok()
    }

    pub fn is_failed(&self) -> bool {
        self.parsed_status() == Some(TxnStatus::Failed)
    }
}

/// Aggregates shown on the dashboards
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionSummary {
    pub count: usize,
    pub total_sent: Decimal,
    pub total_received: Decimal,
    pub by_method: BTreeMap<TransactionMethod, usize>,
    pub pending: usize,
    pub failed: usize,
}

impl TransactionSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut summary = Self {
            count: transactions.len(),
            ..Default::default()
        };

        for method in TransactionMethod::ALL {
            summary.by_method.insert(method, 0);
        }

        for tx in transactions {
            let amount = tx.amount.unwrap_or_default();
            if tx.is_debit() {
                summary.total_sent += amount;
            } else if tx.is_credit() {
                summary.total_received += amount;
            }
            if let Some(method) = tx.transaction_method {
                *summary.by_method.entry(method).or_insert(0) += 1;
            }
            match tx.txn_status {
                Some(TxnStatus::Pending) => summary.pending += 1,
                Some(TxnStatus::Failed) => summary.failed += 1,
                _ => {}
            }
        }

        summary
    }
}
