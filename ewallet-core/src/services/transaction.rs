//! Transaction service - transfers, status lookups and history

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::adapters::http::{ApiClient, ApiResponse};
use crate::config::ServiceName;
use crate::domain::result::{Error, Result};
use crate::domain::{
    Transaction, TransactionMethod, TransactionStatusMessage, TransferRequest, TxnStatus,
};

use super::balance::decimal_to_json;

/// What happened to a submitted transfer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub txn_id: String,
    /// Parsed status, `None` while the server has not decided yet
    pub status: Option<TxnStatus>,
    pub raw_status: String,
    pub message: Option<String>,
}

impl TransferOutcome {
    pub fn is_failed(&self) -> bool {
        self.status == Some(TxnStatus::Failed)
    }
}

pub struct TransactionService {
    client: Arc<ApiClient>,
    poll_delay: Duration,
}

impl TransactionService {
    pub fn new(client: Arc<ApiClient>, poll_delay: Duration) -> Self {
        Self { client, poll_delay }
    }

    /// `POST /transaction/initiate`, returning the transaction id
    ///
    /// The service answers 200 with `{"error": ...}` for some rejections, and
    /// an empty body when it could not create the transaction at all.
    pub fn initiate(&self, request: &TransferRequest) -> Result<String> {
        let body = serde_json::json!({
            "receiver": request.receiver,
            "amount": decimal_to_json(request.amount),
            "transactionMethod": request.transaction_method.as_str(),
        });
        let reply = self
            .client
            .post(ServiceName::Transaction, "/initiate", &body, true)?;

        if let Some(error) = reply
            .as_json()
            .and_then(|v| v.get("error"))
            .and_then(|v| v.as_str())
            .filter(|e| !e.trim().is_empty())
        {
            return Err(Error::Transaction(error.to_string()));
        }

        let txn_id = match reply {
            ApiResponse::Json(JsonValue::Object(map)) => map
                .get("txnId")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or_default(),
            other => other.into_text(),
        };
        let txn_id = txn_id.trim().trim_matches('"').to_string();

        if txn_id.is_empty() {
            return Err(Error::Transaction("Transaction failed".to_string()));
        }
        Ok(txn_id)
    }

    /// `GET /transaction/get/msg?txnId=`
    pub fn status(&self, txn_id: &str) -> Result<TransactionStatusMessage> {
        let reply = self
            .client
            .get_with_query(ServiceName::Transaction, "/get/msg", &[("txnId", txn_id)])?;

        let value: JsonValue = reply.into_json()?;
        let status = match value.get("status") {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => "null".to_string(),
            Some(other) => other.to_string(),
        };
        let msg = value
            .get("msg")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Ok(TransactionStatusMessage { status, msg })
    }

    /// Initiate, give the backend a moment to settle, then read the status
    ///
    /// A transfer the backend marks `FAILED` is still `Ok`; check
    /// [`TransferOutcome::is_failed`].
    pub fn transfer(&self, request: &TransferRequest) -> Result<TransferOutcome> {
        let txn_id = self.initiate(request)?;

        if !self.poll_delay.is_zero() {
            thread::sleep(self.poll_delay);
        }

        let status = self.status(&txn_id)?;
        Ok(TransferOutcome {
            status: status.parsed_status(),
            raw_status: status.status,
            message: status.msg,
            txn_id,
        })
    }

    /// Convenience for transfers that move money between one's own accounts
    pub fn self_transfer(
        &self,
        method: TransactionMethod,
        amount: rust_decimal::Decimal,
    ) -> Result<TransferOutcome> {
        let phone = self
            .client
            .session()
            .phone()?
            .ok_or(Error::MissingToken)?;
        self.transfer(&TransferRequest {
            receiver: phone,
            amount,
            transaction_method: method,
        })
    }

    /// `GET /transaction/get`: the logged-in user's history
    pub fn my_transactions(&self) -> Result<Vec<Transaction>> {
        let reply = self.client.get(ServiceName::Transaction, "/get")?;
        parse_transactions(reply)
    }

    /// `GET /transaction/get/all`: every transaction (admin only)
    pub fn all_transactions(&self) -> Result<Vec<Transaction>> {
        let reply = self.client.get(ServiceName::Transaction, "/get/all")?;
        parse_transactions(reply)
    }
}

fn parse_transactions(reply: ApiResponse) -> Result<Vec<Transaction>> {
    match reply {
        ApiResponse::Text(text) if text.trim().is_empty() => Ok(Vec::new()),
        ApiResponse::Json(JsonValue::Null) => Ok(Vec::new()),
        other => other.into_json(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_session::MemorySessionStore;
    use crate::adapters::mock_server::{MockBackend, MockReply};
    use crate::config::ServiceUrls;
    use crate::domain::Session;
    use crate::services::SessionManager;
    use rust_decimal::Decimal;

    fn service(server: &MockBackend) -> TransactionService {
        let store = Arc::new(MemorySessionStore::with_session(Session::new(
            "tok",
            "+91-9876543210",
        )));
        let session = Arc::new(SessionManager::new(store));
        let client = Arc::new(
            ApiClient::new(ServiceUrls::from_single_base(&server.base_url()), session, 5).unwrap(),
        );
        TransactionService::new(client, Duration::ZERO)
    }

    fn request() -> TransferRequest {
        TransferRequest {
            receiver: "+1-5551234567".to_string(),
            amount: Decimal::new(250, 0),
            transaction_method: TransactionMethod::WalletToPerson,
        }
    }

    #[test]
    fn test_initiate_returns_txn_id() {
        let server = MockBackend::start().unwrap();
        server.respond("POST", "/transaction/initiate", MockReply::text(200, "txn-42"));
        let transactions = service(&server);

        assert_eq!(transactions.initiate(&request()).unwrap(), "txn-42");
        assert_eq!(
            server.requests()[0].json_body(),
            serde_json::json!({
                "receiver": "+1-5551234567",
                "amount": 250,
                "transactionMethod": "WALLET_TO_PERSON"
            })
        );
    }

    #[test]
    fn test_initiate_error_body_is_failure() {
        let server = MockBackend::start().unwrap();
        server.respond(
            "POST",
            "/transaction/initiate",
            MockReply::json(200, r#"{"error":"Receiver not found"}"#),
        );
        let transactions = service(&server);

        let err = transactions.initiate(&request()).unwrap_err();
        assert_eq!(err.to_string(), "Receiver not found");
    }

    #[test]
    fn test_initiate_empty_reply_is_failure() {
        let server = MockBackend::start().unwrap();
        server.respond("POST", "/transaction/initiate", MockReply::empty(200));
        let transactions = service(&server);

        let err = transactions.initiate(&request()).unwrap_err();
        assert_eq!(err.to_string(), "Transaction failed");
    }

    #[test]
    fn test_transfer_reports_failed_status_as_outcome() {
        let server = MockBackend::start().unwrap();
        server.respond("POST", "/transaction/initiate", MockReply::text(200, "txn-7"));
        server.respond(
            "GET",
            "/transaction/get/msg",
            MockReply::json(200, r#"{"status":"FAILED","msg":"Insufficient balance"}"#),
        );
        let transactions = service(&server);

        let outcome = transactions.transfer(&request()).unwrap();
        assert_eq!(outcome.txn_id, "txn-7");
        assert!(outcome.is_failed());
        assert_eq!(outcome.message.as_deref(), Some("Insufficient balance"));
        assert_eq!(server.requests()[1].target, "/transaction/get/msg?txnId=txn-7");
    }

    #[test]
    fn test_status_without_decision() {
        let server = MockBackend::start().unwrap();
        server.respond(
            "GET",
            "/transaction/get/msg",
            MockReply::json(200, r#"{"status":null,"msg":null}"#),
        );
        let transactions = service(&server);

        let status = transactions.status("txn-1").unwrap();
        assert_eq!(status.status, "null");
        assert!(status.parsed_status().is_none());
    }

    #[test]
    fn test_self_transfer_targets_own_phone() {
        let server = MockBackend::start().unwrap();
        server.respond("POST", "/transaction/initiate", MockReply::text(200, "txn-9"));
        server.respond(
            "GET",
            "/transaction/get/msg",
            MockReply::json(200, r#"{"status":"SUCCESSFUL","msg":"done"}"#),
        );
        let transactions = service(&server);

        let outcome = transactions
            .self_transfer(TransactionMethod::BankToWallet, Decimal::new(10, 0))
            .unwrap();
        assert_eq!(outcome.status, Some(TxnStatus::Successful));
        assert_eq!(server.requests()[0].json_body()["receiver"], "+91-9876543210");
    }

    #[test]
    fn test_history_lists() {
        let server = MockBackend::start().unwrap();
        server.respond(
            "GET",
            "/transaction/get",
            MockReply::json(
                200,
                r#"[{"txnId":"a","amount":5,"transactionType":"DEBIT","transactionMethod":"USER_TO_USER"}]"#,
            ),
        );
        server.respond("GET", "/transaction/get/all", MockReply::json(200, "[]"));
        let transactions = service(&server);

        let mine = transactions.my_transactions().unwrap();
        assert_eq!(mine.len(), 1);
        assert!(mine[0].is_debit());
        assert!(transactions.all_transactions().unwrap().is_empty());
    }
}
