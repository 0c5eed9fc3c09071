//! Dashboard service - the user, wallet and bank snapshot behind `ew dashboard`

use std::sync::Arc;
use std::thread;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{Balance, BalanceKind, Transaction, TransactionSummary, UserProfile};

use super::balance::BalanceService;
use super::transaction::TransactionService;
use super::user::UserService;

/// Everything the overview tab shows
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub phone: String,
    pub user: UserProfile,
    pub wallet: Balance,
    pub bank: Balance,
}

impl DashboardSnapshot {
    pub fn total(&self) -> Decimal {
        self.wallet.amount + self.bank.amount
    }
}

/// Transaction history with its aggregates
#[derive(Debug, Clone, Serialize)]
pub struct History {
    pub transactions: Vec<Transaction>,
    pub summary: TransactionSummary,
}

impl History {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let summary = TransactionSummary::from_transactions(&transactions);
        Self {
            transactions,
            summary,
        }
    }

    /// Rows for the wallet tab
    pub fn wallet_only(&self) -> Vec<&Transaction> {
        self.transactions.iter().filter(|t| t.involves_wallet()).collect()
    }

    /// Rows for the bank tab
    pub fn bank_only(&self) -> Vec<&Transaction> {
        self.transactions.iter().filter(|t| t.involves_bank()).collect()
    }
}

pub struct DashboardService {
    users: Arc<UserService>,
    balances: Arc<BalanceService>,
    transactions: Arc<TransactionService>,
}

impl DashboardService {
    pub fn new(
        users: Arc<UserService>,
        balances: Arc<BalanceService>,
        transactions: Arc<TransactionService>,
    ) -> Self {
        Self {
            users,
            balances,
            transactions,
        }
    }

    /// Fetch user, wallet balance and bank balance in parallel
    ///
    /// Fails with the first error in user, wallet, bank order; no partial
    /// snapshot is returned.
    pub fn snapshot(&self, phone: &str) -> Result<DashboardSnapshot> {
        let (user, wallet, bank) = thread::scope(|scope| {
            let user = scope.spawn(|| self.users.get_user_by_phone(phone));
            let wallet = scope.spawn(|| self.balances.wallet_balance());
            let bank = scope.spawn(|| self.balances.bank_balance());
            (join(user), join(wallet), join(bank))
        });

        let user = user?;
        let wallet = wallet?;
        let bank = bank?;

        Ok(DashboardSnapshot {
            phone: phone.to_string(),
            user,
            wallet: Balance::for_phone(BalanceKind::Wallet, wallet, phone),
            bank: Balance::for_phone(BalanceKind::Bank, bank, phone),
        })
    }

    /// The logged-in user's history
    pub fn history(&self) -> Result<History> {
        Ok(History::new(self.transactions.my_transactions()?))
    }

    /// Every user's history (admin)
    pub fn admin_history(&self) -> Result<History> {
        Ok(History::new(self.transactions.all_transactions()?))
    }
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, Result<T>>) -> Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(Error::Other("Request thread panicked".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::adapters::http::ApiClient;
    use crate::adapters::memory_session::MemorySessionStore;
    use crate::adapters::mock_server::{MockBackend, MockReply};
    use crate::config::ServiceUrls;
    use crate::domain::Session;
    use crate::services::SessionManager;

    const PHONE: &str = "+91-9876543210";

    fn service(server: &MockBackend) -> DashboardService {
        let store = Arc::new(MemorySessionStore::with_session(Session::new("tok", PHONE)));
        let session = Arc::new(SessionManager::new(store));
        let client = Arc::new(
            ApiClient::new(ServiceUrls::from_single_base(&server.base_url()), session, 5).unwrap(),
        );
        DashboardService::new(
            Arc::new(UserService::new(client.clone())),
            Arc::new(BalanceService::new(client.clone())),
            Arc::new(TransactionService::new(client, Duration::ZERO)),
        )
    }

    fn respond_user(server: &MockBackend) {
        server.respond(
            "GET",
            "/user/get/%2B91-9876543210",
            MockReply::json(200, r#"{"username":"+91-9876543210","authorityList":[]}"#),
        );
    }

    #[test]
    fn test_snapshot_fetches_in_parallel() {
        let server = MockBackend::start().unwrap();
        respond_user(&server);
        server.respond("GET", "/wallet/view/balance", MockReply::json(200, "150").delayed(300));
        server.respond("GET", "/bank/get/balance", MockReply::json(200, "850").delayed(300));
        let dashboard = service(&server);

        let started = Instant::now();
        let snapshot = dashboard.snapshot(PHONE).unwrap();
        assert!(started.elapsed() < Duration::from_millis(550));

        assert_eq!(snapshot.wallet.amount, Decimal::new(150, 0));
        assert_eq!(snapshot.bank.currency, "INR");
        assert_eq!(snapshot.total(), Decimal::new(1000, 0));
        assert_eq!(server.request_count(), 3);
    }

    #[test]
    fn test_snapshot_surfaces_first_error_in_order() {
        let server = MockBackend::start().unwrap();
        respond_user(&server);
        server.respond(
            "GET",
            "/wallet/view/balance",
            MockReply::json(500, r#"{"message":"Wallet not found"}"#),
        );
        server.respond(
            "GET",
            "/bank/get/balance",
            MockReply::json(500, r#"{"message":"Bank account not found"}"#),
        );
        let dashboard = service(&server);

        let err = dashboard.snapshot(PHONE).unwrap_err();
        assert_eq!(err.to_string(), "Wallet not found");
    }

    #[test]
    fn test_history_tabs() {
        let server = MockBackend::start().unwrap();
        server.respond(
            "GET",
            "/transaction/get",
            MockReply::json(
                200,
                r#"[
                    {"txnId":"a","amount":10,"transactionMethod":"BANK_TO_WALLET","transactionType":"CREDIT"},
                    {"txnId":"b","amount":4,"transactionMethod":"USER_TO_USER","transactionType":"DEBIT"},
                    {"txnId":"c","amount":1,"transactionMethod":"BANK_TO_PERSON","transactionType":"DEBIT"}
                ]"#,
            ),
        );
        let dashboard = service(&server);

        let history = dashboard.history().unwrap();
        assert_eq!(history.wallet_only().len(), 1);
        assert_eq!(history.bank_only().len(), 2);
        assert_eq!(history.summary.total_sent, Decimal::new(5, 0));
        assert_eq!(history.summary.total_received, Decimal::new(10, 0));
    }
}
