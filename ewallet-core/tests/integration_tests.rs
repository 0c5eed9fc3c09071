//! Integration tests for ewallet-core
//!
//! These drive `WalletContext` end to end against an in-process HTTP backend
//! with a real session file on disk.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rust_decimal::Decimal;
use tempfile::TempDir;

use ewallet_core::adapters::file_session::FileSessionStore;
use ewallet_core::adapters::mock_server::{MockBackend, MockReply};
use ewallet_core::config::{Config, ServiceUrls};
use ewallet_core::domain::{
    Field, LoginForm, RegistrationForm, Session, TransactionMethod, TransferForm, TxnStatus,
};
use ewallet_core::ports::SessionStore;
use ewallet_core::services::{EntryPoint, LogEvent, LogQuery, LoggingService};
use ewallet_core::{Error, WalletContext};

/// Context over a session file in `dir`, pointed at `backend`
fn context(dir: &TempDir, backend: &MockBackend) -> WalletContext {
    let mut config = Config::default();
    config.services = ServiceUrls::from_single_base(&backend.base_url());
    config.status_poll_delay_ms = 0;
    config.request_timeout_secs = 5;
    let store = Arc::new(FileSessionStore::new(dir.path()));
    WalletContext::with_store(config, store).expect("context")
}

// ============================================================================
// Validation Never Reaches the Network
// ============================================================================

#[test]
fn test_create_account_with_bad_fields_reports_all_errors_and_sends_nothing() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::start().unwrap();
    let ctx = context(&dir, &backend);

    let form = RegistrationForm {
        name: "Jo".to_string(),
        email: "bad".to_string(),
        country_code: "+1".to_string(),
        phone_number: "12345".to_string(),
        password: "123".to_string(),
    };

    let errors = match ctx.auth_service.register(&form) {
        Err(Error::Validation(errors)) => errors,
        other => panic!("expected validation errors, got {:?}", other.map(|_| ())),
    };

    assert_eq!(errors.len(), 4);
    assert!(errors.get(Field::Name).unwrap().contains("at least 3 characters"));
    assert!(errors.get(Field::Phone).unwrap().contains("7-15 digits"));
    assert!(errors.get(Field::Email).unwrap().to_lowercase().contains("invalid email"));
    assert!(errors.get(Field::Password).unwrap().contains("at least 6 characters"));

    thread::sleep(Duration::from_millis(50));
    assert_eq!(backend.request_count(), 0);
}

#[test]
fn test_authenticated_call_without_session_sends_nothing() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::start().unwrap();
    let ctx = context(&dir, &backend);

    let err = ctx.dashboard_service.snapshot("+1-5551234").unwrap_err();
    assert!(matches!(err, Error::MissingToken));
    assert!(err.requires_login());

    let transfer = TransferForm {
        receiver: "+1-5559876".to_string(),
        amount: "10".to_string(),
        method: Some(TransactionMethod::WalletToPerson),
    }
    .validate()
    .unwrap();
    assert!(matches!(
        ctx.transaction_service.transfer(&transfer),
        Err(Error::MissingToken)
    ));

    thread::sleep(Duration::from_millis(50));
    assert_eq!(backend.request_count(), 0);
}

// ============================================================================
// Full Session Flow
// ============================================================================

#[test]
fn test_login_dashboard_transfer_logout() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::start().unwrap();
    backend.respond("POST", "/user/login", MockReply::json(200, r#"{"token":"jwt-token"}"#));
    backend.respond(
        "GET",
        "/user/get/%2B91-9876543210",
        MockReply::json(200, r#"{"username":"+91-9876543210","authorityList":[{"authority":"USER"}]}"#),
    );
    backend.respond("GET", "/wallet/view/balance", MockReply::json(200, "120.50"));
    backend.respond("GET", "/bank/get/balance", MockReply::json(200, "5000"));
    backend.respond("POST", "/transaction/initiate", MockReply::text(200, "txn-123"));
    backend.respond(
        "GET",
        "/transaction/get/msg",
        MockReply::json(200, r#"{"status":"SUCCESSFUL","msg":"Transfer completed"}"#),
    );
    backend.respond(
        "GET",
        "/transaction/get",
        MockReply::json(
            200,
            r#"[{"txnId":"txn-123","amount":20,"transactionMethod":"WALLET_TO_PERSON","transactionType":"DEBIT","txnStatus":"SUCCESSFUL","createdOn":1736937000000}]"#,
        ),
    );
    let ctx = context(&dir, &backend);

    let session = ctx
        .auth_service
        .login(&LoginForm::new("+91", "9876543210", "secret"))
        .unwrap();
    assert_eq!(session.phone, "+91-9876543210");

    // A fresh context over the same directory sees the stored session
    let ctx = context(&dir, &backend);
    assert_eq!(
        ctx.session.token().unwrap().as_deref(),
        Some("jwt-token")
    );

    let snapshot = ctx.dashboard_service.snapshot(&session.phone).unwrap();
    assert_eq!(snapshot.wallet.amount, Decimal::new(12050, 2));
    assert_eq!(snapshot.bank.amount, Decimal::new(5000, 0));
    assert_eq!(snapshot.wallet.currency, "INR");
    assert!(!snapshot.user.is_admin());

    let request = TransferForm {
        receiver: "+1-5551234567".to_string(),
        amount: "20".to_string(),
        method: Some(TransactionMethod::WalletToPerson),
    }
    .validate()
    .unwrap();
    let outcome = ctx.transaction_service.transfer(&request).unwrap();
    assert_eq!(outcome.txn_id, "txn-123");
    assert_eq!(outcome.status, Some(TxnStatus::Successful));

    let history = ctx.dashboard_service.history().unwrap();
    assert_eq!(history.transactions.len(), 1);
    assert_eq!(history.summary.total_sent, Decimal::new(20, 0));
    assert!(history.transactions[0].created_on.is_some());

    ctx.auth_service.logout().unwrap();
    assert!(!dir.path().join("session.json").exists());
    assert!(!ctx.client.is_loading());
}

#[test]
fn test_expired_session_clears_session_file() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::start().unwrap();
    backend.respond(
        "GET",
        "/wallet/view/balance",
        MockReply::json(401, r#"{"error":"Unauthorized"}"#),
    );

    let store = FileSessionStore::new(dir.path());
    store.save(&Session::new("stale", "+1-5551234")).unwrap();

    let ctx = context(&dir, &backend);
    let err = ctx.balance_service.wallet_balance().unwrap_err();

    assert!(matches!(err, Error::SessionExpired));
    assert_eq!(
        ctx.client.last_error().as_deref(),
        Some("Session expired. Please login again.")
    );
    assert!(store.load().unwrap().is_none());
    assert!(!ctx.session.is_logged_in().unwrap());
}

#[test]
fn test_server_error_message_is_surfaced() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::start().unwrap();
    backend.respond(
        "PUT",
        "/bank/add/money",
        MockReply::json(400, r#"{"message":"","error":"Amount exceeds daily limit"}"#),
    );
    backend.respond("GET", "/bank/get/balance", MockReply::text(503, "<h1>down</h1>"));
    FileSessionStore::new(dir.path())
        .save(&Session::new("tok", "+1-5551234"))
        .unwrap();
    let ctx = context(&dir, &backend);

    let err = ctx
        .balance_service
        .add_money_to_bank(Decimal::new(1_000_000, 0))
        .unwrap_err();
    assert_eq!(err.to_string(), "Amount exceeds daily limit");

    let err = ctx.balance_service.bank_balance().unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status 503");
    assert_eq!(err.status(), Some(503));
}

// ============================================================================
// Configuration and Event Log
// ============================================================================

#[test]
fn test_context_reads_settings_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{"services":{"wallet":"http://wallet.internal:9083/wallet/"},"statusPollDelayMs":250}"#,
    )
    .unwrap();

    let config = Config::load_with_env(dir.path(), |_| None).unwrap();
    assert_eq!(config.services.wallet, "http://wallet.internal:9083/wallet");
    assert_eq!(config.status_poll_delay_ms, 250);
    assert_eq!(config.services.user, "http://localhost:8082/user");
}

#[test]
fn test_failed_calls_land_in_event_log_without_personal_data() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::start().unwrap();
    backend.respond(
        "GET",
        "/user/get/%2B1-5551234",
        MockReply::json(500, r#"{"message":"User lookup unavailable"}"#),
    );
    backend.respond("GET", "/bank/get/balance", MockReply::json(401, "{}"));

    let base = backend.base_url();
    std::fs::write(
        dir.path().join("settings.json"),
        serde_json::json!({
            "services": {
                "user": format!("{}/user", base),
                "wallet": format!("{}/wallet", base),
                "bank": format!("{}/bank", base),
                "transaction": format!("{}/transaction", base),
            },
            "statusPollDelayMs": 0,
        })
        .to_string(),
    )
    .unwrap();
    FileSessionStore::new(dir.path())
        .save(&Session::new("secret-token", "+1-5551234"))
        .unwrap();

    let ctx = WalletContext::open(dir.path(), EntryPoint::Cli).unwrap();
    assert!(ctx.event_log.is_some());

    ctx.user_service.get_user_by_phone("+1-5551234").unwrap_err();
    ctx.balance_service.bank_balance().unwrap_err();
    ctx.log(LogEvent::new("dashboard_failed").with_command("dashboard"));
    drop(ctx);

    let log = LoggingService::new(dir.path(), EntryPoint::Cli, "0.1.0").unwrap();
    let failures = log.query(&LogQuery::recent(10).errors_only()).unwrap();
    assert_eq!(failures.len(), 2);

    // Newest first
    assert_eq!(failures[0].service.as_deref(), Some("bank"));
    assert_eq!(failures[0].http_status, Some(401));
    assert_eq!(failures[1].service.as_deref(), Some("user"));
    assert_eq!(failures[1].http_status, Some(500));
    assert_eq!(failures[1].error_message.as_deref(), Some("User lookup unavailable"));

    for entry in log.query(&LogQuery::recent(10)).unwrap() {
        let serialized = serde_json::to_string(&entry).unwrap();
        assert!(!serialized.contains("5551234"));
        assert!(!serialized.contains("secret-token"));
    }

    let stats = log.stats().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.services.len(), 2);
}
