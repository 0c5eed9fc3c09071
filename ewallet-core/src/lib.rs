//! eWallet Core - client library for the eWallet services
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: Core entities (Session, Transaction, forms and validation)
//! - **ports**: Trait definitions for external dependencies (SessionStore)
//! - **services**: Business logic orchestration (auth, balances, transfers)
//! - **adapters**: Concrete implementations (HTTP client, session files)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod log_migrations;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use adapters::file_session::FileSessionStore;
use adapters::http::ApiClient;
use config::Config;
use ports::SessionStore;
use services::*;

// Re-export commonly used types at crate root
pub use domain::{Session, Transaction, TransactionMethod, UserProfile};
pub use domain::result::{Error, OperationResult};

/// Main context for eWallet operations
///
/// Holds the configuration, the shared HTTP client and every service.
pub struct WalletContext {
    pub config: Config,
    /// `None` when the log database could not be opened
    pub event_log: Option<Arc<LoggingService>>,
    pub session: Arc<SessionManager>,
    pub client: Arc<ApiClient>,
    pub auth_service: AuthService,
    pub user_service: Arc<UserService>,
    pub balance_service: Arc<BalanceService>,
    pub transaction_service: Arc<TransactionService>,
    pub dashboard_service: DashboardService,
    pub status_service: StatusService,
}

impl WalletContext {
    /// Create a context that keeps the session in `<ewallet_dir>/session.json`
    pub fn new(ewallet_dir: &Path) -> Result<Self> {
        Self::open(ewallet_dir, EntryPoint::Library)
    }

    /// Like [`WalletContext::new`], logging events to `<ewallet_dir>/logs.duckdb`
    /// under `entry_point`
    pub fn open(ewallet_dir: &Path, entry_point: EntryPoint) -> Result<Self> {
        let config = Config::load(ewallet_dir)?;
        let store = Arc::new(FileSessionStore::new(ewallet_dir));
        // A broken log database must not stop the wallet from working
        let event_log = LoggingService::new(ewallet_dir, entry_point, env!("CARGO_PKG_VERSION"))
            .ok()
            .map(Arc::new);
        Self::build(config, store, event_log)
    }

    /// Create a context over any session store, without an event log
    pub fn with_store(config: Config, store: Arc<dyn SessionStore>) -> Result<Self> {
        Self::build(config, store, None)
    }

    fn build(
        config: Config,
        store: Arc<dyn SessionStore>,
        event_log: Option<Arc<LoggingService>>,
    ) -> Result<Self> {
        let session = Arc::new(SessionManager::new(store));
        let mut client = ApiClient::new(
            config.services.clone(),
            Arc::clone(&session),
            config.request_timeout_secs,
        )?;
        if let Some(log) = &event_log {
            client = client.with_event_log(Arc::clone(log));
        }
        let client = Arc::new(client);

        let auth_service = AuthService::new(Arc::clone(&client));
        let user_service = Arc::new(UserService::new(Arc::clone(&client)));
        let balance_service = Arc::new(BalanceService::new(Arc::clone(&client)));
        let transaction_service = Arc::new(TransactionService::new(
            Arc::clone(&client),
            Duration::from_millis(config.status_poll_delay_ms),
        ));
        let dashboard_service = DashboardService::new(
            Arc::clone(&user_service),
            Arc::clone(&balance_service),
            Arc::clone(&transaction_service),
        );
        let status_service = StatusService::new(Arc::clone(&session), config.services.clone());

        Ok(Self {
            config,
            event_log,
            session,
            client,
            auth_service,
            user_service,
            balance_service,
            transaction_service,
            dashboard_service,
            status_service,
        })
    }

    /// Record an event; failures to write are ignored
    pub fn log(&self, event: LogEvent) {
        if let Some(log) = &self.event_log {
            let _ = log.log(event);
        }
    }
}
