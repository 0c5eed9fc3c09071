//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod auth;
mod balance;
mod dashboard;
pub mod logging;
mod session;
mod status;
mod transaction;
mod user;

pub use auth::AuthService;
pub use balance::BalanceService;
pub use dashboard::{DashboardService, DashboardSnapshot, History};
pub use logging::{
    EntryPoint, LogEntry, LogEvent, LogQuery, LogStats, LoggingService, ServiceFailures,
};
pub use session::SessionManager;
pub use status::{ServiceEndpoint, StatusService, StatusSummary};
pub use transaction::{TransactionService, TransferOutcome};
pub use user::UserService;
