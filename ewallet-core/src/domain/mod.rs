//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

pub mod currency;
pub mod forms;
mod session;
pub mod transaction;
mod user;
mod balance;
pub mod result;

pub use balance::{Balance, BalanceKind};
pub use forms::{
    Field, FieldErrors, LoginForm, PasswordRequirement, RegistrationForm, TransferForm,
    TransferRequest,
};
pub use session::Session;
pub use transaction::{
    Transaction, TransactionMethod, TransactionStatusMessage, TransactionSummary,
    TransactionType, TxnStatus,
};
pub use user::{LoginRequest, SignupRequest, UserProfile};
