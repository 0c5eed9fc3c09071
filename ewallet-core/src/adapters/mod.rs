//! Adapter implementations
//!
//! Adapters implement the port traits and talk to the outside world:
//! - Blocking reqwest client for the four backend services
//! - JSON file and in-memory stores for the SessionStore port
//! - A scripted local backend for tests (unit and integration)

pub mod file_session;
pub mod http;
pub mod memory_session;
pub mod mock_server;
