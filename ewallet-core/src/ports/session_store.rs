//! Session persistence port
//!
//! Defines where the authenticated session lives between runs. The CLI keeps
//! it in a file next to the settings; tests and embedders can keep it in memory.

use crate::domain::result::Result;
use crate::domain::Session;

/// Session storage trait
///
/// Implementations must make `save` and `clear` visible to subsequent `load`
/// calls from any thread sharing the store.
pub trait SessionStore: Send + Sync {
    /// Storage backend name (e.g., "file", "memory")
    fn name(&self) -> &str;

    /// Read the stored session, `None` when nobody is logged in
    fn load(&self) -> Result<Option<Session>>;

    /// Persist the session, replacing any previous one
    fn save(&self, session: &Session) -> Result<()>;

    /// Remove the stored session; clearing an empty store is not an error
    fn clear(&self) -> Result<()>;
}
