//! Session service
//!
//! Keeps the current session in memory and mirrors it into a [`SessionStore`]
//! so the next CLI invocation picks it up.

use std::sync::{Arc, RwLock};

use crate::domain::result::{Error, Result};
use crate::domain::Session;
use crate::ports::SessionStore;

/// Session manager shared by the HTTP client and the services
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<Session>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    /// Name of the backing store
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Current session, from memory first and then from storage
    pub fn current(&self) -> Result<Option<Session>> {
        {
            let guard = self
                .current
                .read()
                .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
            if guard.is_some() {
                return Ok(guard.clone());
            }
        }

        let stored = self.store.load()?;
        if let Some(session) = &stored {
            let mut guard = self
                .current
                .write()
                .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
            *guard = Some(session.clone());
        }
        Ok(stored)
    }

    /// Bearer token, if logged in
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.current()?.map(|s| s.token))
    }

    /// Phone of the logged-in user
    pub fn phone(&self) -> Result<Option<String>> {
        Ok(self.current()?.map(|s| s.phone))
    }

    pub fn is_logged_in(&self) -> Result<bool> {
        Ok(self.current()?.is_some())
    }

    /// Persist and remember a new session
    pub fn start(&self, session: Session) -> Result<()> {
        self.store.save(&session)?;
        let mut guard = self
            .current
            .write()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        *guard = Some(session);
        Ok(())
    }

    /// Forget the session in memory and in storage
    pub fn clear(&self) -> Result<()> {
        {
            let mut guard = self
                .current
                .write()
                .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
            *guard = None;
        }
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_session::MemorySessionStore;

    #[test]
    fn test_loads_from_store_when_memory_empty() {
        let store = Arc::new(MemorySessionStore::new());
        store.save(&Session::new("tok", "+1-5551234")).unwrap();

        let manager = SessionManager::new(store);
        assert_eq!(manager.token().unwrap().as_deref(), Some("tok"));
        assert_eq!(manager.phone().unwrap().as_deref(), Some("+1-5551234"));
    }

    #[test]
    fn test_start_and_clear() {
        let store = Arc::new(MemorySessionStore::new());
        let manager = SessionManager::new(store.clone());

        manager.start(Session::new("tok", "+44-7700900")).unwrap();
        assert!(manager.is_logged_in().unwrap());
        assert!(store.load().unwrap().is_some());

        manager.clear().unwrap();
        assert!(!manager.is_logged_in().unwrap());
        assert!(store.load().unwrap().is_none());
    }
}
