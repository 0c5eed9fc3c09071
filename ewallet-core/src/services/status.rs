//! Status service - who is logged in and where the services live

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{ServiceName, ServiceUrls};
use crate::domain::currency::currency_for_phone;

use super::session::SessionManager;

/// Status service for `ew status`
pub struct StatusService {
    session: Arc<SessionManager>,
    urls: ServiceUrls,
}

impl StatusService {
    pub fn new(session: Arc<SessionManager>, urls: ServiceUrls) -> Self {
        Self { session, urls }
    }

    /// Local status; makes no network calls
    pub fn get_status(&self) -> Result<StatusSummary> {
        let session = self.session.current()?;
        let now = Utc::now();

        let services = ServiceName::ALL
            .iter()
            .map(|s| ServiceEndpoint {
                name: s.as_str().to_string(),
                url: self.urls.get(*s).to_string(),
            })
            .collect();

        Ok(match session {
            Some(session) => StatusSummary {
                logged_in: true,
                currency: Some(currency_for_phone(&session.phone).to_string()),
                expires_at: session.expires_at(),
                token_expired: session.is_expired_at(now),
                phone: Some(session.phone),
                session_store: self.session.store_name().to_string(),
                services,
            },
            None => StatusSummary {
                logged_in: false,
                phone: None,
                currency: None,
                expires_at: None,
                token_expired: false,
                session_store: self.session.store_name().to_string(),
                services,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub logged_in: bool,
    pub phone: Option<String>,
    pub currency: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub token_expired: bool,
    pub session_store: String,
    pub services: Vec<ServiceEndpoint>,
}

#[derive(Debug, Serialize)]
pub struct ServiceEndpoint {
    pub name: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_session::MemorySessionStore;
    use crate::domain::Session;

    #[test]
    fn test_logged_out() {
        let session = Arc::new(SessionManager::new(Arc::new(MemorySessionStore::new())));
        let status = StatusService::new(session, ServiceUrls::default())
            .get_status()
            .unwrap();
        assert!(!status.logged_in);
        assert_eq!(status.services.len(), 4);
        assert_eq!(status.services[0].url, "http://localhost:8082/user");
    }

    #[test]
    fn test_logged_in_with_opaque_token() {
        let store = MemorySessionStore::with_session(Session::new("opaque", "+44-7700900123"));
        let session = Arc::new(SessionManager::new(Arc::new(store)));
        let status = StatusService::new(session, ServiceUrls::default())
            .get_status()
            .unwrap();
        assert!(status.logged_in);
        assert_eq!(status.currency.as_deref(), Some("GBP"));
        assert!(status.expires_at.is_none());
        assert!(!status.token_expired);
        assert_eq!(status.session_store, "memory");
    }
}
