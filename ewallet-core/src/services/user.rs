//! User service - profile lookups

use std::sync::Arc;

use crate::adapters::http::{encode_path_segment, ApiClient};
use crate::config::ServiceName;
use crate::domain::result::{Error, Result};
use crate::domain::UserProfile;

pub struct UserService {
    client: Arc<ApiClient>,
}

impl UserService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `GET /user/get/{phone}`
    pub fn get_user_by_phone(&self, phone: &str) -> Result<UserProfile> {
        let path = format!("/get/{}", encode_path_segment(phone.trim()));
        self.client.get(ServiceName::User, &path)?.into_json()
    }

    /// Profile of the logged-in user
    pub fn current_user(&self) -> Result<UserProfile> {
        let phone = self
            .client
            .session()
            .phone()?
            .ok_or(Error::MissingToken)?;
        self.get_user_by_phone(&phone)
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

    fn service(server: &MockBackend) -> UserService {
        let store = Arc::new(MemorySessionStore::with_session(Session::new(
            "tok",
            "+91-9876543210",
        )));
        let session = Arc::new(SessionManager::new(store));
        let client = Arc::new(
            ApiClient::new(ServiceUrls::from_single_base(&server.base_url()), session, 5).unwrap(),
        );
        UserService::new(client)
    }

    #[test]
    fn test_phone_is_percent_encoded() {
        let server = MockBackend::start().unwrap();
        server.respond(
            "GET",
            "/user/get/%2B91-9876543210",
            MockReply::json(200, r#"{"username":"+91-9876543210","authorityList":[]}"#),
        );
        let users = service(&server);

        let user = users.current_user().unwrap();
        assert_eq!(user.phone(), Some("+91-9876543210"));
        assert_eq!(server.requests()[0].target, "/user/get/%2B91-9876543210");
    }

    #[test]
    fn test_unknown_user() {
        let server = MockBackend::start().unwrap();
        server.respond(
            "GET",
            "/user/get/%2B1-5550000",
            MockReply::json(404, r#"{"error":"User not found"}"#),
        );
        let users = service(&server);

        let err = users.get_user_by_phone("+1-5550000").unwrap_err();
        assert_eq!(err.to_string(), "User not found");
        assert_eq!(err.status(), Some(404));
    }
}
