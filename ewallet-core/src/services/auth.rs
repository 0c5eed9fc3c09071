//! Authentication service - login, logout and account creation

use std::sync::Arc;

use crate::adapters::http::{ApiClient, ApiResponse};
use crate::config::ServiceName;
use crate::domain::result::{Error, Result};
use crate::domain::{LoginForm, LoginRequest, RegistrationForm, Session, SignupRequest};

pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Validate the form, then log in with `<code>-<digits>` as username
    ///
    /// A form that fails validation never reaches the network.
    pub fn login(&self, form: &LoginForm) -> Result<Session> {
        form.validate().map_err(Error::Validation)?;
        self.login_with_credentials(&form.username(), &form.password)
    }

    /// Log in with a ready-made username
    pub fn login_with_credentials(&self, username: &str, password: &str) -> Result<Session> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let reply = self.client.post(ServiceName::User, "/login", &body, false)?;

        let token = extract_token(&reply)
            .ok_or_else(|| Error::Login("No token received".to_string()))?;

        let session = Session::new(token, username);
        self.client.session().start(session.clone())?;
        Ok(session)
    }

    /// Forget the session locally; the backend keeps no logout state
    pub fn logout(&self) -> Result<()> {
        self.client.session().clear()
    }

    /// Validate and submit a new account, returning the server's reply text
    pub fn register(&self, form: &RegistrationForm) -> Result<String> {
        form.validate().map_err(Error::Validation)?;

        let body = SignupRequest {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone_number: form.full_phone(),
            password: form.password.clone(),
        };
        let reply = self.client.post(ServiceName::User, "/signup", &body, false)?;

        let message = reply.into_text();
        if message.trim().is_empty() {
            Ok("Account created successfully".to_string())
        } else {
            Ok(message)
        }
    }
}

fn extract_token(reply: &ApiResponse) -> Option<String> {
    reply
        .as_json()
        .and_then(|v| v.get("token"))
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_session::MemorySessionStore;
    use crate::adapters::mock_server::{MockBackend, MockReply};
    use crate::config::ServiceUrls;
    use crate::domain::Field;
    use crate::ports::SessionStore;
    use crate::services::SessionManager;

    fn service(server: &MockBackend) -> (AuthService, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        let session = Arc::new(SessionManager::new(store.clone()));
        let client = Arc::new(
            ApiClient::new(ServiceUrls::from_single_base(&server.base_url()), session, 5).unwrap(),
        );
        (AuthService::new(client), store)
    }

    #[test]
    fn test_login_stores_token_and_username() {
        let server = MockBackend::start().unwrap();
        server.respond("POST", "/user/login", MockReply::json(200, r#"{"token":"jwt-abc"}"#));
        let (auth, store) = service(&server);

        let session = auth
            .login(&LoginForm::new("+91", "9876543210", "secret1"))
            .unwrap();
        assert_eq!(session, Session::new("jwt-abc", "+91-9876543210"));
        assert_eq!(store.load().unwrap(), Some(session));

        let request = &server.requests()[0];
        assert_eq!(
            request.json_body(),
            serde_json::json!({"username": "+91-9876543210", "password": "secret1"})
        );
        assert!(request.header("authorization").is_none());
    }

    #[test]
    fn test_login_without_token() {
        let server = MockBackend::start().unwrap();
        server.respond("POST", "/user/login", MockReply::json(200, r#"{"message":"ok"}"#));
        let (auth, store) = service(&server);

        let err = auth
            .login(&LoginForm::new("+1", "5551234", "secret"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Login failed: No token received");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_login_rejected_by_server() {
        let server = MockBackend::start().unwrap();
        server.respond(
            "POST",
            "/user/login",
            MockReply::json(403, r#"{"message":"Bad credentials"}"#),
        );
        let (auth, _) = service(&server);

        let err = auth
            .login(&LoginForm::new("+1", "5551234", "wrong"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad credentials");
    }

    #[test]
    fn test_invalid_login_form_sends_nothing() {
        let server = MockBackend::start().unwrap();
        let (auth, _) = service(&server);

        let err = auth.login(&LoginForm::new("+1", "12ab", "pw")).unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert!(errors.get(Field::Phone).is_some());
                assert!(errors.get(Field::Password).is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(server.request_count(), 0);
    }

    #[test]
    fn test_register_sends_full_phone() {
        let server = MockBackend::start().unwrap();
        server.respond("POST", "/user/signup", MockReply::text(200, "User registered successfully"));
        let (auth, _) = service(&server);

        let form = RegistrationForm {
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            country_code: "+44".to_string(),
            phone_number: "7700900123".to_string(),
            password: "hunter2!".to_string(),
        };
        let message = auth.register(&form).unwrap();
        assert_eq!(message, "User registered successfully");

        assert_eq!(
            server.requests()[0].json_body(),
            serde_json::json!({
                "name": "Jane Smith",
                "email": "jane@example.com",
                "phoneNumber": "+44-7700900123",
                "password": "hunter2!"
            })
        );
    }

    #[test]
    fn test_register_reports_all_field_errors_without_network() {
        let server = MockBackend::start().unwrap();
        let (auth, _) = service(&server);

        let form = RegistrationForm {
            name: "Jo".to_string(),
            email: "bad".to_string(),
            country_code: "+1".to_string(),
            phone_number: "12345".to_string(),
            password: "123".to_string(),
        };
        match auth.register(&form).unwrap_err() {
            Error::Validation(errors) => assert_eq!(errors.len(), 4),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(server.request_count(), 0);
    }

    #[test]
    fn test_logout_clears_session() {
        let server = MockBackend::start().unwrap();
        let (auth, store) = service(&server);
        store.save(&Session::new("tok", "+1-5551234")).unwrap();

        auth.logout().unwrap();
        assert!(store.load().unwrap().is_none());
        assert_eq!(server.request_count(), 0);
    }
}
