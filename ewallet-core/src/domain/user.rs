//! User domain model

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A user as returned by `GET /user/get/{phone}`
///
/// The user service currently answers with `{username, authorityList}`;
/// the profile fields are filled in when the service sends them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub authority_list: Vec<JsonValue>,
}

impl UserProfile {
    /// Phone number, falling back to the login username
    pub fn phone(&self) -> Option<&str> {
        self.phone_number
            .as_deref()
            .or(self.username.as_deref())
    }

    /// Best name to greet the user with
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.phone())
            .unwrap_or("Unknown user")
    }

    /// Authority names; Spring sends either strings or `{authority: ...}`
    pub fn authorities(&self) -> Vec<String> {
        self.authority_list
            .iter()
            .filter_map(|a| match a {
                JsonValue::String(s) => Some(s.clone()),
                JsonValue::Object(map) => map
                    .get("authority")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn is_admin(&self) -> bool {
        self.authorities()
            .iter()
            .any(|a| a.to_uppercase().contains("ADMIN"))
    }
}

/// Body of `POST /user/signup`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

/// Body of `POST /user/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_user_shape() {
        let user: UserProfile = serde_json::from_str(
            r#"{"username":"+91-9876543210","password":"$2a$10$hash","authorityList":[{"authority":"USER"}]}"#,
        )
        .unwrap();
        assert_eq!(user.phone(), Some("+91-9876543210"));
        assert_eq!(user.display_name(), "+91-9876543210");
        assert_eq!(user.authorities(), vec!["USER".to_string()]);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_profile_shape() {
        let user: UserProfile = serde_json::from_str(
            r#"{"name":"Jane Smith","email":"jane@example.com","phoneNumber":"+1-5551234567","authorityList":["ROLE_ADMIN"]}"#,
        )
        .unwrap();
        assert_eq!(user.display_name(), "Jane Smith");
        assert!(user.is_admin());
    }
}
