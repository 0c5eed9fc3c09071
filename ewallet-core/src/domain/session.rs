//! Session domain model

use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session: the bearer token and the phone it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub phone: String,
}

#[derive(Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

impl Session {
    pub fn new(token: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            phone: phone.into(),
        }
    }

    /// `Authorization` header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Decode the JWT payload without verifying it
    ///
    /// Only used for display; the server remains the authority on validity.
    fn claims(&self) -> Option<Claims> {
        let payload = self.token.split('.').nth(1)?;
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Token expiry from the `exp` claim, when the token is a JWT
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims()?
            .exp
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    /// Subject claim, normally the phone number
    pub fn subject(&self) -> Option<String> {
        self.claims()?.sub
    }

    /// True when the token carries an expiry that has passed
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| exp <= now).unwrap_or(false)
    }
}
