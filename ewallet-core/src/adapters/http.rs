//! HTTP client for the eWallet services
//!
//! Every backend call goes through [`ApiClient::request`], which attaches the
//! bearer token, turns non-2xx replies into errors and keeps the status the
//! CLI shows (whether a request is in flight, the last failure). Failures are
//! also written to the event log when one is attached.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::config::{ServiceName, ServiceUrls};
use crate::domain::result::{Error, Result};
use crate::services::{LogEvent, LoggingService, SessionManager};

/// Successful reply body
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(JsonValue),
    Text(String),
}

impl ApiResponse {
    /// Deserialize a JSON reply, or a text reply that holds JSON
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        let value = match self {
            ApiResponse::Json(value) => value,
            ApiResponse::Text(text) => serde_json::from_str(&text)
                .map_err(|e| Error::invalid_response(format!("expected JSON: {}", e)))?,
        };
        serde_json::from_value(value).map_err(|e| Error::invalid_response(e.to_string()))
    }

    /// Reply as display text; JSON strings lose their quotes
    pub fn into_text(self) -> String {
        match self {
            ApiResponse::Text(text) => text,
            ApiResponse::Json(JsonValue::String(s)) => s,
            ApiResponse::Json(JsonValue::Null) => String::new(),
            ApiResponse::Json(value) => value.to_string(),
        }
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Text(_) => None,
        }
    }
}

/// Percent-encode a value for use as one URL path segment
pub fn encode_path_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Decrements the in-flight counter when a request finishes, however it ends
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Blocking client shared by all services
pub struct ApiClient {
    client: Client,
    urls: ServiceUrls,
    session: Arc<SessionManager>,
    timeout_secs: u64,
    in_flight: AtomicUsize,
    last_error: Mutex<Option<String>>,
    event_log: Option<Arc<LoggingService>>,
}

impl ApiClient {
    pub fn new(urls: ServiceUrls, session: Arc<SessionManager>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            urls,
            session,
            timeout_secs,
            in_flight: AtomicUsize::new(0),
            last_error: Mutex::new(None),
            event_log: None,
        })
    }

    /// Record failed requests in `log`
    pub fn with_event_log(mut self, log: Arc<LoggingService>) -> Self {
        self.event_log = Some(log);
        self
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn urls(&self) -> &ServiceUrls {
        &self.urls
    }

    /// True while any request is outstanding
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Message of the most recent failed request
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn clear_error(&self) {
        self.set_last_error(None);
    }

    fn set_last_error(&self, message: Option<String>) {
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = message;
        }
    }

    /// Logging failures never fail the request
    fn record(&self, event: LogEvent) {
        if let Some(log) = &self.event_log {
            let _ = log.log(event);
        }
    }

    pub fn get(&self, service: ServiceName, path: &str) -> Result<ApiResponse> {
        self.request(service, Method::GET, path, &[], None, true)
    }

    pub fn get_with_query(
        &self,
        service: ServiceName,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        self.request(service, Method::GET, path, query, None, true)
    }

    pub fn post<B: Serialize + ?Sized>(
        &self,
        service: ServiceName,
        path: &str,
        body: &B,
        auth: bool,
    ) -> Result<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.request(service, Method::POST, path, &[], Some(body), auth)
    }

    pub fn put<B: Serialize + ?Sized>(
        &self,
        service: ServiceName,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.request(service, Method::PUT, path, &[], Some(body), true)
    }

    /// Issue one request against a service
    ///
    /// With `auth` set and no stored token this fails with
    /// [`Error::MissingToken`] before anything is sent. A 401 reply logs the
    /// user out.
    pub fn request(
        &self,
        service: ServiceName,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<JsonValue>,
        auth: bool,
    ) -> Result<ApiResponse> {
        let _in_flight = InFlight::start(&self.in_flight);
        self.clear_error();

        let result = self.send(service, method, path, query, body, auth);
        if let Err(e) = &result {
            self.set_last_error(Some(e.to_string()));
            self.record(LogEvent::request_failed(service, e));
        }
        result
    }

    fn send(
        &self,
        service: ServiceName,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<JsonValue>,
        auth: bool,
    ) -> Result<ApiResponse> {
        let token = if auth {
            Some(self.session.token()?.ok_or(Error::MissingToken)?)
        } else {
            None
        };

        let url = self.build_url(service, path, query)?;

        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = request
            .send()
            .map_err(|e| self.map_request_error(service, e))?;

        self.check_response_status(service, response)
    }

    fn build_url(&self, service: ServiceName, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let base = self.urls.get(service);
        let joined = if path.is_empty() || path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        };

        let mut url = Url::parse(&joined)
            .map_err(|e| Error::config(format!("Invalid {} URL '{}': {}", service, joined, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Map reqwest transport errors to user-friendly messages
    fn map_request_error(&self, service: ServiceName, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Network(format!(
                "Connection timed out after {} seconds",
                self.timeout_secs
            ))
        } else if error.is_connect() {
            Error::Network(format!("Unable to connect to the {} service", service))
        } else {
            Error::Network(format!("{} request failed: {}", service, error))
        }
    }

    /// Turn the reply into a body or an error
    fn check_response_status(&self, service: ServiceName, response: Response) -> Result<ApiResponse> {
        let status = response.status();

        // Expiry is reported even when the store cannot be cleared
        if status == StatusCode::UNAUTHORIZED {
            if let Err(e) = self.session.clear() {
                self.record(
                    LogEvent::new("session_clear_failed")
                        .with_service(service)
                        .with_failure(&e),
                );
            }
            return Err(Error::SessionExpired);
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        let text = response
            .text()
            .map_err(|e| Error::invalid_response(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::request(
                status.as_u16(),
                error_message(status.as_u16(), &text),
            ));
        }

        if is_json && !text.trim().is_empty() {
            let value = serde_json::from_str(&text)
                .map_err(|e| Error::invalid_response(format!("malformed JSON: {}", e)))?;
            Ok(ApiResponse::Json(value))
        } else {
            Ok(ApiResponse::Text(text))
        }
    }
}

/// Message for a failed reply: `message`, then `error`, then the status code
fn error_message(status: u16, body: &str) -> String {
    let parsed: Option<JsonValue> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    field("message")
        .or_else(|| field("error"))
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}
