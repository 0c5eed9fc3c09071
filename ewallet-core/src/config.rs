//! Configuration management
//!
//! Settings live in `<ewallet_dir>/settings.json`:
//! ```json
//! {
//!   "services": {
//!     "user": "http://localhost:8082/user",
//!     "wallet": "http://localhost:8083/wallet",
//!     "bank": "http://localhost:8085/bank",
//!     "transaction": "http://localhost:8081/transaction"
//!   },
//!   "requestTimeoutSecs": 30,
//!   "statusPollDelayMs": 1000
//! }
//! ```
//! Fields the CLI does not manage are preserved on save.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const SETTINGS_FILENAME: &str = "settings.json";

pub const DEFAULT_USER_URL: &str = "http://localhost:8082/user";
pub const DEFAULT_WALLET_URL: &str = "http://localhost:8083/wallet";
pub const DEFAULT_BANK_URL: &str = "http://localhost:8085/bank";
pub const DEFAULT_TRANSACTION_URL: &str = "http://localhost:8081/transaction";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STATUS_POLL_DELAY_MS: u64 = 1000;

/// One of the four backend services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceName {
    User,
    Wallet,
    Bank,
    Transaction,
}

impl ServiceName {
    pub const ALL: [ServiceName; 4] = [
        ServiceName::User,
        ServiceName::Wallet,
        ServiceName::Bank,
        ServiceName::Transaction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::User => "user",
            ServiceName::Wallet => "wallet",
            ServiceName::Bank => "bank",
            ServiceName::Transaction => "transaction",
        }
    }

    /// Environment variable overriding this service's base URL
    pub fn env_var(&self) -> &'static str {
        match self {
            ServiceName::User => "EWALLET_USER_URL",
            ServiceName::Wallet => "EWALLET_WALLET_URL",
            ServiceName::Bank => "EWALLET_BANK_URL",
            ServiceName::Transaction => "EWALLET_TRANSACTION_URL",
        }
    }

    fn default_url(&self) -> &'static str {
        match self {
            ServiceName::User => DEFAULT_USER_URL,
            ServiceName::Wallet => DEFAULT_WALLET_URL,
            ServiceName::Bank => DEFAULT_BANK_URL,
            ServiceName::Transaction => DEFAULT_TRANSACTION_URL,
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(ServiceName::User),
            "wallet" => Ok(ServiceName::Wallet),
            "bank" => Ok(ServiceName::Bank),
            "transaction" | "transactions" => Ok(ServiceName::Transaction),
            other => Err(format!(
                "Unknown service '{}'. Expected one of: user, wallet, bank, transaction",
                other
            )),
        }
    }
}

/// Base URLs of the four services, without trailing slashes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrls {
    pub user: String,
    pub wallet: String,
    pub bank: String,
    pub transaction: String,
}

impl Default for ServiceUrls {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER_URL.to_string(),
            wallet: DEFAULT_WALLET_URL.to_string(),
            bank: DEFAULT_BANK_URL.to_string(),
            transaction: DEFAULT_TRANSACTION_URL.to_string(),
        }
    }
}

impl ServiceUrls {
    /// Point every service at one host, under `/user`, `/wallet`, ...
    pub fn from_single_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            user: format!("{}/user", base),
            wallet: format!("{}/wallet", base),
            bank: format!("{}/bank", base),
            transaction: format!("{}/transaction", base),
        }
    }

    pub fn get(&self, service: ServiceName) -> &str {
        match service {
            ServiceName::User => &self.user,
            ServiceName::Wallet => &self.wallet,
            ServiceName::Bank => &self.bank,
            ServiceName::Transaction => &self.transaction,
        }
    }

    pub fn set(&mut self, service: ServiceName, url: String) {
        match service {
            ServiceName::User => self.user = url,
            ServiceName::Wallet => self.wallet = url,
            ServiceName::Bank => self.bank = url,
            ServiceName::Transaction => self.transaction = url,
        }
    }
}

/// Validate a service base URL and strip trailing slashes
pub fn normalize_service_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).with_context(|| format!("Invalid URL '{}'", raw))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!("Unsupported URL scheme '{}' in '{}'", other, raw),
    }
    if parsed.host_str().is_none() {
        anyhow::bail!("URL '{}' has no host", raw);
    }

    Ok(trimmed.to_string())
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    services: ServicesSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_poll_delay_ms: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ServicesSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wallet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transaction: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

impl ServicesSettings {
    fn get(&self, service: ServiceName) -> Option<&str> {
        match service {
            ServiceName::User => self.user.as_deref(),
            ServiceName::Wallet => self.wallet.as_deref(),
            ServiceName::Bank => self.bank.as_deref(),
            ServiceName::Transaction => self.transaction.as_deref(),
        }
    }

    fn set(&mut self, service: ServiceName, url: String) {
        let slot = match service {
            ServiceName::User => &mut self.user,
            ServiceName::Wallet => &mut self.wallet,
            ServiceName::Bank => &mut self.bank,
            ServiceName::Transaction => &mut self.transaction,
        };
        *slot = Some(url);
    }
}

/// eWallet client configuration (resolved view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub services: ServiceUrls,
    pub request_timeout_secs: u64,
    pub status_poll_delay_ms: u64,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            services: ServiceUrls::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            status_poll_delay_ms: DEFAULT_STATUS_POLL_DELAY_MS,
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the ewallet directory
    ///
    /// Service URLs resolve in order: `EWALLET_*_URL` environment variable,
    /// settings file, built-in default.
    pub fn load(ewallet_dir: &Path) -> Result<Self> {
        Self::load_with_env(ewallet_dir, |key| std::env::var(key).ok())
    }

    /// Load config with an explicit environment lookup
    pub fn load_with_env<F>(ewallet_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings_path = ewallet_dir.join(SETTINGS_FILENAME);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let mut services = ServiceUrls::default();
        for service in ServiceName::ALL {
            let from_env = env(service.env_var()).filter(|v| !v.trim().is_empty());
            let configured = from_env
                .as_deref()
                .or_else(|| raw.services.get(service))
                .unwrap_or_else(|| service.default_url());
            let url = normalize_service_url(configured)
                .with_context(|| format!("Invalid {} service URL", service))?;
            services.set(service, url);
        }

        let request_timeout_secs = raw
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let status_poll_delay_ms = raw
            .status_poll_delay_ms
            .unwrap_or(DEFAULT_STATUS_POLL_DELAY_MS);

        Ok(Self {
            services,
            request_timeout_secs,
            status_poll_delay_ms,
            _raw_settings: raw,
        })
    }

    /// Save config to the ewallet directory
    /// Preserves other settings that the CLI doesn't manage
    pub fn save(&self, ewallet_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(ewallet_dir)?;
        let settings_path = ewallet_dir.join(SETTINGS_FILENAME);

        // Load existing settings to preserve fields we don't manage
        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        // Only persist URLs that differ from the defaults
        for service in ServiceName::ALL {
            let url = self.services.get(service);
            if url != service.default_url() || settings.services.get(service).is_some() {
                settings.services.set(service, url.to_string());
            }
        }
        if self.request_timeout_secs != DEFAULT_REQUEST_TIMEOUT_SECS {
            settings.request_timeout_secs = Some(self.request_timeout_secs);
        }
        if self.status_poll_delay_ms != DEFAULT_STATUS_POLL_DELAY_MS {
            settings.status_poll_delay_ms = Some(self.status_poll_delay_ms);
        }

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Change one service URL after validating it
    pub fn set_service_url(&mut self, service: ServiceName, url: &str) -> Result<()> {
        let url = normalize_service_url(url)?;
        self.services.set(service, url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_with_env(dir.path(), no_env).unwrap();
        assert_eq!(config.services, ServiceUrls::default());
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.status_poll_delay_ms, 1000);
    }

    #[test]
    fn test_env_overrides_settings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILENAME),
            r#"{"services":{"bank":"http://bank.internal:9000/bank/"},"requestTimeoutSecs":5}"#,
        )
        .unwrap();

        let config = Config::load_with_env(dir.path(), |key| {
            (key == "EWALLET_USER_URL").then(|| "https://users.example.com/user".to_string())
        })
        .unwrap();

        assert_eq!(config.services.user, "https://users.example.com/user");
        assert_eq!(config.services.bank, "http://bank.internal:9000/bank");
        assert_eq!(config.services.wallet, DEFAULT_WALLET_URL);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(normalize_service_url("ftp://example.com/user").is_err());
        assert!(normalize_service_url("not a url").is_err());
        assert_eq!(
            normalize_service_url(" http://localhost:8082/user/ ").unwrap(),
            "http://localhost:8082/user"
        );
    }

    #[test]
    fn test_save_preserves_unknown_fields() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILENAME),
            r#"{"theme":"dark","services":{"extra":"keep"}}"#,
        )
        .unwrap();

        let mut config = Config::load_with_env(dir.path(), no_env).unwrap();
        config
            .set_service_url(ServiceName::Transaction, "http://tx:8081/transaction")
            .unwrap();
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(SETTINGS_FILENAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["services"]["extra"], "keep");
        assert_eq!(saved["services"]["transaction"], "http://tx:8081/transaction");
        assert!(saved["services"].get("user").is_none());

        let reloaded = Config::load_with_env(dir.path(), no_env).unwrap();
        assert_eq!(reloaded.services.transaction, "http://tx:8081/transaction");
    }

    #[test]
    fn test_single_base() {
        let urls = ServiceUrls::from_single_base("http://127.0.0.1:9000/");
        assert_eq!(urls.get(ServiceName::Bank), "http://127.0.0.1:9000/bank");
    }
}
