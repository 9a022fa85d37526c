use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConsoleError, Result};
use crate::session::CookiePolicy;

pub const API_URL_ENV: &str = "CONSOLE_API_URL";

/// Longest accepted session lifetime: one year.
pub const MAX_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub credential_path: PathBuf,
    pub ttl_hours: i64,
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            credential_path: PathBuf::from("data/session.json"),
            ttl_hours: 24,
            cookie_name: "Authorization".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy {
            name: self.cookie_name.clone(),
            ttl: chrono::Duration::hours(self.ttl_hours.clamp(1, MAX_TTL_HOURS)),
            ..CookiePolicy::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Reads the first config file found in the working directory, then
    /// applies environment overrides. Without a file the defaults are used.
    pub fn load() -> Result<Self> {
        let mut settings = match Self::find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::info!("no config file found, using defaults");
                Settings::default()
            }
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            settings.apply_api_url(&url);
        }
        settings.normalize()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_toml(&content)
            .map_err(|e| ConsoleError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut settings: Settings =
            toml::from_str(content).map_err(|e| ConsoleError::Config(e.to_string()))?;
        settings.normalize()?;
        Ok(settings)
    }

    fn apply_api_url(&mut self, url: &str) {
        if !url.trim().is_empty() {
            self.api.base_url = url.trim().to_string();
        }
    }

    fn normalize(&mut self) -> Result<()> {
        self.api.base_url = self.api.base_url.trim().trim_end_matches('/').to_string();
        if self.api.base_url.is_empty() {
            return Err(ConsoleError::Config("api.base_url must not be empty".into()));
        }
        if reqwest::Url::parse(&self.api.base_url).is_err() {
            return Err(ConsoleError::Config(format!(
                "api.base_url is not a valid URL: {}",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == Some(0) {
            self.api.timeout_secs = None;
        }
        if self.session.ttl_hours <= 0 {
            return Err(ConsoleError::Config("session.ttl_hours must be positive".into()));
        }
        if self.session.ttl_hours > MAX_TTL_HOURS {
            return Err(ConsoleError::Config(format!(
                "session.ttl_hours must be at most {}, got {}",
                MAX_TTL_HOURS, self.session.ttl_hours
            )));
        }
        Ok(())
    }

    fn find_config_file() -> Option<PathBuf> {
        ["custom-config.toml", "config.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }
}
