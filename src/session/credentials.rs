use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where the bearer token lives between runs.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str) -> Result<()>;
    fn delete(&self) -> Result<()>;
}

/// Attributes of the `Authorization` cookie the web console sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub name: String,
    pub path: String,
    pub secure: bool,
    pub same_site: String,
    pub ttl: Duration,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            name: "Authorization".to_string(),
            path: "/".to_string(),
            secure: true,
            same_site: "Strict".to_string(),
            ttl: Duration::hours(24),
        }
    }
}

impl CookiePolicy {
    /// Expiry of a token issued at `issued`. Saturates at the latest
    /// representable instant instead of overflowing.
    pub fn expires_at(&self, issued: DateTime<Utc>) -> DateTime<Utc> {
        issued
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// `Set-Cookie` value carrying `token` with this policy.
    pub fn header_value(&self, token: &str) -> String {
        let mut value = format!(
            "{}={}; Path={}; Max-Age={}",
            self.name,
            token,
            self.path,
            self.ttl.num_seconds()
        );
        if self.secure {
            value.push_str("; Secure");
        }
        value.push_str("; SameSite=");
        value.push_str(&self.same_site);
        value
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn set(&self, token: &str) -> Result<()> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token.to_string());
        }
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = None;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    expires_at: String,
    path: String,
    secure: bool,
    same_site: String,
}

impl StoredToken {
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.expires_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Token kept in a JSON file next to its cookie attributes. Expired or
/// unreadable files read as "no token".
pub struct FileCredentialStore {
    path: PathBuf,
    policy: CookiePolicy,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>, policy: CookiePolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Option<StoredToken> {
        let data = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&data) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring unreadable credential file: {}", e);
                None
            }
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        let record = self.load()?;
        match record.expires_at() {
            Some(exp) if exp > Utc::now() => Some(record.token),
            _ => {
                tracing::info!("stored token expired");
                if let Err(e) = self.delete() {
                    tracing::warn!(path = %self.path.display(), "failed to delete expired token: {}", e);
                }
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let record = StoredToken {
            token: token.to_string(),
            expires_at: self.policy.expires_at(Utc::now()).to_rfc3339(),
            path: self.policy.path.clone(),
            secure: self.policy.secure,
            same_site: self.policy.same_site.clone(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&record)?)?;
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
