//! TOML-based client configuration.
//!
//! Stores:
//! - Server base URL and session token
//! - Calendar refresh period
//! - Search page size
//!
//! Configuration is stored at `~/.config/daytick/config.toml`.
//! `DAYTICK_BASE_URL` and `DAYTICK_SESSION_TOKEN` override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::data_dir;
use crate::error::{ConfigError, ValidationError};

pub const BASE_URL_ENV: &str = "DAYTICK_BASE_URL";
pub const SESSION_TOKEN_ENV: &str = "DAYTICK_SESSION_TOKEN";

/// Where the task server lives and how to authenticate with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Value of the `session_token` cookie issued at login.
    #[serde(default)]
    pub session_token: Option<String>,
}

/// Calendar view configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Seconds between "today" recomputations.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

/// Search table configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

/// Client configuration.
///
/// Serialized to/from TOML at `~/.config/daytick/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_base_url() -> String {
    "http://localhost:3000".into()
}
fn default_refresh_secs() -> u64 {
    60
}
fn default_page_size() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_token: None,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: Option<&str>,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parents) = parents {
            for part in parents.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match (existing, value) {
            (_, None) => serde_json::Value::Null,
            (serde_json::Value::Bool(_), Some(v)) => serde_json::Value::Bool(
                v.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            (serde_json::Value::Number(_), Some(v)) => serde_json::Value::Number(
                v.parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{v}' as number")))?
                    .into(),
            ),
            (serde_json::Value::Object(_), Some(_)) => return Err(unknown()),
            (_, Some(v)) => serde_json::Value::String(v.to_string()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Default config file location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file; writing defaults");
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load and apply environment overrides; what the CLI actually runs with.
    pub fn effective() -> Result<Self, ConfigError> {
        let mut cfg = Self::load()?;
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.base_url = url;
        }
        if let Some(token) = lookup(SESSION_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.session_token = Some(token);
        }
    }

    /// Reject values the client cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        url::Url::parse(&self.server.base_url)
            .map_err(|e| invalid("server.base_url", e.to_string()))?;
        if let Some(ref token) = self.server.session_token {
            validate_session_token(token)
                .map_err(|e| invalid("server.session_token", e.to_string()))?;
        }
        if self.calendar.refresh_secs == 0 {
            return Err(invalid("calendar.refresh_secs", "must be at least 1".into()));
        }
        if self.search.page_size == 0 {
            return Err(invalid("search.page_size", "must be at least 1".into()));
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key. Unset optional
    /// values read as an empty string.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::Null => Some(String::new()),
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. `None` clears an optional value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is rejected.
    pub fn set(&mut self, key: &str, value: Option<&str>) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.calendar.refresh_secs)
    }
}

/// Session tokens issued by the server are UUIDs.
pub fn validate_session_token(token: &str) -> Result<(), ValidationError> {
    uuid::Uuid::parse_str(token.trim())
        .map(|_| ())
        .map_err(|e| ValidationError::InvalidSessionToken(e.to_string()))
}
