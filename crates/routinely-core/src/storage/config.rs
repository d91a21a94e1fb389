//! TOML-based application configuration.
//!
//! Stores:
//! - Service endpoints (auth/reset and routine catalog)
//! - Request timeout
//! - Viewport breakpoint and the width the shell starts with
//!
//! Configuration is stored at `~/.config/routinely/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::router::MOBILE_BREAKPOINT;

/// External service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Single endpoint for login, register and password reset.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Routine catalog endpoint. Unset means the built-in list is used.
    #[serde(default)]
    pub catalog_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Viewport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Widths above this show the unsupported-device screen.
    #[serde(default = "default_mobile_breakpoint")]
    pub mobile_breakpoint: u32,
    /// Width the interactive shell starts with.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/routinely/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_auth_url() -> String {
    "https://functions.poehali.dev/df7d3648-ba87-40bc-9323-204a68311ac3".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_mobile_breakpoint() -> u32 {
    MOBILE_BREAKPOINT
}
fn default_viewport_width() -> u32 {
    390
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            catalog_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: default_mobile_breakpoint(),
            viewport_width: default_viewport_width(),
        }
    }
}

impl ApiConfig {
    /// Parsed auth endpoint.
    pub fn auth_endpoint(&self) -> Result<url::Url, ConfigError> {
        parse_endpoint("api.auth_url", &self.auth_url)
    }

    /// Parsed catalog endpoint, if one is configured.
    pub fn catalog_endpoint(&self) -> Result<Option<url::Url>, ConfigError> {
        match self.catalog_url.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_endpoint("api.catalog_url", raw).map(Some),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn parse_endpoint(key: &str, raw: &str) -> Result<url::Url, ConfigError> {
    let url = url::Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("unsupported scheme '{other}'"),
        }),
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
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err("config key is empty".into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| format!("unknown config key: {key}"))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| format!("unknown config key: {key}"))?;

                let new_value = match existing {
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| format!("cannot parse '{value}' as number"))?,
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse::<bool>()?),
                    // Optional strings serialize as null when unset.
                    serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
        }

        Err(format!("unknown config key: {key}").into())
    }

    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some(String::new()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.apply(key, value)?;
        self.save()?;
        Ok(())
    }

    /// Update a value in memory without touching disk.
    fn apply(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.api.auth_endpoint()?;
        updated.api.catalog_endpoint()?;
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.display.mobile_breakpoint, 768);
        assert_eq!(parsed.api.timeout_secs, 10);
        assert!(parsed.api.catalog_url.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[api]\ncatalog_url = \"https://example.com/habits\"\n").unwrap();
        assert_eq!(parsed.api.auth_url, default_auth_url());
        assert_eq!(parsed.display.viewport_width, 390);
        assert_eq!(
            parsed.api.catalog_endpoint().unwrap().unwrap().as_str(),
            "https://example.com/habits"
        );
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("display.mobile_breakpoint").as_deref(), Some("768"));
        assert_eq!(cfg.get("api.catalog_url").as_deref(), Some(""));
        assert!(cfg.get("display.missing_key").is_none());
    }

    #[test]
    fn apply_updates_number_and_optional_string() {
        let mut cfg = Config::default();
        cfg.apply("api.timeout_secs", "30").unwrap();
        cfg.apply("api.catalog_url", "http://localhost:8080/habits").unwrap();
        assert_eq!(cfg.api.timeout_secs, 30);
        assert_eq!(
            cfg.api.catalog_url.as_deref(),
            Some("http://localhost:8080/habits")
        );
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.apply("api.nonexistent_key", "value").is_err());
    }

    #[test]
    fn apply_rejects_invalid_number() {
        let mut cfg = Config::default();
        assert!(cfg.apply("display.mobile_breakpoint", "wide").is_err());
        assert_eq!(cfg.display.mobile_breakpoint, 768);
    }

    #[test]
    fn apply_rejects_non_http_endpoint() {
        let mut cfg = Config::default();
        assert!(cfg.apply("api.auth_url", "ftp://example.com").is_err());
        assert!(cfg.apply("api.auth_url", "not a url").is_err());
        assert_eq!(cfg.api.auth_url, default_auth_url());
    }

    #[test]
    fn timeout_is_never_zero() {
        let mut cfg = Config::default();
        cfg.api.timeout_secs = 0;
        assert_eq!(cfg.api.timeout(), Duration::from_secs(1));
    }
}
