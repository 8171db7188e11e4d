//! Persistent settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smartmail_core::{HttpSettings, RefreshInterval};
use url::Url;

/// Overrides the API root.
pub const ENV_API_URL: &str = "SMARTMAIL_API_URL";
/// Overrides the polling period, in milliseconds.
pub const ENV_REFRESH_INTERVAL: &str = "SMARTMAIL_REFRESH_INTERVAL_MS";

/// Errors loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for [`Settings`].
    #[error("Malformed settings file {path}: {source}")]
    Malformed {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// An environment override could not be parsed.
    #[error("Invalid value for {name}: {reason}")]
    InvalidOverride {
        /// Variable name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Application settings that persist across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// API root, e.g. `http://localhost:8000/api`.
    pub api_base_url: Url,
    /// Polling period for today's emails.
    #[serde(rename = "refresh_interval_ms")]
    pub refresh_interval: RefreshInterval,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Page address the client starts at.
    pub location: Url,
}

impl Default for Settings {
    #[allow(clippy::expect_used)] // Literal URLs are always valid
    fn default() -> Self {
        Self {
            api_base_url: Url::parse("http://localhost:8000/api").expect("valid default API URL"),
            refresh_interval: RefreshInterval::DEFAULT,
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
            location: Url::parse("http://localhost:5173/").expect("valid default location"),
        }
    }
}

impl Settings {
    /// Returns the backend connection settings.
    #[must_use]
    pub fn http(&self) -> HttpSettings {
        HttpSettings {
            base_url: self.api_base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is present but invalid.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_API_URL) {
            self.api_base_url = Url::parse(value.trim()).map_err(|e| {
                ConfigError::InvalidOverride {
                    name: ENV_API_URL,
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(value) = lookup(ENV_REFRESH_INTERVAL) {
            let invalid = |reason: String| ConfigError::InvalidOverride {
                name: ENV_REFRESH_INTERVAL,
                reason,
            };
            let ms = value.trim().parse::<u64>().map_err(|e| invalid(e.to_string()))?;
            self.refresh_interval =
                RefreshInterval::from_millis(ms).map_err(|e| invalid(e.to_string()))?;
        }

        Ok(())
    }
}

/// Returns `<config_dir>/smartmail/settings.json`.
#[must_use]
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("smartmail")
        .join("settings.json")
}

/// Loads settings from `path`. A missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed.
pub async fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        tracing::debug!("No settings file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&contents).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Saves settings to `path`, creating its directory.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn save_settings(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    let io = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await.map_err(io)?;
    }

    let contents = serde_json::to_string_pretty(settings).map_err(|source| {
        ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tokio::fs::write(path, contents).await.map_err(io)?;

    tracing::info!("Settings saved to {:?}", path);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("smartmail-test-{}-{name}", std::process::id()))
            .join("settings.json")
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url.as_str(), "http://localhost:8000/api");
        assert_eq!(settings.refresh_interval.as_millis(), 300_000);
        assert_eq!(settings.location.as_str(), "http://localhost:5173/");

        let http = settings.http();
        assert_eq!(http.connect_timeout, Duration::from_secs(10));
        assert_eq!(http.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"refresh_interval_ms": 60000}"#).unwrap();
        assert_eq!(settings.refresh_interval.as_millis(), 60_000);
        assert_eq!(settings.request_timeout_secs, 60);
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(serde_json::from_str::<Settings>(r#"{"refresh_interval_ms": 0}"#).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[
                (ENV_API_URL, "https://api.example.com/api"),
                (ENV_REFRESH_INTERVAL, "60000"),
            ]))
            .unwrap();

        assert_eq!(settings.api_base_url.host_str(), Some("api.example.com"));
        assert_eq!(settings.refresh_interval.as_millis(), 60_000);
    }

    #[test]
    fn test_env_override_rejects_zero() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(env(&[(ENV_REFRESH_INTERVAL, "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidOverride {
                name: ENV_REFRESH_INTERVAL,
                ..
            }
        ));
        assert_eq!(settings.refresh_interval, RefreshInterval::DEFAULT);
    }

    #[tokio::test]
    async fn test_missing_file_is_default() {
        let settings = load_settings(&scratch_path("missing")).await.unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let path = scratch_path("save");
        let mut settings = Settings::default();
        settings.refresh_interval = RefreshInterval::from_millis(120_000).unwrap();

        save_settings(&settings, &path).await.unwrap();
        let loaded = load_settings(&path).await.unwrap();
        assert_eq!(loaded, settings);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_malformed_file() {
        let path = scratch_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_settings(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
