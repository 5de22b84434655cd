//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Countdown durations per mode
//! - Doubt-solver backend (provider, model, endpoint, credential source)
//! - Completion alert behaviour
//!
//! Configuration is stored at `~/.config/physfocus/config.toml`. Sessions and
//! notes are never written here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{DurationConfig, MAX_DURATION_MIN, MIN_DURATION_MIN};

/// Countdown durations in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_duration")]
    pub focus_duration: u32,
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    #[serde(default = "default_long_break")]
    pub long_break: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatProvider {
    /// Google Generative Language API.
    Gemini,
    /// Any OpenAI-compatible `/chat/completions` endpoint.
    #[serde(alias = "openai-compatible")]
    OpenAi,
}

impl ChatProvider {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ChatProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ChatProvider::OpenAi => "https://api.openai.com/v1",
        }
    }
}

/// Doubt-solver backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_provider")]
    pub provider: ChatProvider,
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL override; the provider's public endpoint when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Inline API key. Prefer `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Number of prior turns sent with each question.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Completion alert configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Ring the terminal bell when a countdown finishes.
    #[serde(default = "default_true")]
    pub sound: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/physfocus/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

// Default functions
fn default_focus_duration() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_provider() -> ChatProvider {
    ChatProvider::Gemini
}
fn default_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_history_window() -> usize {
    5
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

const MAX_HISTORY_WINDOW: usize = 20;
const MAX_TIMEOUT_SECS: u64 = 300;

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_duration: default_focus_duration(),
            short_break: default_short_break(),
            long_break: default_long_break(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            endpoint: None,
            api_key: None,
            api_key_env: default_api_key_env(),
            history_window: default_history_window(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self { sound: true }
    }
}

impl TimerConfig {
    pub fn durations(&self) -> DurationConfig {
        DurationConfig::new(self.focus_duration, self.short_break, self.long_break)
    }
}

impl ChatConfig {
    /// Inline key first, then the configured environment variable.
    /// Blank values count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
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
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    /// Default location of `config.toml`.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load and validate a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_failed(e.to_string()))?;
        let cfg: Config = toml::from_str(&content).map_err(|e| load_failed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
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
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and re-validate. The config is
    /// left untouched when the key is unknown or the value is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
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

    /// Range and format checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("timer.focus_duration", self.timer.focus_duration),
            ("timer.short_break", self.timer.short_break),
            ("timer.long_break", self.timer.long_break),
        ];
        for (key, minutes) in durations {
            if !(MIN_DURATION_MIN..=MAX_DURATION_MIN).contains(&minutes) {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!(
                        "{minutes} is outside {MIN_DURATION_MIN}..={MAX_DURATION_MIN} minutes"
                    ),
                });
            }
        }

        if !(1..=MAX_HISTORY_WINDOW).contains(&self.chat.history_window) {
            return Err(ConfigError::InvalidValue {
                key: "chat.history_window".into(),
                message: format!("must be between 1 and {MAX_HISTORY_WINDOW}"),
            });
        }

        if !(1..=MAX_TIMEOUT_SECS).contains(&self.chat.timeout_secs) {
            return Err(ConfigError::InvalidValue {
                key: "chat.timeout_secs".into(),
                message: format!("must be between 1 and {MAX_TIMEOUT_SECS}"),
            });
        }

        if self.chat.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "chat.model".into(),
                message: "must not be empty".into(),
            });
        }

        let endpoint = url::Url::parse(self.chat.base_url()).map_err(|e| {
            ConfigError::InvalidValue {
                key: "chat.endpoint".into(),
                message: e.to_string(),
            }
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "chat.endpoint".into(),
                message: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerMode;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.focus_duration, 25);
        assert_eq!(parsed.chat.provider, ChatProvider::Gemini);
        assert!(parsed.alerts.sound);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[timer]\nfocus_duration = 50\n").unwrap();
        assert_eq!(parsed.timer.focus_duration, 50);
        assert_eq!(parsed.timer.short_break, 5);
        assert_eq!(parsed.chat.history_window, 5);
        assert_eq!(parsed.chat.timeout_secs, 30);
    }

    #[test]
    fn durations_follow_timer_section() {
        let mut cfg = Config::default();
        cfg.timer.short_break = 10;
        assert_eq!(cfg.timer.durations().minutes(TimerMode::ShortBreak), 10);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("alerts.sound").as_deref(), Some("true"));
        assert_eq!(cfg.get("timer.focus_duration").as_deref(), Some("25"));
        assert_eq!(cfg.get("chat.provider").as_deref(), Some("gemini"));
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("timer.long_break", "20").unwrap();
        cfg.set("alerts.sound", "false").unwrap();
        cfg.set("chat.model", "gemini-2.0-flash").unwrap();
        cfg.set("chat.endpoint", "http://localhost:8080/v1").unwrap();
        cfg.set("chat.provider", "openai").unwrap();
        assert_eq!(cfg.timer.long_break, 20);
        assert!(!cfg.alerts.sound);
        assert_eq!(cfg.chat.model, "gemini-2.0-flash");
        assert_eq!(cfg.chat.base_url(), "http://localhost:8080/v1");
        assert_eq!(cfg.chat.provider, ChatProvider::OpenAi);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_types() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.set("alerts.sound", "loud").is_err());
        assert!(cfg.set("timer", "1").is_err());
        assert!(cfg.set("chat.provider", "carrier-pigeon").is_err());
    }

    #[test]
    fn set_rejects_out_of_range_and_keeps_old_value() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.focus_duration", "0").is_err());
        assert!(cfg.set("timer.focus_duration", "121").is_err());
        assert!(cfg.set("chat.history_window", "0").is_err());
        assert!(cfg.set("chat.endpoint", "ftp://example.com").is_err());
        assert_eq!(cfg.timer.focus_duration, 25);
        assert_eq!(cfg.chat.history_window, 5);
        assert!(cfg.chat.endpoint.is_none());
    }

    #[test]
    fn base_url_defaults_per_provider_and_trims_slash() {
        let mut chat = ChatConfig::default();
        assert_eq!(
            chat.base_url(),
            "https://generativelanguage.googleapis.com/v1beta"
        );
        chat.provider = ChatProvider::OpenAi;
        assert_eq!(chat.base_url(), "https://api.openai.com/v1");
        chat.endpoint = Some("http://127.0.0.1:1234/".into());
        assert_eq!(chat.base_url(), "http://127.0.0.1:1234");
    }

    #[test]
    fn inline_api_key_wins_and_blank_is_absent() {
        let mut chat = ChatConfig {
            api_key_env: "PHYSFOCUS_TEST_UNSET_KEY_VAR".into(),
            ..Default::default()
        };
        assert_eq!(chat.resolve_api_key(), None);
        chat.api_key = Some("  ".into());
        assert_eq!(chat.resolve_api_key(), None);
        chat.api_key = Some("abc".into());
        assert_eq!(chat.resolve_api_key().as_deref(), Some("abc"));
    }

    #[test]
    fn save_and_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.timer.focus_duration = 45;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timer.focus_duration, 45);
    }

    #[test]
    fn load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\nfocus_duration = 500\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
