use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use shared_types::ListTicketsQuery;
use std::path::{Path, PathBuf};
use std::time::Duration;
use ticket_engine::timestamp::DISPLAY_FORMAT;

const DEFAULT_CONFIG: &str = r#"
[backend]
base_url = "http://localhost:5000/api"
# Bearer token sent with every request
# token = "your-session-token"

[polling]
# Seconds between background refreshes of the ticket list
interval_secs = 30
# Only list tickets received in the last N days
# days = 30
# limit = 500

[display]
timestamp_format = "%d %b %Y, %H:%M"
"#;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct ClientConfig {
    pub backend: BackendConfig,
    pub polling: PollingConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            days: None,
            limit: None,
        }
    }
}

impl PollingConfig {
    /// Zero is treated as one second so the interval timer never spins
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub timestamp_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timestamp_format: DISPLAY_FORMAT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads the user's config file, creating a commented default on first run.
    /// `QUOTEDESK_<SECTION>__<KEY>` environment variables override file values.
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let config = Self::load_from(&config_path)?;
        Ok((config, config_path))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(path.to_path_buf()))
            .add_source(
                Environment::with_prefix("QUOTEDESK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        builder.try_deserialize()
    }

    /// Query used by every list refresh, foreground or background
    pub fn list_query(&self) -> ListTicketsQuery {
        ListTicketsQuery {
            days: self.polling.days,
            limit: self.polling.limit,
            ..Default::default()
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Copy safe to print, with the token masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.backend.token = mask_token(&config.backend.token);
        config
    }
}

fn mask_token(token: &Option<String>) -> Option<String> {
    token.as_ref().map(|t| {
        let visible: String = t.chars().take(6).collect();
        let hidden = t.chars().count().saturating_sub(6).min(34);
        format!("{}{}", visible, "*".repeat(hidden))
    })
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("quotedesk").join("client.toml")
    } else {
        PathBuf::from("client.toml")
    }
}
