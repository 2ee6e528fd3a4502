use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;
use super::protocol::StationOrder;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub timezone: TimezoneConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

/// Where stations come from and how many of them we ask for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// radio-browser search endpoint.  The `all.` alias round-robins mirrors.
    #[serde(default = "default_directory_url")]
    pub base_url: String,
    /// Sent on every directory request; anonymous clients get bot-blocked.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Country code that gets extra queries.  Empty issues only the
    /// worldwide query.
    #[serde(default = "default_priority_region")]
    pub priority_region: String,
    /// One priority-region query per entry, in this order.
    #[serde(default = "default_priority_orders")]
    pub priority_orders: Vec<StationOrder>,
    #[serde(default = "default_priority_limit")]
    pub priority_limit: u32,
    #[serde(default = "default_world_limit")]
    pub world_limit: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimezoneConfig {
    #[serde(default = "default_timezone_url")]
    pub api_url: String,
    /// Passed as `current_date`; the service wants one, the answer
    /// (a zone id) does not depend on it.
    #[serde(default = "default_reference_date")]
    pub reference_date: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_volume")]
    pub default_volume: f32,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_directory_url(),
            user_agent: default_user_agent(),
            priority_region: default_priority_region(),
            priority_orders: default_priority_orders(),
            priority_limit: default_priority_limit(),
            world_limit: default_world_limit(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl DirectoryConfig {
    pub fn priority_region(&self) -> Option<&str> {
        let region = self.priority_region.trim();
        (!region.is_empty()).then_some(region)
    }
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            api_url: default_timezone_url(),
            reference_date: default_reference_date(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
        }
    }
}

fn default_directory_url() -> String {
    "https://all.api.radio-browser.info/json/stations/search".to_string()
}

fn default_user_agent() -> String {
    "RadioWorldwideApp/1.0 (https://radioworldwide.in; admin@radioworldwide.in)".to_string()
}

fn default_priority_region() -> String {
    "IN".to_string()
}

fn default_priority_orders() -> Vec<StationOrder> {
    vec![
        StationOrder::ClickCount,
        StationOrder::Votes,
        StationOrder::Unsorted,
    ]
}

fn default_priority_limit() -> u32 {
    500
}

fn default_world_limit() -> u32 {
    4000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_timezone_url() -> String {
    "https://timezone.openmeteo.com/api/timezone".to_string()
}

fn default_reference_date() -> String {
    "2024-01-01".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8989
}

fn default_volume() -> f32 {
    crate::state::DEFAULT_VOLUME
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: DirectoryConfig::default(),
            timezone: TimezoneConfig::default(),
            http: HttpConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}
