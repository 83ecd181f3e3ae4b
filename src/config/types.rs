use cinescope_tmdb::TmdbConfig;
use cinescope_trakt::TraktConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub trakt: TraktSettings,

    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served under `/static` (stylesheets, favicon).
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraktSettings {
    /// API client settings, flattened so they sit beside `username`.
    #[serde(flatten)]
    pub client: TraktConfig,

    /// Whose history the history page shows.
    #[serde(default)]
    pub username: Option<String>,

    /// Upper bound on history entries loaded (default: 500)
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

fn default_max_items() -> usize {
    500
}

impl Default for TraktSettings {
    fn default() -> Self {
        Self {
            client: TraktConfig::default(),
            username: None,
            max_items: default_max_items(),
        }
    }
}

impl TraktSettings {
    /// Username with surrounding whitespace removed, if one is set.
    pub fn username(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    /// Artwork lookups in flight at once while enriching history (default: 6)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Seconds an enriched history snapshot is reused (default: 300)
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    /// Offset from UTC, in minutes, used for day/month/year grouping
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_concurrency() -> usize {
    6
}
fn default_refresh_secs() -> u64 {
    300
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            refresh_secs: default_refresh_secs(),
            utc_offset_minutes: 0,
        }
    }
}
