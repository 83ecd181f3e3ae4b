mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variables that override secrets from the config file.
pub const ENV_TMDB_API_KEY: &str = "TMDB_API_KEY";
pub const ENV_TRAKT_CLIENT_ID: &str = "TRAKT_CLIENT_ID";
pub const ENV_TRAKT_USERNAME: &str = "TRAKT_USERNAME";

/// Largest UTC offset accepted for history grouping, in minutes (±18h).
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config = parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Parse configuration from TOML text without touching the environment.
pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./cinescope.toml",
        "~/.config/cinescope/config.toml",
        "/etc/cinescope/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Overlay credentials from the environment, so keys can stay out of the file.
pub fn apply_env_overrides(config: &mut Config) {
    if let Some(key) = env_value(ENV_TMDB_API_KEY) {
        config.tmdb.api_key = key;
    }
    if let Some(id) = env_value(ENV_TRAKT_CLIENT_ID) {
        config.trakt.client.client_id = id;
    }
    if let Some(user) = env_value(ENV_TRAKT_USERNAME) {
        config.trakt.username = Some(user);
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.history.concurrency == 0 {
        anyhow::bail!("history.concurrency must be at least 1");
    }

    if config.history.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        anyhow::bail!(
            "history.utc_offset_minutes must be within ±{} (got {})",
            MAX_UTC_OFFSET_MINUTES,
            config.history.utc_offset_minutes
        );
    }

    if config.tmdb.api_key.trim().is_empty() {
        tracing::warn!("TMDB api_key is not set; title pages will render without data");
    }

    if config.trakt.username().is_some() && config.trakt.client.client_id.trim().is_empty() {
        tracing::warn!("Trakt username is set but client_id is missing; history is disabled");
    }

    if let Some(ref dir) = config.server.static_dir {
        if !dir.exists() {
            tracing::warn!("Static directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.tmdb.language, "en-US");
        assert_eq!(config.trakt.client.page_limit, 100);
        assert_eq!(config.trakt.max_items, 500);
        assert_eq!(config.history.concurrency, 6);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn sections_parse() {
        let config = parse_config(
            r#"
            [server]
            port = 3000

            [tmdb]
            api_key = "abc"
            region = "GB"

            [trakt]
            client_id = "cid"
            username = "  alice "
            page_limit = 25

            [history]
            concurrency = 3
            utc_offset_minutes = -300
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.tmdb.api_key, "abc");
        assert_eq!(config.tmdb.region, "GB");
        assert_eq!(config.tmdb.language, "en-US");
        assert_eq!(config.trakt.client.client_id, "cid");
        assert_eq!(config.trakt.username(), Some("alice"));
        assert_eq!(config.trakt.client.page_limit, 25);
        assert_eq!(config.history.concurrency, 3);
        assert_eq!(config.history.utc_offset_minutes, -300);
    }

    #[test]
    fn rejects_zero_port_and_concurrency() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.history.concurrency = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let mut config = Config::default();
        config.history.utc_offset_minutes = 24 * 60;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn blank_username_is_none() {
        let config = parse_config("[trakt]\nusername = \"  \"\n").unwrap();
        assert_eq!(config.trakt.username(), None);
    }
}
