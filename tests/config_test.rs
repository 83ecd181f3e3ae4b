//! Integration tests for configuration loading.

use std::io::Write;

use assert_matches::assert_matches;
use cinescope::config::{
    load_config, load_config_or_default, ENV_TMDB_API_KEY, ENV_TRAKT_CLIENT_ID, ENV_TRAKT_USERNAME,
};
use serial_test::serial;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn clear_env() {
    std::env::remove_var(ENV_TMDB_API_KEY);
    std::env::remove_var(ENV_TRAKT_CLIENT_ID);
    std::env::remove_var(ENV_TRAKT_USERNAME);
}

#[test]
#[serial]
fn loads_file_from_explicit_path() {
    clear_env();
    let file = write_config(
        r#"
        [server]
        host = "127.0.0.1"
        port = 9000

        [tmdb]
        api_key = "from-file"
        language = "de-DE"

        [history]
        refresh_secs = 60
        "#,
    );

    let config = load_config_or_default(Some(file.path())).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.tmdb.api_key, "from-file");
    assert_eq!(config.tmdb.language, "de-DE");
    assert_eq!(config.tmdb.region, "US");
    assert_eq!(config.history.refresh_secs, 60);
    assert_eq!(config.history.concurrency, 6);
}

#[test]
#[serial]
fn environment_overrides_file() {
    clear_env();
    std::env::set_var(ENV_TMDB_API_KEY, " env-key ");
    std::env::set_var(ENV_TRAKT_CLIENT_ID, "env-client");
    std::env::set_var(ENV_TRAKT_USERNAME, "bob");

    let file = write_config(
        r#"
        [tmdb]
        api_key = "from-file"

        [trakt]
        client_id = "file-client"
        username = "alice"
        "#,
    );
    let config = load_config(file.path()).unwrap();
    clear_env();

    assert_eq!(config.tmdb.api_key, "env-key");
    assert_eq!(config.trakt.client.client_id, "env-client");
    assert_eq!(config.trakt.username(), Some("bob"));
}

#[test]
#[serial]
fn blank_environment_values_are_ignored() {
    clear_env();
    std::env::set_var(ENV_TMDB_API_KEY, "   ");

    let file = write_config("[tmdb]\napi_key = \"from-file\"\n");
    let config = load_config(file.path()).unwrap();
    clear_env();

    assert_eq!(config.tmdb.api_key, "from-file");
}

#[test]
#[serial]
fn invalid_values_are_rejected() {
    clear_env();
    let file = write_config("[history]\nconcurrency = 0\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("concurrency"));

    let file = write_config("[history]\nutc_offset_minutes = 1200\n");
    assert_matches!(load_config(file.path()), Err(_));
}

#[test]
#[serial]
fn malformed_toml_reports_path() {
    clear_env();
    let file = write_config("[server\nport = 1");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
#[serial]
fn missing_file_is_an_error() {
    let result = load_config(std::path::Path::new("/nonexistent/cinescope.toml"));
    assert_matches!(result, Err(e) if e.to_string().contains("Failed to read config file"));
}
