use entity_chat::config::{AppConfig, DEFAULT_WELCOME};
use serial_test::serial;
use std::env;
use std::fs;

const BIN: &str = "entity-chat";

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("ENTITY_SERVER__BASE_URL");
        env::remove_var("ENTITY_SERVER__REQUEST_TIMEOUT_SECS");
        env::remove_var("ENTITY_UI__LIST_PROCESSES_BUILTIN");
        env::remove_var("ENTITY_SERVER_URL");
        env::remove_var("ENTITY_TIMEOUT_SECS");
        env::remove_var("CONFIG_FILE");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args([BIN]).expect("defaults should load");
    assert_eq!(config.server.base_url, "http://127.0.0.1:8000");
    assert_eq!(config.server.chat_path, "/api/chat");
    assert_eq!(config.server.execute_path, "/api/execute");
    assert_eq!(config.server.request_timeout_secs, None);
    assert_eq!(config.ui.welcome_message, DEFAULT_WELCOME);
    assert!(!config.ui.list_processes_builtin);
    assert!(!config.log.json);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("ENTITY_SERVER__BASE_URL", "http://10.0.0.5:9000");
        env::set_var("ENTITY_SERVER__REQUEST_TIMEOUT_SECS", "30");
        env::set_var("ENTITY_UI__LIST_PROCESSES_BUILTIN", "true");
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config");
    assert_eq!(config.server.base_url, "http://10.0.0.5:9000");
    assert_eq!(config.server.request_timeout_secs, Some(30));
    assert!(config.ui.list_processes_builtin);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("entity.yaml");
    fs::write(
        &file_path,
        r#"
server:
  base_url: "http://files.example:7070"
ui:
  welcome_message: "Hello from a file"
"#,
    )
    .expect("Failed to write temp config");

    unsafe {
        env::set_var("CONFIG_FILE", &file_path);
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config from file");
    assert_eq!(config.server.base_url, "http://files.example:7070");
    assert_eq!(config.ui.welcome_message, "Hello from a file");
    assert_eq!(config.server.chat_path, "/api/chat");

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_env_vars();

    let result = AppConfig::load_from_args([BIN, "--config", "/nonexistent/entity.yaml"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("ENTITY_SERVER__BASE_URL", "http://from-env:1");
    }

    let config = AppConfig::load_from_args([
        BIN,
        "--server-url",
        "http://from-cli:2",
        "--timeout-secs",
        "5",
        "--export-html",
        "out.html",
        "--log-json",
        "true",
    ])
    .expect("Failed to load config");

    assert_eq!(config.server.base_url, "http://from-cli:2");
    assert_eq!(config.server.request_timeout_secs, Some(5));
    assert_eq!(config.ui.export_html.as_deref(), Some("out.html"));
    assert!(config.log.json);

    clear_env_vars();
}

#[test]
#[serial]
fn test_server_url_env_shortcut() {
    clear_env_vars();
    unsafe {
        env::set_var("ENTITY_SERVER_URL", "http://shortcut:8000");
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config");
    assert_eq!(config.server.base_url, "http://shortcut:8000");

    clear_env_vars();
}

#[test]
#[serial]
fn test_unknown_flag_is_rejected() {
    clear_env_vars();
    assert!(AppConfig::load_from_args([BIN, "--bogus"]).is_err());
}
