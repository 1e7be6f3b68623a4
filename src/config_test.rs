use crate::config::Config;
use crate::core::ServerEndpoint;
use crate::error::AdbError;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn create_test_config(dir: &TempDir, contents: &str) -> PathBuf {
    let config_path = dir.path().join(".adb-bridge.toml");
    fs::write(&config_path, contents).unwrap();
    config_path
}

#[test]
fn test_missing_config_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load_from_path(&temp_dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.endpoint(), ServerEndpoint::new("127.0.0.1", 5037));
    assert_eq!(config.sync.max_buffer_size, 65536);
    assert_eq!(config.sync.receive_buffer_size, 40960);
    assert_eq!(config.read_timeout(), None);
}

#[test]
fn test_empty_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config(&temp_dir, "");
    assert_eq!(Config::load_from_path(&config_path).unwrap(), Config::default());
}

#[test]
fn test_config_loading() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config(
        &temp_dir,
        r#"
[server]
host = "10.0.2.2"
port = 5038
read_timeout_secs = 30

[sync]
max_buffer_size = 4096
"#,
    );

    let config = Config::load_from_path(&config_path).unwrap();
    assert_eq!(config.endpoint(), ServerEndpoint::new("10.0.2.2", 5038));
    assert_eq!(config.read_timeout(), Some(Duration::from_secs(30)));
    assert_eq!(config.sync.max_buffer_size, 4096);
    // Unset keys keep their defaults
    assert_eq!(config.sync.receive_buffer_size, 40960);
}

#[test]
fn test_partial_server_section() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config(&temp_dir, "[server]\nport = 15037\n");

    let config = Config::load_from_path(&config_path).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 15037);
}

#[test]
fn test_invalid_toml_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config(&temp_dir, "this is not valid toml");
    assert!(matches!(Config::load_from_path(&config_path), Err(AdbError::Toml(_))));
}

#[test]
fn test_wrong_value_type() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config(&temp_dir, "[server]\nport = \"five\"\n");
    assert!(matches!(Config::load_from_path(&config_path), Err(AdbError::Toml(_))));
}

#[test]
fn test_buffer_too_small() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config(&temp_dir, "[sync]\nmax_buffer_size = 8\n");
    assert!(matches!(Config::load_from_path(&config_path), Err(AdbError::Config(_))));
}

#[test]
fn test_client_uses_endpoint() {
    let config = Config {
        server: crate::config::ServerConfig {
            host: "192.168.1.5".to_string(),
            port: 5555,
            read_timeout_secs: Some(2),
        },
        ..Config::default()
    };
    assert_eq!(config.client().endpoint(), &ServerEndpoint::new("192.168.1.5", 5555));
}

