use std::fs;
use std::time::Duration;

use forge_app::ForgeConfig;
use forge_logging::LogDestination;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn missing_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let config = ForgeConfig::load(&temp.path().join("luna.ron")).unwrap();
    assert_eq!(config, ForgeConfig::default());
    assert_eq!(
        config.channel_settings().unwrap().ws_base_url,
        "ws://localhost:8000"
    );
    assert_eq!(
        config.engine_settings().completion_delay,
        Duration::from_millis(1500)
    );
}

#[test]
fn file_values_override_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("luna.ron");
    fs::write(
        &path,
        r#"(
            backend_url: "https://forge.example.com",
            stall_timeout_secs: 0,
            log_destination: "both",
            log_level: "debug",
        )"#,
    )
    .unwrap();

    let config = ForgeConfig::load(&path).unwrap();
    assert_eq!(config.backend_url, "https://forge.example.com");
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(
        config.channel_settings().unwrap().ws_base_url,
        "wss://forge.example.com"
    );
    assert_eq!(config.engine_settings().stall_timeout, None);
    assert_eq!(config.log_destination().unwrap(), LogDestination::Both);
    assert_eq!(config.log_level().unwrap(), log::LevelFilter::Debug);
}

#[test]
fn broken_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("luna.ron");
    fs::write(&path, "(backend_url: 42)").unwrap();
    assert!(ForgeConfig::load(&path).is_err());
}

#[test]
fn environment_overrides_file() {
    let mut config = ForgeConfig::default();
    config.apply_env_from(|key| match key {
        "LUNA_BACKEND_URL" => Some("http://10.0.0.5:9000".to_string()),
        "LUNA_WS_URL" => Some("   ".to_string()),
        _ => None,
    });
    assert_eq!(config.backend_url, "http://10.0.0.5:9000");
    assert_eq!(config.ws_url, None);
    assert_eq!(
        config.channel_settings().unwrap().ws_base_url,
        "ws://10.0.0.5:9000"
    );
}

#[test]
fn bad_values_are_reported() {
    let config = ForgeConfig {
        backend_url: "localhost:8000".to_string(),
        log_destination: "syslog".to_string(),
        log_level: "loud".to_string(),
        ..ForgeConfig::default()
    };
    assert!(config.channel_settings().is_err());
    assert!(config.log_destination().is_err());
    assert!(config.log_level().is_err());
}
