use friendgraph_core::{ConfigManager, IdFormat, Settings, MAX_SEARCH_RESULTS};
use secrecy::ExposeSecret;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings_need_a_secret() {
    let mut settings = Settings::default();
    settings.secrets.jwt_secret = None;
    assert!(settings.validate().is_err());

    let settings = Settings::with_jwt_secret("s3cret");
    assert!(settings.validate().is_ok());
    assert_eq!(settings.server.port, 6001);
    assert_eq!(settings.search.max_results, MAX_SEARCH_RESULTS);
    assert_eq!(settings.identity.format, IdFormat::ObjectId);
}

#[test]
fn test_search_limit_bounds() {
    let mut settings = Settings::with_jwt_secret("s3cret");
    settings.search.max_results = 0;
    assert!(settings.validate().is_err());
    settings.search.max_results = MAX_SEARCH_RESULTS + 1;
    assert!(settings.validate().is_err());
    settings.search.max_results = 10;
    assert!(settings.validate().is_ok());
}

#[test]
fn test_layered_file_sources() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        r#"
[server]
host = "127.0.0.1"
port = 7000

[identity]
format = "opaque"

[secrets]
jwt_secret = "from-default"
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("staging.toml"),
        r#"
[server]
host = "127.0.0.1"
port = 7100

[search]
max_results = 20
include_email = false
"#,
    )
    .unwrap();

    let settings = ConfigManager::load_from_sources(dir.path(), "staging").unwrap();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.server.port, 7100);
    assert_eq!(settings.identity.format, IdFormat::Opaque);
    assert_eq!(settings.search.max_results, 20);
    assert!(!settings.search.include_email);
    assert_eq!(
        settings.secrets.jwt_secret.as_ref().unwrap().expose_secret(),
        "from-default"
    );
}

#[test]
fn test_secrets_are_not_serialized() {
    let settings = Settings::with_jwt_secret("do-not-print");
    let json = serde_json::to_string(&settings).unwrap();
    assert!(!json.contains("do-not-print"));
}

#[test]
fn test_manager_from_settings() {
    let manager = ConfigManager::from_settings(Settings::with_jwt_secret("abc")).unwrap();
    assert_eq!(manager.settings().search.max_results, MAX_SEARCH_RESULTS);

    let mut missing = Settings::default();
    missing.secrets.jwt_secret = None;
    assert!(ConfigManager::from_settings(missing).is_err());
}
