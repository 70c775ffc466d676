use imghub_kernel::config::{
    ConfigError, load_app_config, load_app_config_with_env, load_config_with_env,
};
use imghub_kernel::domain::config::AppConfig;
use std::io::Write;
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> config::Map<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let cfg = load_app_config_with_env(Some(tmp.path().join("absent.toml")), env(&[])).unwrap();

    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.server.public_base(), "http://localhost:8080");
    assert_eq!(cfg.fetch.max_concurrent, 20);
    assert_eq!(cfg.storage.root, std::path::PathBuf::from("./data"));
}

#[test]
fn env_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("server.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "[server]\nport = 9000\npublic_url = \"https://img.example.com/\"\n\n[fetch]\nmax_concurrent = 4\ntimeout_secs = 3"
    )
    .unwrap();

    let overrides = env(&[
        ("IMGHUB__FETCH__MAX_CONCURRENT", "7"),
        ("IMGHUB__STORAGE__ROOT", "/srv/images"),
        ("IMGHUB__LOG__JSON", "true"),
    ]);
    let cfg: AppConfig = load_config_with_env(Some(&path), Some(overrides)).unwrap();

    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.server.public_base(), "https://img.example.com");
    assert_eq!(cfg.fetch.timeout_secs, 3);
    assert_eq!(cfg.fetch.max_concurrent, 7);
    assert_eq!(cfg.storage.root, std::path::PathBuf::from("/srv/images"));
    assert!(cfg.log.json);
}

#[test]
fn unrelated_variables_are_ignored() {
    let tmp = TempDir::new().unwrap();
    let overrides = env(&[("OTHER__FETCH__MAX_CONCURRENT", "0"), ("PATH", "/bin")]);

    let cfg = load_app_config_with_env(Some(tmp.path().join("absent.toml")), overrides).unwrap();
    assert_eq!(cfg.fetch.max_concurrent, 20);
}

#[test]
fn invalid_values_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let overrides = env(&[("IMGHUB__FETCH__MAX_CONCURRENT", "0")]);

    let err = load_app_config_with_env(Some(tmp.path().join("absent.toml")), overrides).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }), "{err:?}");
}

#[test]
fn malformed_file_is_a_config_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("server.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();

    let err = load_app_config(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Config { .. }), "{err:?}");
}
