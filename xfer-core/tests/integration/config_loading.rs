use std::env;
use std::sync::{Mutex, OnceLock};
use xfer_core::domain::RouteChaos;
use xfer_core::foundation::ROUTE_VERIFY_WALLET;
use xfer_core::infrastructure::config::{load_app_config_from_path, load_config_from_file, AppConfig, StubMode};

fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn test_config_loading_when_file_missing_then_defaults() {
    let _guard = lock_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = load_config_from_file(&dir.path().join("absent.toml")).expect("load");
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_config_loading_when_toml_present_then_overrides_defaults() {
    let _guard = lock_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("xfer-config.toml");
    std::fs::write(
        &path,
        r#"
[gateway]
bind_addr = "127.0.0.1:9000"
seed = 7

[chaos.routes."/verify_wallet"]
delay_ms = 0
error_rate = 1.0
error_codes = [503]

[stubs]
mode = "always_succeed"

[saga]
remote_base_url = "http://127.0.0.1:9000/"
store_dir = ""

[saga.retry]
max_attempts = 5
"#,
    )
    .expect("write config");

    let config = load_app_config_from_path(&path).expect("load");
    assert_eq!(config.gateway.bind_addr, "127.0.0.1:9000");
    assert_eq!(config.gateway.seed, Some(7));
    assert_eq!(config.chaos.resolve(ROUTE_VERIFY_WALLET), &RouteChaos::new(0, 1.0, &[503]));
    assert_eq!(config.stubs.mode, StubMode::AlwaysSucceed);
    assert_eq!(config.saga.remote_base_url, "http://127.0.0.1:9000");
    assert_eq!(config.saga.store_dir, None);
    assert_eq!(config.saga.retry.max_attempts, 5);
    assert_eq!(config.saga.retry.backoff_cap_ms, 2_000);
}

#[test]
fn test_config_loading_when_env_set_then_env_wins() {
    let _guard = lock_env();
    let dir = tempfile::tempdir().expect("tempdir");
    env::set_var("XFER_SAGA__RETRY__MAX_ATTEMPTS", "9");
    env::set_var("XFER_LOGGING__LEVEL", "debug");

    let loaded = load_config_from_file(&dir.path().join("absent.toml"));

    env::remove_var("XFER_SAGA__RETRY__MAX_ATTEMPTS");
    env::remove_var("XFER_LOGGING__LEVEL");

    let config = loaded.expect("load");
    assert_eq!(config.saga.retry.max_attempts, 9);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_config_loading_when_invalid_then_reports_validation_errors() {
    let _guard = lock_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("xfer-config.toml");
    std::fs::write(&path, "[stubs]\nrejection_rate = 3.0\n").expect("write config");

    let err = load_app_config_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("stubs.rejection_rate"), "{err}");
}
