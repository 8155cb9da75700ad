//! Config file round trips through the filesystem.

use cherrypick_core::config::Config;
use cherrypick_core::error::ConfigError;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg, Config::default());
}

#[test]
fn generated_file_loads_back_and_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    Config::generate_default(&path).unwrap();
    assert_eq!(Config::load(&path).unwrap(), Config::default());
    assert!(matches!(Config::generate_default(&path), Err(ConfigError::AlreadyExists { .. })));
}

#[test]
fn saved_changes_survive_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut cfg = Config::default();
    cfg.git.target_branch = "release".into();
    cfg.behavior.auto_push = true;
    cfg.save(&path).unwrap();
    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.git.target_branch, "release");
    assert!(loaded.behavior.auto_push);
}

#[test]
fn malformed_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[git\ntarget_branch = 3").unwrap();
    assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
}
