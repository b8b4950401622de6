//! Test plan for the `relay-config` crate.
//!
//! Exercises the configuration loader across default handling, file
//! discovery, and environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use relay_config::load;

const ENV_VARS_TO_RESET: &[&str] = &[
    "RELAY_CONFIG",
    "RELAY__AUTH__SESSION_TTL_SECONDS",
    "RELAY__DATABASE__MAX_CONNECTIONS",
    "RELAY__DATABASE__URL",
    "RELAY__HTTP__ADDRESS",
    "RELAY__HTTP__PORT",
    "RELAY__REGISTRY__OUTBOUND_BUFFER",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    let config = load().expect("configuration should load from defaults");

    assert_eq!(config.http.address, "127.0.0.1");
    assert_eq!(config.http.port, 7080);
    assert_eq!(config.database.url, "sqlite://relay.db");
    assert_eq!(config.database.max_connections, 10);
    assert_eq!(config.auth.session_ttl_seconds, 86_400);
    assert_eq!(config.registry.outbound_buffer, 64);
}

#[test]
#[serial]
fn load_reads_configuration_file_from_working_directory() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    write_config_file(
        temp_dir.path(),
        "relay.toml",
        r#"
[http]
address = "0.0.0.0"
port = 9090

[database]
url = "sqlite://custom.db"
max_connections = 3

[auth]
session_ttl_seconds = 1200

[registry]
outbound_buffer = 16
"#,
    );

    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    let config = load().expect("configuration should load from file");

    assert_eq!(config.http.address, "0.0.0.0");
    assert_eq!(config.http.port, 9090);
    assert_eq!(config.database.url, "sqlite://custom.db");
    assert_eq!(config.database.max_connections, 3);
    assert_eq!(config.auth.session_ttl_seconds, 1200);
    assert_eq!(config.registry.outbound_buffer, 16);
}

#[test]
#[serial]
fn load_honors_explicit_config_path() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    write_config_file(
        temp_dir.path(),
        "elsewhere/custom.toml",
        r#"
[http]
port = 7171
"#,
    );

    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());
    ctx.set_var(
        "RELAY_CONFIG",
        temp_dir
            .path()
            .join("elsewhere/custom.toml")
            .to_string_lossy(),
    );

    let config = load().expect("configuration should load from explicit path");
    assert_eq!(config.http.port, 7171);
}

#[test]
#[serial]
fn environment_overrides_take_precedence_over_files() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    write_config_file(
        temp_dir.path(),
        "relay.toml",
        r#"
[http]
port = 9090

[registry]
outbound_buffer = 16
"#,
    );

    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());
    ctx.set_var("RELAY__HTTP__PORT", "6060");
    ctx.set_var("RELAY__REGISTRY__OUTBOUND_BUFFER", "128");

    let config = load().expect("configuration should load with env overrides");
    assert_eq!(config.http.port, 6060);
    assert_eq!(config.registry.outbound_buffer, 128);
}
