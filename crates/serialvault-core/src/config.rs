//! Configuration resolution for Serial Vault.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Settings file (`--config`, or ~/.config/serialvault/settings.json)
//! 3. Environment variables (`SERIALVAULT_*`)
//! 4. CLI arguments (applied by the binary, highest priority)

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete vault configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub signing: SigningConfig,
}

/// Listener, storage and logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub database_path: Option<PathBuf>,
    pub max_connections: u32,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_path: None,
            max_connections: 5,
            log_json: false,
        }
    }
}

/// Settings consulted by the signing pipeline and the admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// API keys accepted in the `api-key` header.
    pub api_keys: Vec<String>,
    /// Resolve admin callers through the `user` header instead of treating
    /// every valid key as administrative.
    pub enable_user_auth: bool,
    /// Assertion type the pipeline accepts.
    pub assertion_type: String,
    pub max_payload_bytes: usize,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            enable_user_auth: false,
            assertion_type: "serial".to_string(),
            max_payload_bytes: 64 * 1024,
        }
    }
}

/// Load configuration from `explicit_path` (or the global settings file)
/// and apply environment overrides.
///
/// An explicit path that does not exist is an error; a missing global file
/// is not.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let mut config = match explicit_path {
        Some(path) => load_config_file(path)?,
        None => match global_config_path() {
            Some(path) if path.exists() => load_config_file(&path)?,
            _ => Config::default(),
        },
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Get the global settings file path.
pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("serialvault").join("settings.json"))
}

/// Default database location next to the global settings.
pub fn default_database_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("serialvault").join("vault.db"))
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(val) = lookup("SERIALVAULT_ADDR") {
        config.server.addr = parse_env("SERIALVAULT_ADDR", &val)?;
    }
    if let Some(val) = lookup("SERIALVAULT_DATABASE_PATH") {
        config.server.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("SERIALVAULT_MAX_CONNECTIONS") {
        config.server.max_connections = parse_env("SERIALVAULT_MAX_CONNECTIONS", &val)?;
    }
    if let Some(val) = lookup("SERIALVAULT_LOG_JSON") {
        config.server.log_json = parse_flag("SERIALVAULT_LOG_JSON", &val)?;
    }
    if let Some(val) = lookup("SERIALVAULT_API_KEYS") {
        config.signing.api_keys = val
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(val) = lookup("SERIALVAULT_ENABLE_USER_AUTH") {
        config.signing.enable_user_auth = parse_flag("SERIALVAULT_ENABLE_USER_AUTH", &val)?;
    }
    if let Some(val) = lookup("SERIALVAULT_ASSERTION_TYPE") {
        if val.trim().is_empty() {
            return Err(Error::Config("SERIALVAULT_ASSERTION_TYPE: must not be empty".into()));
        }
        config.signing.assertion_type = val.trim().to_string();
    }
    if let Some(val) = lookup("SERIALVAULT_MAX_PAYLOAD_BYTES") {
        config.signing.max_payload_bytes = parse_env("SERIALVAULT_MAX_PAYLOAD_BYTES", &val)?;
    }
    Ok(())
}

fn parse_env<T>(name: &str, val: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    val.trim()
        .parse()
        .map_err(|e| Error::Config(format!("{name}: {e}")))
}

fn parse_flag(name: &str, val: &str) -> Result<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(Error::Config(format!("{name}: expected a boolean, got '{other}'"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_accept_serial_assertions() {
        let config = Config::default();
        assert_eq!(config.signing.assertion_type, "serial");
        assert!(config.signing.api_keys.is_empty());
        assert!(!config.signing.enable_user_auth);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"signing": {"api_keys": ["k1"]}}"#).unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.signing.api_keys, vec!["k1".to_string()]);
        assert_eq!(config.signing.assertion_type, "serial");
        assert_eq!(config.server.max_connections, 5);
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("SERIALVAULT_API_KEYS", "a, b,,c"),
            ("SERIALVAULT_ENABLE_USER_AUTH", "true"),
            ("SERIALVAULT_ADDR", "127.0.0.1:9000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| (*v).to_string())).unwrap();

        assert_eq!(config.signing.api_keys, vec!["a", "b", "c"]);
        assert!(config.signing.enable_user_auth);
        assert_eq!(config.server.addr.port(), 9000);
    }

    #[test]
    fn bad_env_addr_is_rejected() {
        let mut config = Config::default();
        let err = apply_env_overrides(&mut config, |k| {
            (k == "SERIALVAULT_ADDR").then(|| "not-an-addr".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn env_covers_every_layered_field() {
        let env: HashMap<&str, &str> = [
            ("SERIALVAULT_ASSERTION_TYPE", "model"),
            ("SERIALVAULT_MAX_CONNECTIONS", "12"),
            ("SERIALVAULT_LOG_JSON", "1"),
            ("SERIALVAULT_MAX_PAYLOAD_BYTES", "1024"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| (*v).to_string())).unwrap();

        assert_eq!(config.signing.assertion_type, "model");
        assert_eq!(config.server.max_connections, 12);
        assert!(config.server.log_json);
        assert_eq!(config.signing.max_payload_bytes, 1024);
    }

    #[test]
    fn bad_env_values_are_rejected() {
        for (name, value) in [
            ("SERIALVAULT_MAX_PAYLOAD_BYTES", "lots"),
            ("SERIALVAULT_MAX_CONNECTIONS", "-1"),
            ("SERIALVAULT_LOG_JSON", "maybe"),
            ("SERIALVAULT_ENABLE_USER_AUTH", "on-ish"),
            ("SERIALVAULT_ASSERTION_TYPE", "  "),
        ] {
            let mut config = Config::default();
            let err = apply_env_overrides(&mut config, |k| (k == name).then(|| value.to_string()))
                .unwrap_err();
            assert!(err.to_string().contains(name), "{err}");
            assert_eq!(config.signing.max_payload_bytes, SigningConfig::default().max_payload_bytes);
        }
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.json"))).is_err());
    }
}
