//
//  stash-client
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Loads and saves the `stash` CLI configuration, a TOML file stored in the
//! platform-specific config directory.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/stash/config.toml` (or `$XDG_CONFIG_HOME/stash/config.toml`)
//! - **macOS**: `~/Library/Application Support/stash/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\stash\config\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! default_host = "stash.example.com"
//!
//! [http]
//! timeout_secs = 10
//! insecure = false
//!
//! [hosts."stash.example.com"]
//! base_url = "https://stash.example.com/"
//! username = "deploy"
//! ```
//!
//! Passwords are never stored here. They come from `--password` or
//! `STASH_PASSWORD`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stash_client::config::Config;
//!
//! let config = Config::load()?;
//! if let Some(host) = config.default_host_config() {
//!     println!("Using {}", host.base_url);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

mod hosts;

pub use hosts::*;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::transport::DEFAULT_TIMEOUT;
use crate::api::TransportConfig;

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &["default_host", "http.timeout_secs", "http.insecure"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Name of the host entry used when no URL is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_host: Option<String>,

    #[serde(default)]
    pub http: HttpConfig,

    /// Known servers keyed by name.
    #[serde(default)]
    pub hosts: BTreeMap<String, HostConfig>,
}

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Skip TLS certificate validation.
    #[serde(default)]
    pub insecure: bool,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            insecure: false,
        }
    }
}

impl HttpConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .timeout(Duration::from_secs(self.timeout_secs))
            .accept_invalid_certs(self.insecure)
    }
}

/// A configured server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Config {
    /// Loads the configuration from the default location, or defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads the configuration from `path`, or defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "stash")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn host(&self, name: &str) -> Option<&HostConfig> {
        self.hosts.get(name)
    }

    pub fn default_host_config(&self) -> Option<&HostConfig> {
        self.default_host.as_deref().and_then(|name| self.host(name))
    }

    /// Adds or replaces a host. The first host added becomes the default.
    pub fn add_host(&mut self, name: String, host: HostConfig) {
        if self.default_host.is_none() {
            self.default_host = Some(name.clone());
        }
        self.hosts.insert(name, host);
    }

    pub fn remove_host(&mut self, name: &str) -> Option<HostConfig> {
        let removed = self.hosts.remove(name);
        if self.default_host.as_deref() == Some(name) {
            self.default_host = None;
        }
        removed
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "default_host" => self.default_host.clone(),
            "http.timeout_secs" => Some(self.http.timeout_secs.to_string()),
            "http.insecure" => Some(self.http.insecure.to_string()),
            _ => None,
        }
    }

    /// Sets a value by key.
    ///
    /// # Errors
    ///
    /// Unknown keys and values that do not parse for the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_host" => {
                if !self.hosts.contains_key(value) {
                    anyhow::bail!("Unknown host '{}'", value);
                }
                self.default_host = Some(value.to_string());
            }
            "http.timeout_secs" => {
                self.http.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout '{}'", value))?;
            }
            "http.insecure" => {
                self.http.insecure = value
                    .parse()
                    .with_context(|| format!("Invalid boolean '{}'", value))?;
            }
            _ => anyhow::bail!(
                "Unknown config key '{}'. Valid keys: {}",
                key,
                CONFIG_KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.http.timeout_secs, 10);
        assert!(!config.http.insecure);
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_host = "work"

[http]
insecure = true

[hosts.work]
base_url = "https://stash.example.com/"
username = "deploy"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.http.insecure);
        assert_eq!(config.http.timeout_secs, 10);
        let host = config.default_host_config().unwrap();
        assert_eq!(host.base_url, "https://stash.example.com/");
        assert_eq!(host.username.as_deref(), Some("deploy"));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stash").join("config.toml");

        let mut config = Config::default();
        config.add_host(
            "work".to_string(),
            HostConfig {
                base_url: "https://stash.example.com".to_string(),
                username: None,
            },
        );
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.default_host.as_deref(), Some("work"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_host = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_get_and_set() {
        let mut config = Config::default();
        config.set("http.timeout_secs", "30").unwrap();
        config.set("http.insecure", "true").unwrap();
        assert_eq!(config.get("http.timeout_secs").as_deref(), Some("30"));
        assert_eq!(config.get("http.insecure").as_deref(), Some("true"));

        assert!(config.set("http.timeout_secs", "soon").is_err());
        assert!(config.set("default_host", "nowhere").is_err());
        assert!(config.set("editor", "vim").is_err());
        assert_eq!(config.get("editor"), None);
    }

    #[test]
    fn test_remove_default_host_clears_default() {
        let mut config = Config::default();
        config.add_host("a".to_string(), HostConfig::default());
        config.add_host("b".to_string(), HostConfig::default());
        assert_eq!(config.default_host.as_deref(), Some("a"));

        assert!(config.remove_host("a").is_some());
        assert_eq!(config.default_host, None);
        assert!(config.host("b").is_some());
    }

    #[test]
    fn test_http_transport() {
        let http = HttpConfig {
            timeout_secs: 3,
            insecure: true,
        };
        let transport = http.transport();
        assert_eq!(transport.timeout, Duration::from_secs(3));
        assert!(transport.accept_invalid_certs);
    }
}
