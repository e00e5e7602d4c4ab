//! fbtraffic configuration (INI-style `[section]` + `key = value` format)
//!
//! Loaded from `~/.config/fritzplasmoid.ini`:
//!
//! ```ini
//! [credentials]
//! host = fritz.box
//!
//! [connection]
//! timeout = 5
//!
//! [source]
//! interfaces = eth0, wan0
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "fritzplasmoid.ini";
pub const DEFAULT_HOST: &str = "fritz.box";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Get the config file path: <config dir>/fritzplasmoid.ini
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Everything a connector needs to reach the device
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    pub host: String,
    /// Upper bound on a single counter read
    pub timeout: Duration,
    /// Interfaces to sum counters over; empty means every non-loopback one
    pub interfaces: Vec<String>,
}

impl DeviceConfig {
    /// Load from the default location
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(ConfigError::Read(e)),
        };
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut has_credentials = false;
        let mut host = None;
        let mut timeout_secs = DEFAULT_TIMEOUT_SECS;
        let mut interfaces = Vec::new();
        let mut section = String::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = name.trim().to_ascii_lowercase();
                has_credentials |= section == "credentials";
                continue;
            }
            // Split at the first delimiter of either kind
            let Some(pos) = line.find(|c: char| c == '=' || c == ':') else {
                continue;
            };
            let key = line[..pos].trim().to_ascii_lowercase();
            let value = line[pos + 1..].trim();
            match (section.as_str(), key.as_str()) {
                ("credentials", "host") => {
                    if !value.is_empty() {
                        host = Some(value.to_string());
                    }
                }
                ("connection", "timeout") => {
                    timeout_secs = value.parse::<u64>().ok().filter(|v| *v > 0).ok_or_else(|| {
                        ConfigError::InvalidValue {
                            key: "connection.timeout".into(),
                            value: value.to_string(),
                        }
                    })?;
                }
                ("source", "interfaces") => {
                    interfaces = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect();
                }
                _ => {} // Ignore unknown keys
            }
        }

        if !has_credentials {
            return Err(ConfigError::MissingSection("credentials".into()));
        }

        Ok(Self {
            host: host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            interfaces,
        })
    }
}
