//! Configuration management for the pyg CLI
//!
//! The config file is TOML and lives at `~/.config/pyg/pyg.toml` unless
//! `PYG_CONFIG` or a `.pyg_config_path` pointer file says otherwise.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use which::which;

/// Default introspection tool that dumps a whole module
pub const DEFAULT_DUMP_TOOL: &str = "pydump";

/// Default tool that fetches signatures for named symbols from the doc site
pub const DEFAULT_SIGFETCH_TOOL: &str = "pysigfetch";

/// Default bound on each introspection tool call
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Name of the pointer file that redirects the config location
pub const POINTER_FILE: &str = ".pyg_config_path";

/// Keys accepted by `pyg config set`
pub const KNOWN_KEYS: &[&str] = &[
    "dump-tool",
    "sigfetch-tool",
    "timeout-secs",
    "keyword-policy",
    "unsupported-policy",
    "output-dir",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown config key: {0}. Supported keys: {keys}", keys = KNOWN_KEYS.join(", "))]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("{0} is not installed or not on PATH")]
    ToolNotFound(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigfetch_tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsupported_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
}

impl Config {
    /// Resolve the config file location
    pub fn path() -> Result<PathBuf, ConfigError> {
        // Explicit override for tests and isolated runs
        if let Ok(env_path) = std::env::var("PYG_CONFIG") {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let default = Self::default_path()?;

        if let Some(parent) = default.parent() {
            let pointer = parent.join(POINTER_FILE);
            if let Ok(contents) = fs::read_to_string(&pointer) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return Ok(PathBuf::from(trimmed));
                }
            }
        }

        Ok(default)
    }

    /// Platform default config path, ignoring overrides
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        #[cfg(not(target_os = "windows"))]
        let default = dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(".config")
            .join("pyg")
            .join("pyg.toml");

        #[cfg(target_os = "windows")]
        let default = dirs::config_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join("pyg")
            .join("pyg.toml");

        Ok(default)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path; a missing file yields the default config
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "dump-tool" => self.dump_tool.clone(),
            "sigfetch-tool" => self.sigfetch_tool.clone(),
            "timeout-secs" => self.timeout_secs.map(|t| t.to_string()),
            "keyword-policy" => self.keyword_policy.clone(),
            "unsupported-policy" => self.unsupported_policy.clone(),
            "output-dir" => self.output_dir.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "dump-tool" => self.dump_tool = Some(value),
            "sigfetch-tool" => self.sigfetch_tool = Some(value),
            "timeout-secs" => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.clone(),
                    })?;
                self.timeout_secs = Some(secs);
            }
            "keyword-policy" => self.keyword_policy = Some(value),
            "unsupported-policy" => self.unsupported_policy = Some(value),
            "output-dir" => self.output_dir = Some(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.dump_tool.is_none()
            && self.sigfetch_tool.is_none()
            && self.timeout_secs.is_none()
            && self.keyword_policy.is_none()
            && self.unsupported_policy.is_none()
            && self.output_dir.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KNOWN_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn resolve_dump_tool(&self) -> Result<PathBuf, ConfigError> {
        resolve_tool(self.dump_tool.as_deref(), DEFAULT_DUMP_TOOL)
    }

    pub fn resolve_sigfetch_tool(&self) -> Result<PathBuf, ConfigError> {
        resolve_tool(self.sigfetch_tool.as_deref(), DEFAULT_SIGFETCH_TOOL)
    }
}

/// Find an introspection tool: a configured path wins when it exists,
/// otherwise the configured (or default) name is looked up on `PATH`.
pub fn resolve_tool(configured: Option<&str>, default_name: &str) -> Result<PathBuf, ConfigError> {
    let name = configured
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(default_name);

    let as_path = Path::new(name);
    if as_path.components().count() > 1 {
        if as_path.is_file() {
            return Ok(as_path.to_path_buf());
        }
        return Err(ConfigError::ToolNotFound(name.to_string()));
    }

    which(name).map_err(|_| ConfigError::ToolNotFound(name.to_string()))
}
