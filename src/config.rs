//! Configuration management for pr-agent.
//!
//! This module handles the optional `.pr-agent/config.yaml` file in a
//! project directory and resolves it into concrete settings shared by the
//! webhook receiver, the MCP server and the CLI.

use crate::error::{Error, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file path relative to project root.
pub const CONFIG_FILE_PATH: &str = ".pr-agent/config.yaml";

/// Templates directory used when the config does not name one.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Host the webhook receiver binds to by default.
pub const DEFAULT_WEBHOOK_HOST: &str = "localhost";

/// Port the webhook receiver binds to by default.
pub const DEFAULT_WEBHOOK_PORT: u16 = 8080;

/// Route GitHub is configured to deliver to.
pub const WEBHOOK_PATH: &str = "/webhook/github";

/// Project configuration as written in the YAML file.
///
/// Every field is optional; relative paths are resolved against the
/// project directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Location of the events file shared with the webhook receiver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_file: Option<PathBuf>,

    /// Directory holding the PR description templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,

    /// Host for the webhook receiver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_host: Option<String>,

    /// Port for the webhook receiver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_port: Option<u16>,
}

impl ProjectConfig {
    /// Load config from a specific base directory.
    ///
    /// Returns `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(base_dir: &Path) -> Result<Option<Self>> {
        let config_path = Self::config_path(base_dir);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Save config to a specific base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, base_dir: &Path) -> Result<()> {
        let config_path = Self::config_path(base_dir);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config file path for a base directory.
    pub fn config_path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE_PATH)
    }
}

/// Fully resolved settings for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// The project (git working tree) directory.
    pub project_dir: PathBuf,
    /// The events file.
    pub events_file: PathBuf,
    /// The PR templates directory.
    pub templates_dir: PathBuf,
    /// Host for the webhook receiver.
    pub webhook_host: String,
    /// Port for the webhook receiver.
    pub webhook_port: u16,
}

impl Settings {
    /// Resolve settings for `project_dir`, reading its config file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is malformed, or if no events file
    /// is configured and the home directory cannot be determined.
    pub fn resolve(project_dir: &Path) -> Result<Self> {
        let config = ProjectConfig::load_from(project_dir)?.unwrap_or_default();
        Self::from_config(project_dir, config)
    }

    /// Resolve settings from an already-loaded config.
    ///
    /// # Errors
    ///
    /// Returns an error if no events file is configured and the home
    /// directory cannot be determined.
    pub fn from_config(project_dir: &Path, config: ProjectConfig) -> Result<Self> {
        let events_file = match config.events_file {
            Some(path) => absolutize(project_dir, path),
            None => paths::project_events_path(project_dir).ok_or_else(|| {
                Error::Config(
                    "cannot determine home directory; set events_file in the config".to_string(),
                )
            })?,
        };
        let templates_dir = absolutize(
            project_dir,
            config.templates_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATES_DIR)),
        );

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            events_file,
            templates_dir,
            webhook_host: config.webhook_host.unwrap_or_else(|| DEFAULT_WEBHOOK_HOST.to_string()),
            webhook_port: config.webhook_port.unwrap_or(DEFAULT_WEBHOOK_PORT),
        })
    }

    /// The `host:port` string the webhook receiver listens on.
    #[must_use]
    pub fn webhook_addr(&self) -> String {
        format!("{}:{}", self.webhook_host, self.webhook_port)
    }

    /// The URL to configure as the GitHub webhook target.
    #[must_use]
    pub fn webhook_url(&self) -> String {
        format!("http://{}{WEBHOOK_PATH}", self.webhook_addr())
    }
}

fn absolutize(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
