//! Configuration for suds.
//!
//! Settings are read from `suds.toml` and layered (file → environment → CLI).
//! The file is looked up in `.suds/suds.toml` under the working directory
//! first, then in the user config directory (`~/.config/suds/suds.toml` on
//! Linux).
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:5000"
//! token = "eyJhbGciOi..."
//! timeout_secs = 30
//!
//! [push]
//! enabled = true
//! reconnect_delay_secs = 3
//! ```
//!
//! `SUDS_API_URL` and `SUDS_TOKEN` override the file; `--api-url` and
//! `--token` override both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ApiSettings;
use crate::api::client::normalize_base_url;
use crate::errors::ConfigError;
use crate::push::PushSettings;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_RECONNECT_DELAY_SECS: u64 = 3;

pub const CONFIG_DIR: &str = ".suds";
pub const CONFIG_FILE: &str = "suds.toml";

pub const ENV_API_URL: &str = "SUDS_API_URL";
pub const ENV_TOKEN: &str = "SUDS_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token attached to every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Unset means requests never time out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSection {
    #[serde(default = "default_push_enabled")]
    pub enabled: bool,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

fn default_push_enabled() -> bool {
    true
}

fn default_reconnect_delay() -> u64 {
    DEFAULT_RECONNECT_DELAY_SECS
}

impl Default for PushSection {
    fn default() -> Self {
        Self {
            enabled: default_push_enabled(),
            reconnect_delay_secs: default_reconnect_delay(),
        }
    }
}

/// The complete suds.toml structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SudsToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub push: PushSection,
}

impl SudsToml {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `<dir>/suds.toml`, or defaults when it does not exist.
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if normalize_base_url(&self.api.base_url).is_err() {
            warnings.push(format!(
                "Invalid api.base_url '{}': must start with http:// or https://",
                self.api.base_url
            ));
        }
        if self.api.timeout_secs == Some(0) {
            warnings.push("api.timeout_secs = 0 makes every request fail; remove it to disable the timeout".to_string());
        }
        if self.api.token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            warnings.push("api.token is empty; requests will be sent without credentials".to_string());
        }
        if self.push.reconnect_delay_secs == 0 {
            warnings.push("push.reconnect_delay_secs = 0 reconnects in a tight loop".to_string());
        }

        warnings
    }
}

/// Project-local config file path.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Per-user config file path, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("suds").join(CONFIG_FILE))
}

/// First existing file among the project and user locations.
pub fn locate(project_dir: &Path, user_path: Option<&Path>) -> Option<PathBuf> {
    let project = project_config_path(project_dir);
    if project.exists() {
        return Some(project);
    }
    user_path.filter(|p| p.exists()).map(Path::to_path_buf)
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub token: Option<String>,
}

/// Where the effective base URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Default,
    File,
    Env,
    Cli,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Origin::Default => "default",
            Origin::File => "file",
            Origin::Env => "env",
            Origin::Cli => "cli",
        })
    }
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct SudsConfig {
    /// File the settings were read from, if any.
    pub source: Option<PathBuf>,
    pub toml: SudsToml,
    pub base_url: String,
    pub base_url_origin: Origin,
    pub token: Option<String>,
}

impl SudsConfig {
    /// Resolve against the real environment and user config directory.
    pub fn resolve(project_dir: &Path, cli: CliOverrides) -> Result<Self, ConfigError> {
        let user = user_config_path();
        Self::resolve_with(project_dir, user.as_deref(), cli, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit user config path and environment lookup.
    pub fn resolve_with<F>(
        project_dir: &Path,
        user_path: Option<&Path>,
        cli: CliOverrides,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = locate(project_dir, user_path);
        let toml = match &source {
            Some(path) => SudsToml::load(path)?,
            None => SudsToml::default(),
        };
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let (base_url, base_url_origin) = if let Some(url) = cli.api_url {
            (url, Origin::Cli)
        } else if let Some(url) = lookup(ENV_API_URL) {
            (url, Origin::Env)
        } else if source.is_some() {
            (toml.api.base_url.clone(), Origin::File)
        } else {
            (toml.api.base_url.clone(), Origin::Default)
        };

        let token = cli
            .token
            .or_else(|| lookup(ENV_TOKEN))
            .or_else(|| toml.api.token.clone())
            .filter(|t| !t.is_empty());

        Ok(Self {
            source,
            toml,
            base_url,
            base_url_origin,
            token,
        })
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            timeout: self.toml.api.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn push_enabled(&self) -> bool {
        self.toml.push.enabled
    }

    pub fn push_settings(&self) -> PushSettings {
        PushSettings {
            reconnect_delay: Duration::from_secs(self.toml.push.reconnect_delay_secs),
        }
    }

    /// File warnings plus checks on the effective values.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.toml.validate();
        if self.base_url_origin != Origin::File
            && self.base_url_origin != Origin::Default
            && normalize_base_url(&self.base_url).is_err()
        {
            warnings.push(format!(
                "Invalid API URL '{}' from {}: must start with http:// or https://",
                self.base_url, self.base_url_origin
            ));
        }
        warnings
    }
}
