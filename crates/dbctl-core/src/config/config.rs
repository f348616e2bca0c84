//! Configuration management for dbctl
//!
//! Handles configuration loading from files and environment variables.
//! Configuration is stored in TOML format with support for multiple named profiles.

use directories::ProjectDirs;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::{ConfigError, Result};

/// Environment variable that overrides the API endpoint
pub const ENDPOINT_ENV: &str = "DBCTL_ENDPOINT";
/// Environment variable that overrides the auth token
pub const AUTH_TOKEN_ENV: &str = "DBCTL_AUTH_TOKEN";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Profile {
    /// Full API base URL; wins over `region`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Region identifier used to derive the endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Bearer token presented to the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Profile {
    /// Endpoint for this profile, derived from the region when not set explicitly
    pub fn resolved_endpoint(&self) -> Option<String> {
        self.endpoint.clone().or_else(|| {
            self.region
                .as_ref()
                .map(|region| format!("https://database.{}.oraclecloud.com", region))
        })
    }
}

/// Values picked up from the process environment
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub endpoint: Option<String>,
    pub auth_token: Option<String>,
}

impl EnvOverrides {
    /// Read `DBCTL_ENDPOINT` and `DBCTL_AUTH_TOKEN`
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var(ENDPOINT_ENV).ok().filter(|v| !v.is_empty()),
            auth_token: std::env::var(AUTH_TOKEN_ENV).ok().filter(|v| !v.is_empty()),
        }
    }

    fn is_complete(&self) -> bool {
        self.endpoint.is_some() && self.auth_token.is_some()
    }
}

/// Everything the HTTP client needs to reach the API
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub endpoint: String,
    pub auth_token: SecretString,
    pub timeout: Duration,
}

impl ConnectionSettings {
    /// Build settings, validating and normalizing the endpoint
    pub fn new(endpoint: &str, auth_token: SecretString, timeout: Duration) -> Result<Self> {
        let trimmed = endpoint.trim_end_matches('/');
        url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            endpoint: trimmed.to_string(),
            auth_token,
            timeout,
        })
    }
}

impl Config {
    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Pick the profile to use
    ///
    /// Resolution order: explicit name, `default_profile`, then the only
    /// configured profile if there is exactly one.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<(&str, &Profile)> {
        if let Some(name) = explicit_profile {
            return self
                .profiles
                .get_key_value(name)
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| ConfigError::ProfileNotFound {
                    name: name.to_string(),
                });
        }

        if let Some(name) = self.default_profile.as_deref() {
            return self
                .profiles
                .get_key_value(name)
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| ConfigError::ProfileNotFound {
                    name: name.to_string(),
                });
        }

        if self.profiles.len() == 1
            && let Some((name, profile)) = self.profiles.iter().next()
        {
            return Ok((name.as_str(), profile));
        }

        match self.profiles.len() {
            0 => Err(ConfigError::NoProfileSelected {
                suggestion: format!(
                    "Create a profile in the config file or set {} and {}.",
                    ENDPOINT_ENV, AUTH_TOKEN_ENV
                ),
            }),
            _ => Err(ConfigError::NoProfileSelected {
                suggestion: "Multiple profiles exist; pass --profile or set default_profile."
                    .to_string(),
            }),
        }
    }

    /// Resolve connection settings from the environment and the selected profile
    ///
    /// Environment values win over the profile. When both endpoint and token
    /// come from the environment no profile is required at all.
    pub fn resolve_connection(
        &self,
        explicit_profile: Option<&str>,
        env: &EnvOverrides,
    ) -> Result<ConnectionSettings> {
        if explicit_profile.is_none() && env.is_complete() {
            let endpoint = env.endpoint.as_deref().unwrap_or_default();
            let token = env.auth_token.clone().unwrap_or_default();
            return ConnectionSettings::new(
                endpoint,
                SecretString::new(token.into()),
                Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            );
        }

        let (name, profile) = self.resolve_profile(explicit_profile)?;

        let endpoint = env
            .endpoint
            .clone()
            .or_else(|| profile.resolved_endpoint())
            .ok_or_else(|| ConfigError::MissingEndpoint {
                profile: name.to_string(),
            })?;

        let token = env
            .auth_token
            .clone()
            .or_else(|| profile.auth_token.clone())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingCredentials {
                profile: name.to_string(),
            })?;

        ConnectionSettings::new(
            &endpoint,
            SecretString::new(token.into()),
            Duration::from_secs(profile.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        )
    }

    /// Get the path to the configuration file
    ///
    /// On Linux: ~/.config/dbctl/config.toml
    /// On macOS: ~/Library/Application Support/dev.dbctl.dbctl/config.toml
    /// On Windows: %APPDATA%\dbctl\dbctl\config\config.toml
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("dev", "dbctl", "dbctl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in configuration content
    ///
    /// Supports ${VAR} and ${VAR:-default} syntax. Unknown variables are left as-is
    /// so profiles that are not selected never fail to load.
    ///
    /// Example:
    /// ```toml
    /// auth_token = "${DBCTL_PROD_TOKEN}"
    /// region = "${DBCTL_REGION:-us-ashburn-1}"
    /// ```
    fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}
