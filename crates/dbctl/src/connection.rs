//! Connection management for the database control-plane client

use std::path::PathBuf;

use dbctl_core::{Config, DatabaseClient, EnvOverrides};
use tracing::{debug, info, trace};

use crate::error::Result as CliResult;

/// Connection manager for creating authenticated clients
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    /// Load configuration from `--config-file` or the default location
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let (config, config_path) = match config_file {
            Some(path) => {
                debug!("Loading config from explicit path: {:?}", path);
                (Config::load_from_path(path)?, Some(path.clone()))
            }
            None => {
                debug!("Loading config from default location");
                (Config::load()?, None)
            }
        };

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Create a database client from profile settings with environment overrides
    ///
    /// When --config-file is given explicitly, `DBCTL_ENDPOINT` and
    /// `DBCTL_AUTH_TOKEN` are ignored and the file is the only source.
    pub fn create_database_client(&self, profile_name: Option<&str>) -> CliResult<DatabaseClient> {
        debug!("Creating database client");
        trace!("Profile name: {:?}", profile_name);

        let env = if self.config_path.is_none() {
            EnvOverrides::from_env()
        } else {
            info!("--config-file specified explicitly, ignoring environment variables");
            EnvOverrides::default()
        };

        if env.endpoint.is_some() {
            debug!("Found DBCTL_ENDPOINT environment variable");
        }
        if env.auth_token.is_some() {
            debug!("Found DBCTL_AUTH_TOKEN environment variable");
        }

        let settings = self.config.resolve_connection(profile_name, &env)?;
        info!("Using database API endpoint: {}", settings.endpoint);

        Ok(DatabaseClient::new(&settings)?)
    }
}
