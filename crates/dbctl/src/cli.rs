//! CLI structure and argument definitions
//!
//! Every database flag maps one-to-one onto a [`CreationSpec`] field and every
//! wait flag onto [`PollConfig`]. Parsing produces a plain [`Cli`] value that is
//! passed by reference from `main`; there is no global option state.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser};
use dbctl_core::database::params::{DEFAULT_CHARACTER_SET, DEFAULT_NATIONAL_CHARACTER_SET};
use dbctl_core::{CreationSpec, PollConfig};

use crate::error::Result as CliResult;
use crate::output::OutputFormat;

const MAX_WAIT_SECS: u64 = dbctl_core::progress::MAX_WAIT.as_secs();

/// Create a managed database and optionally wait for a lifecycle state
#[derive(Parser, Debug)]
#[command(name = "dbctl")]
#[command(version, about = "Create a managed database and optionally wait for it")]
#[command(long_about = "
Create a managed database under an existing database home and optionally
block until it reaches a lifecycle state.

The API endpoint and token come from the selected profile in the config file
or from DBCTL_ENDPOINT / DBCTL_AUTH_TOKEN.

EXAMPLES:
    # Create a database and return immediately
    dbctl --db-name orcl --db-home-id ocid1.dbhome.oc1..aaaa --admin-password 'Welcome#1234'

    # Create and wait until it is AVAILABLE, checking every minute
    dbctl -d orcl -o ocid1.dbhome.oc1..aaaa -p 'Welcome#1234' -w AVAILABLE -i 60

    # Show what would be sent without calling the API
    dbctl -d orcl -o ocid1.dbhome.oc1..aaaa -p 'Welcome#1234' --dry-run
")]
pub struct Cli {
    #[command(flatten)]
    pub database: DatabaseArgs,

    #[command(flatten)]
    pub wait: WaitArgs,

    /// Display the request only; make no API calls
    #[arg(long, short = 't')]
    pub dry_run: bool,

    /// Profile to use for this command
    #[arg(long, env = "DBCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, env = "DBCTL_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Output format for the created database
    #[arg(long, short = 'f', value_enum, default_value = "json")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Database creation arguments
#[derive(Args, Clone)]
pub struct DatabaseArgs {
    /// Database name
    #[arg(long, short = 'd')]
    pub db_name: String,

    /// Database workload: OLTP or DSS (anything other than OLTP means DSS)
    #[arg(long, short = 'l', default_value = "OLTP")]
    pub db_workload: String,

    /// Database home id
    #[arg(long, short = 'o')]
    pub db_home_id: String,

    /// Database admin password
    #[arg(long, short = 'p', env = "DBCTL_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,

    /// Database unique name
    #[arg(long, short = 'u', default_value = "")]
    pub db_unique_name: String,

    /// Character set
    #[arg(long, short = 's', default_value = DEFAULT_CHARACTER_SET)]
    pub character_set: String,

    /// National character set
    #[arg(long, short = 'n', default_value = DEFAULT_NATIONAL_CHARACTER_SET)]
    pub national_character_set: String,

    /// Pluggable database name
    #[arg(long, short = 'b', default_value = "")]
    pub pdb_name: String,

    /// TDE wallet password
    #[arg(
        long,
        short = 'x',
        default_value = "",
        env = "DBCTL_TDE_WALLET_PASSWORD",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub tde_wallet_password: String,
}

/// Convergence wait arguments
#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Wait for state: AVAILABLE, TERMINATED, etc. (empty disables waiting)
    #[arg(long, short = 'w', default_value = "")]
    pub wait_for_state: String,

    /// Polling interval in seconds
    #[arg(long, short = 'i', default_value = "30", value_parser = clap::value_parser!(u64).range(1..=MAX_WAIT_SECS))]
    pub wait_interval_seconds: u64,

    /// Maximum time to wait in seconds
    #[arg(long, short = 'm', default_value = "3600", value_parser = clap::value_parser!(u64).range(1..=MAX_WAIT_SECS))]
    pub max_wait_seconds: u64,
}

impl fmt::Debug for DatabaseArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &str| if value.is_empty() { "" } else { "********" };
        f.debug_struct("DatabaseArgs")
            .field("db_name", &self.db_name)
            .field("db_workload", &self.db_workload)
            .field("db_home_id", &self.db_home_id)
            .field("admin_password", &redact(&self.admin_password))
            .field("db_unique_name", &self.db_unique_name)
            .field("character_set", &self.character_set)
            .field("national_character_set", &self.national_character_set)
            .field("pdb_name", &self.pdb_name)
            .field("tde_wallet_password", &redact(&self.tde_wallet_password))
            .finish()
    }
}

impl DatabaseArgs {
    /// Resolve flags into a creation spec
    pub fn to_spec(&self) -> CreationSpec {
        CreationSpec::new(&self.db_name, &self.db_home_id, &self.admin_password)
            .with_workload(&self.db_workload)
            .with_unique_name(&self.db_unique_name)
            .with_character_set(&self.character_set)
            .with_national_character_set(&self.national_character_set)
            .with_pdb_name(&self.pdb_name)
            .with_wallet_credential(&self.tde_wallet_password)
    }
}

impl WaitArgs {
    /// Resolve flags into a poll configuration
    pub fn to_poll_config(&self) -> CliResult<PollConfig> {
        Ok(PollConfig::new(
            Some(self.wait_for_state.clone()),
            Duration::from_secs(self.wait_interval_seconds),
            Duration::from_secs(self.max_wait_seconds),
        )?)
    }
}
