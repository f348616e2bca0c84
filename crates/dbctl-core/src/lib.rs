//! # dbctl-core
//!
//! Provision a managed database through the control-plane API and wait for
//! it to converge on a lifecycle state.
//!
//! The crate has two moving parts:
//!
//! - [`database`]: a stateless client exposing `create` and `get_status`
//!   behind the [`DatabaseApi`] trait.
//! - [`progress`]: the convergence poller, [`wait_for_state`], which queries
//!   status on a fixed interval until the target state, the deadline, a
//!   query error, or cancellation ends the wait.
//!
//! [`config`] resolves where the API lives and how to authenticate against it.
//! All fallible operations return [`Result`] with [`CoreError`]; nothing here
//! retries or cleans up after a failure.
//!
//! ```rust,ignore
//! use dbctl_core::{Config, CreationSpec, DatabaseApi, DatabaseClient, EnvOverrides, PollConfig};
//!
//! let settings = Config::load()?.resolve_connection(None, &EnvOverrides::from_env())?;
//! let client = DatabaseClient::new(&settings)?;
//!
//! let spec = CreationSpec::new("orcl", home_id, password);
//! let db = client.create(&spec).await?;
//!
//! let poll = PollConfig::new(Some("AVAILABLE".into()), interval, deadline)?;
//! dbctl_core::wait_for_state(&client, &db.id, &poll, std::future::pending::<()>(), None).await?;
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod progress;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::{Config, ConfigError, ConnectionSettings, EnvOverrides, Profile};
pub use database::{
    CreationSpec, Database, DatabaseApi, DatabaseClient, LifecycleState, WorkloadType,
};
pub use error::{CoreError, Result};
pub use progress::{
    PollConfig, PollReport, ProgressCallback, ProgressEvent, wait_for_state,
};
