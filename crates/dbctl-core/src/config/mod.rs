//! Configuration and profile management
//!
//! Profiles live in a TOML file and describe where the database API is and
//! which token authenticates against it. Environment variables can supply or
//! override both, which is how CI usually runs the tool.

// Nested config module matches the subsystem name
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;

pub use config::{Config, ConnectionSettings, EnvOverrides, Profile};
pub use error::{ConfigError, Result};
