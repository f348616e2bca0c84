//! Unified error handling for dbctl-core
//!
//! Every remote call, validation step and poll termination reports through
//! [`CoreError`]. Nothing in this crate recovers locally; callers decide what
//! to do with the error (the CLI treats all of them as fatal).
//!
//! # Example
//!
//! ```rust
//! use dbctl_core::CoreError;
//! use std::time::Duration;
//!
//! let err = CoreError::Timeout {
//!     target_state: "AVAILABLE".to_string(),
//!     waited: Duration::from_secs(3600),
//! };
//! assert!(err.is_timeout());
//! assert!(err.to_string().contains("AVAILABLE"));
//! ```

use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;

/// Core error type for provisioning and polling
#[derive(Error, Debug)]
pub enum CoreError {
    /// Non-success response from the database API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (connect, TLS, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Deadline elapsed before the resource reached the target state
    #[error("Timed out after {waited:?} before reaching state {target_state}")]
    Timeout {
        target_state: String,
        waited: Duration,
    },

    /// Wait was interrupted before the resource converged
    #[error("Cancelled while waiting for state {target_state}")]
    Cancelled { target_state: String },

    /// Caller input rejected before any remote call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Api { status: 404, .. })
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Api { status: 401 | 403, .. })
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, CoreError::Api { status, .. } if *status >= 500)
    }

    /// Returns true if the poller gave up waiting
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::Timeout { .. } => true,
            CoreError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns true if the wait was cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Cancelled { .. })
    }

    /// Returns true if this is a bad request error (400) or local validation failure
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            CoreError::Api { status: 400, .. } | CoreError::Validation(_)
        )
    }
}
