//! Error types for dbctl
//!
//! Every failure in the binary funnels into [`DbCtlError`] and is printed once,
//! by `main`, as a cargo-style diagnostic before the process exits with 1.

use colored::Colorize;
use dbctl_core::{ConfigError, CoreError};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Timeout: Timed out after 3600s before reaching state AVAILABLE
///
///   tip: The database was created and was not deleted; it may still be provisioning
/// ```
pub struct CliDiagnostic {
    message: String,
    tips: Vec<String>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            tips: Vec::new(),
        }
    }

    /// Add a tip line.
    pub fn tip(mut self, description: &str) -> Self {
        self.tips.push(description.to_string());
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        for description in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
        }
    }
}

/// Main error type for the dbctl application
#[derive(Error, Debug)]
pub enum DbCtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Cancelled: {message}")]
    Cancelled { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for dbctl operations
pub type Result<T> = std::result::Result<T, DbCtlError>;

impl DbCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            DbCtlError::Configuration(_) => vec![
                "Set DBCTL_ENDPOINT and DBCTL_AUTH_TOKEN, or add a profile to the config file"
                    .to_string(),
                "Select a profile explicitly with --profile <name>".to_string(),
            ],
            DbCtlError::AuthenticationFailed { .. } => vec![
                "Check that the auth token is valid and not expired".to_string(),
                "Verify the token has permission to manage databases in this compartment"
                    .to_string(),
            ],
            DbCtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the endpoint or region in your profile".to_string(),
            ],
            DbCtlError::ApiError { message } if message.contains("404") => vec![
                "Verify the database home id is correct".to_string(),
                "Check that you're using the correct profile and region".to_string(),
            ],
            DbCtlError::Timeout { .. } | DbCtlError::Cancelled { .. } => vec![
                "The database was created and was not deleted; it may still be provisioning"
                    .to_string(),
                "Increase --max-wait-seconds to wait longer".to_string(),
            ],
            DbCtlError::InvalidInput { .. } => {
                vec!["Check the command syntax: dbctl --help".to_string()]
            }
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion);
        }

        diag.print();
    }
}

impl From<CoreError> for DbCtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Timeout { .. } => DbCtlError::Timeout {
                message: err.to_string(),
            },
            CoreError::Cancelled { .. } => DbCtlError::Cancelled {
                message: err.to_string(),
            },
            CoreError::Validation(message) => DbCtlError::InvalidInput { message },
            CoreError::Config(config_err) => DbCtlError::from(config_err),
            CoreError::Api { status, message } if status == 401 || status == 403 => {
                DbCtlError::AuthenticationFailed {
                    message: format!("HTTP {}: {}", status, message),
                }
            }
            CoreError::Api { status, message } => DbCtlError::ApiError {
                message: format!("HTTP {}: {}", status, message),
            },
            CoreError::Http(e) if e.is_connect() || e.is_timeout() => {
                DbCtlError::ConnectionError {
                    message: e.to_string(),
                }
            }
            CoreError::Http(e) => DbCtlError::ApiError {
                message: e.to_string(),
            },
            CoreError::InvalidResponse(message) => DbCtlError::ApiError { message },
        }
    }
}

impl From<ConfigError> for DbCtlError {
    fn from(err: ConfigError) -> Self {
        DbCtlError::Configuration(err.to_string())
    }
}

impl From<std::io::Error> for DbCtlError {
    fn from(err: std::io::Error) -> Self {
        DbCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for DbCtlError {
    fn from(err: anyhow::Error) -> Self {
        DbCtlError::OutputError {
            message: err.to_string(),
        }
    }
}
