//! CLI error type.

use quickshop_client::{ApiError, ConfigError};
use thiserror::Error;

/// Errors that end a command with exit code 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    /// A loader finished with an error message.
    #[error("{0}")]
    Resource(String),

    #[error("Not signed in. Run `qs-cli login` first.")]
    NotSignedIn,

    #[error("Sign-in failed: {0}")]
    LoginFailed(String),

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    #[error("Refusing to delete order {0} without --yes")]
    Unconfirmed(i64),

    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
