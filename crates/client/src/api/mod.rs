//! QuickShop HTTP API client.
//!
//! # Architecture
//!
//! - One explicitly constructed [`ApiClient`] per process, passed by
//!   reference to the session controller and loaders
//! - Bearer token and store slug cached in memory, loaded lazily from the
//!   [`CredentialStore`](crate::CredentialStore) on first use
//! - Every credential mutation goes through the client's set/clear choke
//!   point, which also publishes a [`CredentialEvent`]
//! - An HTTP 401 on any authenticated call clears credentials before the
//!   error is returned
//!
//! # Endpoints
//!
//! Most endpoints live under the primary base URL (`auth.php`, `ping.php`,
//! `dashboard.php`, `orders.php`, `store.php`, `upload.php`, and the
//! `api/stores/{slug}/...` catalog helpers). The products manager lives on
//! the stores host.

mod auth;
mod catalog;
mod client;
mod orders;
mod store;
pub mod types;

pub use auth::{INVALID_CREDENTIALS, LOGIN_FAILED};
pub use client::ApiClient;
pub use types::*;

use reqwest::StatusCode;
use thiserror::Error;

use crate::credentials::StoreError;

/// Problems detected locally, before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A store-scoped endpoint was called with no store slug resolved.
    #[error("store slug is missing")]
    MissingStoreSlug,

    /// An authenticated endpoint was called with no bearer token.
    #[error("not signed in")]
    NotSignedIn,

    /// An argument failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: String,
    },
}

/// Errors that can occur when talking to the QuickShop API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Http { status: StatusCode, body: String },

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Rejected locally before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server answered 2xx with `success: false`.
    #[error("API error: {0}")]
    Api(String),

    /// The requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persisting or clearing credentials failed.
    #[error("credential storage error: {0}")]
    Storage(#[from] StoreError),

    /// A request URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Whether the server rejected the bearer token. Credentials have already
    /// been cleared when this is true.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Short message suitable for an inline error state.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            _ if self.is_unauthorized() => {
                "session expired, please sign in again".to_owned()
            }
            Self::Transport(e) if e.is_timeout() => "the server took too long to respond".to_owned(),
            Self::Transport(_) => "cannot reach the server, check your internet connection".to_owned(),
            Self::Http { status, .. } => format!("server error ({})", status.as_u16()),
            Self::Decode(_) => "unexpected response from the server".to_owned(),
            Self::Validation(e) => e.to_string(),
            Self::Api(message) => message.clone(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Storage(_) => "could not access saved sign-in data".to_owned(),
            Self::Url(_) => "invalid server address".to_owned(),
        }
    }
}

/// Credential changes published by [`ApiClient::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialEvent {
    /// A login stored fresh credentials.
    SignedIn,
    /// Credentials were cleared on request (logout or storage reset).
    SignedOut,
    /// Credentials were cleared because the server rejected the token.
    Invalidated,
}
