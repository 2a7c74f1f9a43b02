//! Resource loaders.
//!
//! Each loader holds one `{data, loading, error}` snapshot for a resource
//! (dashboard, orders, products, store info), gated on the session being
//! authenticated. Fetches are explicit: callers decide when to
//! [`start`](ResourceLoader::start) and [`refresh`](ResourceLoader::refresh).
//! Errors never escape a loader; they land in [`ResourceState::error`].

mod loader;
mod orders;
mod sources;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

pub use loader::ResourceLoader;
pub use orders::{OrdersLoader, OrdersSource};
pub use sources::{
    DashboardLoader, DashboardSource, ProductsLoader, ProductsSource, StoreInfoLoader,
    StoreInfoSource,
};

use crate::api::{ApiClient, ApiError};
use crate::session::SessionState;

/// Snapshot held by a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState<T> {
    /// Last successfully fetched value. Kept when a later fetch fails.
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Fetches one resource for a [`ResourceLoader`].
#[async_trait]
pub trait ResourceSource: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    /// Name used in log events.
    const NAME: &'static str;

    /// Fetch the resource. Only called while `session` is authenticated.
    async fn fetch(&self, client: &ApiClient, session: &SessionState) -> Result<Self::Output, ApiError>;
}

/// How order status changes and deletions reach the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationMode {
    /// Edit the loaded list only. The server is not told.
    #[default]
    LocalOnly,
    /// Edit the loaded list, then send the change. A failed request
    /// triggers a refetch, which discards the local edit.
    WriteThrough,
}

impl MutationMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalOnly => "local",
            Self::WriteThrough => "write-through",
        }
    }
}

impl fmt::Display for MutationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mutation mode {0:?}, expected \"local\" or \"write-through\"")]
pub struct ParseMutationModeError(String);

impl FromStr for MutationMode {
    type Err = ParseMutationModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "local-only" => Ok(Self::LocalOnly),
            "write-through" | "writethrough" => Ok(Self::WriteThrough),
            other => Err(ParseMutationModeError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_mode_parse() {
        assert_eq!("local".parse::<MutationMode>().unwrap(), MutationMode::LocalOnly);
        assert_eq!(" Write-Through ".parse::<MutationMode>().unwrap(), MutationMode::WriteThrough);
        assert!("remote".parse::<MutationMode>().is_err());
        assert_eq!(MutationMode::default().to_string(), "local");
    }

    #[test]
    fn test_default_state_is_idle() {
        let state = ResourceState::<u32>::default();
        assert!(state.data.is_none());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }
}
