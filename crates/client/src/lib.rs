//! QuickShop client - everything between the screens and the network.
//!
//! # Architecture
//!
//! - [`credentials`] - Persistent key-value store for the bearer token, store
//!   slug and user snapshot
//! - [`api`] - Explicitly constructed HTTP client; the only writer of
//!   credentials
//! - [`session`] - Authentication state machine driven by the API client
//! - [`resources`] - Loaders holding `{data, loading, error}` for dashboard,
//!   orders, products and store info
//! - [`config`] - Environment-driven configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use quickshop_client::{ApiClient, ClientConfig, MemoryCredentialStore, SessionController};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let client = ApiClient::new(&config, Arc::new(MemoryCredentialStore::new()))?;
//! let session = SessionController::new(client.clone());
//!
//! session.check_auth_status().await;
//! if !session.state().is_authenticated() {
//!     let password = secrecy::SecretString::from("secret");
//!     if let Err(message) = session.login("a@b.com", &password).await {
//!         eprintln!("{message}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod credentials;
pub mod resources;
pub mod session;

pub use api::{ApiClient, ApiError, CredentialEvent, LoginOutcome, ValidationError};
pub use config::{ClientConfig, ConfigError};
pub use credentials::{
    CredentialKey, CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError,
};
pub use resources::{
    DashboardLoader, MutationMode, OrdersLoader, ProductsLoader, ResourceLoader, ResourceSource,
    ResourceState, StoreInfoLoader,
};
pub use session::{SessionController, SessionEvent, SessionHandle, SessionState};
