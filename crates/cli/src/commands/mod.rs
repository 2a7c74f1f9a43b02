//! Command implementations.

pub mod auth;
pub mod catalog;
pub mod orders;
pub mod storage;
pub mod store;

use std::sync::Arc;

use quickshop_client::{ApiClient, ClientConfig, FileCredentialStore, SessionController, SessionState};
use tracing::debug;

use crate::error::CliError;

/// Client, session and configuration shared by every command.
pub struct App {
    pub config: ClientConfig,
    pub client: ApiClient,
    pub session: SessionController,
}

impl App {
    /// Build the app from environment configuration, with credentials saved
    /// to the configured file.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` if the environment is invalid.
    pub fn from_env() -> Result<Self, CliError> {
        let config = ClientConfig::from_env()?;
        debug!(path = %config.credentials_path.display(), "using credential file");

        let store = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
        let client = ApiClient::new(&config, store)?;
        let session = SessionController::new(client.clone());

        Ok(Self {
            config,
            client,
            session,
        })
    }

    /// Validate the saved session, failing when not signed in.
    pub async fn require_session(&self) -> Result<SessionState, CliError> {
        let state = self.session.check_auth_status().await;
        if state.is_authenticated() {
            Ok(state)
        } else {
            Err(CliError::NotSignedIn)
        }
    }
}
