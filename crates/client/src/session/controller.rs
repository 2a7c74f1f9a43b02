//! Session controller and read-only handle.

use std::sync::Arc;

use quickshop_core::UserRecord;
use secrecy::SecretString;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::state::{SessionEvent, SessionState, reduce};
use crate::api::{ApiClient, CredentialEvent, LoginOutcome};

/// Owner of the session state.
///
/// Cheap to clone; clones drive the same state.
#[derive(Clone)]
pub struct SessionController {
    client: ApiClient,
    state: Arc<watch::Sender<SessionState>>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state.borrow().name())
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Create a controller in [`SessionState::Initializing`].
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::Initializing);
        Self {
            client,
            state: Arc::new(state),
        }
    }

    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Read-only view for consumers.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.state.subscribe(),
        }
    }

    pub(crate) fn dispatch(&self, event: SessionEvent) {
        self.state.send_modify(|state| {
            let next = reduce(state, event);
            debug!(from = state.name(), to = next.name(), "session transition");
            *state = next;
        });
    }

    /// Validate stored credentials and settle into a signed-in or signed-out
    /// state.
    ///
    /// Never fails: any error while validating counts as signed out.
    #[instrument(skip(self))]
    pub async fn check_auth_status(&self) -> SessionState {
        self.dispatch(SessionEvent::CheckStarted);

        if !self.client.is_authenticated().await {
            self.dispatch(SessionEvent::NoStoredCredentials);
            return self.state();
        }

        match self.client.get_current_user().await {
            Ok(user) => self.dispatch(SessionEvent::UserResolved(user)),
            Err(e) => {
                warn!(error = %e, "auth status check failed");
                self.dispatch(SessionEvent::UserResolved(None));
            }
        }

        self.state()
    }

    /// Sign in.
    ///
    /// # Errors
    ///
    /// Returns a display message when the server rejects the credentials or
    /// cannot be reached. The session is then in
    /// [`SessionState::AuthFailed`] with the same message.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<UserRecord, String> {
        self.dispatch(SessionEvent::LoginStarted);

        match self.client.login(email, password).await {
            Ok(LoginOutcome::SignedIn { user, token }) => {
                info!(user_id = %user.id, "signed in");
                self.dispatch(SessionEvent::LoginSucceeded {
                    user: user.clone(),
                    token,
                });
                Ok(user)
            }
            Ok(LoginOutcome::Rejected { error }) => {
                self.dispatch(SessionEvent::LoginFailed(error.clone()));
                Err(error)
            }
            Err(e) => {
                warn!(error = %e, "login request failed");
                let message = e.user_message();
                self.dispatch(SessionEvent::LoginFailed(message.clone()));
                Err(message)
            }
        }
    }

    /// Sign out. The session ends unauthenticated even if clearing stored
    /// credentials fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.client.logout().await {
            warn!(error = %e, "logout did not complete cleanly");
        }
        self.dispatch(SessionEvent::LoggedOut);
    }

    /// Follow credential events from the client in a background task.
    ///
    /// A 401 anywhere in the app moves an authenticated session to
    /// [`SessionState::Unauthenticated`]. The task ends when the client's
    /// event channel closes.
    pub fn watch_credentials(&self) -> JoinHandle<()> {
        let mut events = self.client.subscribe();
        let controller = self.clone();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(CredentialEvent::Invalidated) => {
                        info!("credentials invalidated by server");
                        controller.dispatch(SessionEvent::CredentialsInvalidated);
                    }
                    Ok(CredentialEvent::SignedOut) => controller.dispatch(SessionEvent::LoggedOut),
                    Ok(CredentialEvent::SignedIn) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "credential events lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

/// Read-only view of the session state.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_authenticated()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserRecord> {
        self.rx.borrow().user().cloned()
    }

    /// Wait for the next state change. Returns `false` once the controller
    /// is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until no check or login is in progress and return that state.
    pub async fn settled(&mut self) -> SessionState {
        let settled = self
            .rx
            .wait_for(|state| !state.is_loading())
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.current())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use quickshop_core::{UserId, UserRecord};

    use super::*;
    use crate::config::ClientConfig;
    use crate::credentials::MemoryCredentialStore;

    fn controller() -> SessionController {
        let config = ClientConfig::with_base_urls("http://127.0.0.1:9/api2", "http://127.0.0.1:9").unwrap();
        let client = ApiClient::new(&config, Arc::new(MemoryCredentialStore::new())).unwrap();
        SessionController::new(client)
    }

    #[tokio::test]
    async fn test_check_without_credentials_settles_unauthenticated() {
        let session = controller();
        let mut handle = session.handle();

        let state = session.check_auth_status().await;
        assert!(matches!(state, SessionState::Unauthenticated));
        assert!(!handle.settled().await.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_without_credentials_is_harmless() {
        let session = controller();
        session.logout().await;
        assert!(matches!(session.state(), SessionState::Unauthenticated));
    }

    #[tokio::test]
    async fn test_invalidation_event_signs_out() {
        let session = controller();
        let watcher = session.watch_credentials();

        session
            .client()
            .set_credentials(
                SecretString::from("tok"),
                UserRecord::minimal(UserId::new(1)),
            )
            .await
            .unwrap();
        session.dispatch(SessionEvent::LoginSucceeded {
            user: UserRecord::minimal(UserId::new(1)),
            token: SecretString::from("tok"),
        });

        let mut handle = session.handle();
        session
            .client()
            .clear_with(CredentialEvent::Invalidated)
            .await
            .unwrap();

        assert!(handle.changed().await);
        assert!(!handle.is_authenticated());
        watcher.abort();
    }
}
