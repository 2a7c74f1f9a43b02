//! Login, logout and token validation.

use quickshop_core::UserRecord;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use super::client::Body;
use super::types::{LoginOutcome, LoginResponse, PingResponse};
use super::{ApiClient, ApiError, CredentialEvent};

/// Shown when the server answers a login with 401.
pub const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Shown when the server refuses a login without saying why.
pub const LOGIN_FAILED: &str = "login failed";

impl ApiClient {
    /// Sign in with email and password.
    ///
    /// On success the token, store slug and a normalized user snapshot are
    /// persisted before returning. A 401, or a 2xx answer without
    /// `success`, `user` and `token`, is returned as
    /// [`LoginOutcome::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the server cannot be reached,
    /// `ApiError::Http` for non-2xx statuses other than 401, and
    /// `ApiError::Storage` if the credentials cannot be persisted.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<LoginOutcome, ApiError> {
        self.ensure_loaded().await;

        let url = self.api_url("auth.php")?;
        let body = serde_json::json!({
            "action": "login",
            "email": email,
            "password": password.expose_secret(),
        });

        let (status, text) = self.send(Method::POST, url, Body::Json(body), false).await?;

        if status == StatusCode::UNAUTHORIZED {
            warn!("login rejected by server");
            return Ok(LoginOutcome::Rejected {
                error: INVALID_CREDENTIALS.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ApiError::Http { status, body: text });
        }

        let response: LoginResponse = serde_json::from_str(&text)?;

        match response {
            LoginResponse {
                success: true,
                user: Some(user),
                token: Some(token),
                ..
            } if !token.is_empty() => {
                let token = SecretString::from(token);
                let user = user.into_record();

                self.set_credentials(token.clone(), user.clone()).await?;
                info!(user_id = %user.id, "signed in");

                Ok(LoginOutcome::SignedIn {
                    user: user.with_token(token.clone()),
                    token,
                })
            }
            other => {
                warn!("login refused");
                Ok(LoginOutcome::Rejected {
                    error: other.error.unwrap_or_else(|| LOGIN_FAILED.to_owned()),
                })
            }
        }
    }

    /// Sign out.
    ///
    /// When remote logout is enabled the server is notified first; failures
    /// of that call are logged and ignored. Local credentials are cleared in
    /// every case.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the credential store could not be
    /// cleared. The in-memory credentials are gone regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        if self.remote_logout() && self.is_authenticated().await {
            let url = self.api_url("auth/logout.php")?;
            if let Err(e) = self
                .execute::<serde_json::Value>(Method::POST, url, Body::Empty)
                .await
            {
                warn!(error = %e, "remote logout failed");
            }
        }

        self.clear_with(CredentialEvent::SignedOut).await?;
        info!("signed out");
        Ok(())
    }

    /// Probe whether the held token is still accepted.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures, non-2xx statuses (a 401 also
    /// clears credentials) or a `success: false` answer.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<PingResponse, ApiError> {
        let url = self.api_url("ping.php")?;
        self.get(url).await
    }

    /// Resolve the signed-in user, validating the token with the server.
    ///
    /// Returns `None` without any network call when no token is held. When
    /// the ping fails for any reason credentials are cleared and `None` is
    /// returned. A valid token with no stored snapshot yields a minimal
    /// record built from the ping's user id, which is then persisted.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` only if clearing rejected credentials
    /// fails.
    #[instrument(skip(self))]
    pub async fn get_current_user(&self) -> Result<Option<UserRecord>, ApiError> {
        if !self.is_authenticated().await {
            return Ok(None);
        }

        let user_id = match self.ping().await {
            Ok(PingResponse {
                success: true,
                user_id: Some(user_id),
                ..
            }) => user_id,
            Ok(_) => {
                warn!("token validation failed, clearing credentials");
                self.clear_with(CredentialEvent::Invalidated).await?;
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, "token validation failed, clearing credentials");
                self.clear_with(CredentialEvent::Invalidated).await?;
                return Ok(None);
            }
        };

        let Some(token) = self.token().await else {
            return Ok(None);
        };

        let user = match self.stored_user().await {
            Some(user) => user,
            None => {
                let user = UserRecord::minimal(user_id);
                self.remember_user(&user).await;
                user
            }
        };

        Ok(Some(user.with_token(token)))
    }
}
