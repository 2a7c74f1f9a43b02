//! Session state and its transition function.

use quickshop_core::UserRecord;
use secrecy::SecretString;

/// Authentication state of the session.
///
/// The token and the user only ever appear together, inside
/// [`SessionState::Authenticated`].
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// The stored credentials have not been checked yet.
    #[default]
    Initializing,
    Unauthenticated,
    /// A login request is in flight.
    Authenticating,
    Authenticated {
        user: UserRecord,
        token: SecretString,
    },
    /// The last login failed. Not signed in; keeps the error for display.
    AuthFailed { error: String },
}

impl SessionState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Whether a status check or login is in progress.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Initializing | Self::Authenticating)
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserRecord> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    /// Message of the last failed login.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::AuthFailed { error } => Some(error),
            _ => None,
        }
    }

    /// Short name of the state, for logs and status output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Authenticated { .. } => "authenticated",
            Self::AuthFailed { .. } => "auth_failed",
        }
    }
}

/// Inputs to [`reduce`].
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A status check began.
    CheckStarted,
    /// The status check found no stored token.
    NoStoredCredentials,
    /// The status check resolved the user, or found the token invalid.
    UserResolved(Option<UserRecord>),
    LoginStarted,
    LoginSucceeded {
        user: UserRecord,
        token: SecretString,
    },
    LoginFailed(String),
    LoggedOut,
    /// The API client dropped the credentials after a 401.
    CredentialsInvalidated,
}

/// Compute the state that follows `state` on `event`.
///
/// Total over every state/event pair and free of side effects.
#[must_use]
pub fn reduce(state: &SessionState, event: SessionEvent) -> SessionState {
    use SessionState as S;

    match event {
        SessionEvent::CheckStarted => match state {
            // A re-check does not sign the user out while it runs, and does
            // not interrupt a login.
            S::Authenticated { .. } | S::Authenticating => state.clone(),
            _ => S::Initializing,
        },
        SessionEvent::NoStoredCredentials => match state {
            S::Authenticating | S::AuthFailed { .. } => state.clone(),
            _ => S::Unauthenticated,
        },
        SessionEvent::UserResolved(Some(mut user)) => match user.auth_token.take() {
            Some(token) => S::Authenticated { user, token },
            None => S::Unauthenticated,
        },
        SessionEvent::UserResolved(None) | SessionEvent::LoggedOut => S::Unauthenticated,
        SessionEvent::LoginStarted => S::Authenticating,
        SessionEvent::LoginSucceeded { user, token } => S::Authenticated { user, token },
        SessionEvent::LoginFailed(error) => S::AuthFailed { error },
        SessionEvent::CredentialsInvalidated => match state {
            S::Authenticated { .. } => S::Unauthenticated,
            _ => state.clone(),
        },
    }
}
