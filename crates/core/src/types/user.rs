//! Signed-in user snapshot.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::id::{StoreId, UserId};

/// The user the session is signed in as.
///
/// A serialized copy is persisted under the `user_data` credential key. The
/// bearer token is never part of that snapshot: `auth_token` is attached from
/// the live credential cache whenever a record is handed out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(skip)]
    pub auth_token: Option<SecretString>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<StoreId>,
}

impl UserRecord {
    /// Build the placeholder record used when the server vouches for a token
    /// but no local snapshot survived.
    #[must_use]
    pub fn minimal(id: UserId) -> Self {
        Self {
            id,
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            auth_token: None,
            created_at: Utc::now(),
            store_slug: None,
            store_id: None,
        }
    }

    /// Attach a live bearer token.
    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.auth_token = Some(token);
        self
    }

    /// Full display name, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_owned()
        }
    }
}

/// Split a login response's names into `(first_name, last_name)`.
///
/// The first word of `name` becomes the first name and the remaining words the
/// last name. When `name` is missing or blank the explicit fields are used.
#[must_use]
pub fn split_name(name: Option<&str>, first: Option<&str>, last: Option<&str>) -> (String, String) {
    let mut words = name.unwrap_or_default().split_whitespace();

    let first_name = words
        .next()
        .map(str::to_owned)
        .or_else(|| first.map(str::to_owned))
        .unwrap_or_default();

    let rest = words.collect::<Vec<_>>().join(" ");
    let last_name = if rest.is_empty() {
        last.map(str::to_owned).unwrap_or_default()
    } else {
        rest
    };

    (first_name, last_name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_split_name_prefers_full_name() {
        assert_eq!(
            split_name(Some("Dana Levi"), Some("x"), Some("y")),
            ("Dana".to_owned(), "Levi".to_owned())
        );
        assert_eq!(
            split_name(Some("Anna Maria de Souza"), None, None),
            ("Anna".to_owned(), "Maria de Souza".to_owned())
        );
    }

    #[test]
    fn test_split_name_falls_back_to_fields() {
        assert_eq!(
            split_name(None, Some("Dana"), Some("Levi")),
            ("Dana".to_owned(), "Levi".to_owned())
        );
        assert_eq!(
            split_name(Some("  "), None, None),
            (String::new(), String::new())
        );
        assert_eq!(
            split_name(Some("Dana"), None, Some("Levi")),
            ("Dana".to_owned(), "Levi".to_owned())
        );
    }

    #[test]
    fn test_snapshot_never_contains_token() {
        let user = UserRecord::minimal(UserId::new(7)).with_token(SecretString::from("tok123".to_owned()));
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("tok123"));
        assert!(!json.contains("auth_token"));

        let restored: UserRecord = serde_json::from_str(&json).unwrap();
        assert!(restored.auth_token.is_none());
        assert_eq!(restored.id, UserId::new(7));
        assert_eq!(user.auth_token.unwrap().expose_secret(), "tok123");
    }

    #[test]
    fn test_display_name() {
        let mut user = UserRecord::minimal(UserId::new(1));
        user.email = "a@b.com".to_owned();
        assert_eq!(user.display_name(), "a@b.com");
        user.first_name = "Dana".to_owned();
        assert_eq!(user.display_name(), "Dana");
    }
}
