//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `QUICKSHOP_API_BASE_URL` - Primary API base (default: `https://quick-shop.co.il/api2/`)
//! - `QUICKSHOP_STORES_BASE_URL` - Host serving the products manager (default: `https://quick-shop.co.il/`)
//! - `QUICKSHOP_TIMEOUT_SECS` - Whole-request timeout in seconds (default: 30)
//! - `QUICKSHOP_CREDENTIALS_PATH` - Credential file (default: `<config dir>/quickshop/credentials.json`)
//! - `QUICKSHOP_FALLBACK_STORE_SLUG` - Legacy store slug used by the products
//!   loader when the signed-in user has none (default: unset)
//! - `QUICKSHOP_REMOTE_LOGOUT` - Notify the server on logout (default: false)
//! - `QUICKSHOP_ORDER_MUTATIONS` - `local` or `write-through` (default: `local`)

use std::path::PathBuf;
use std::time::Duration;

use quickshop_core::StoreSlug;
use thiserror::Error;
use url::Url;

use crate::resources::MutationMode;

const DEFAULT_API_BASE_URL: &str = "https://quick-shop.co.il/api2/";
const DEFAULT_STORES_BASE_URL: &str = "https://quick-shop.co.il/";
const DEFAULT_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// QuickShop client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for `auth.php`, `orders.php` and the other primary endpoints.
    /// Always ends with `/`.
    pub api_base_url: Url,
    /// Base URL for `api/stores/{slug}/products-manager`. Always ends with `/`.
    pub stores_base_url: Url,
    /// Whole-request timeout
    pub timeout: Duration,
    /// File backing the persistent credential store
    pub credentials_path: PathBuf,
    /// Legacy default store slug for the products loader
    pub fallback_store_slug: Option<StoreSlug>,
    /// Whether `logout` notifies the server before clearing local state
    pub remote_logout: bool,
    /// How the orders loader applies status edits and deletions
    pub order_mutations: MutationMode,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value, or if no
    /// credentials path is given and the platform has no config directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let api_base_url = parse_base_url(
            "QUICKSHOP_API_BASE_URL",
            &env.get_or_default("QUICKSHOP_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let stores_base_url = parse_base_url(
            "QUICKSHOP_STORES_BASE_URL",
            &env.get_or_default("QUICKSHOP_STORES_BASE_URL", DEFAULT_STORES_BASE_URL),
        )?;
        let timeout_secs = env
            .get_or_default("QUICKSHOP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| invalid("QUICKSHOP_TIMEOUT_SECS", e))?;

        let credentials_path = match env.get("QUICKSHOP_CREDENTIALS_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_credentials_path()?,
        };

        let fallback_store_slug = env
            .get("QUICKSHOP_FALLBACK_STORE_SLUG")
            .map(|s| StoreSlug::parse(&s))
            .transpose()
            .map_err(|e| invalid("QUICKSHOP_FALLBACK_STORE_SLUG", e))?;

        let remote_logout = env
            .get("QUICKSHOP_REMOTE_LOGOUT")
            .map(|s| parse_bool("QUICKSHOP_REMOTE_LOGOUT", &s))
            .transpose()?
            .unwrap_or(false);

        let order_mutations = env
            .get("QUICKSHOP_ORDER_MUTATIONS")
            .map(|s| s.parse::<MutationMode>())
            .transpose()
            .map_err(|e| invalid("QUICKSHOP_ORDER_MUTATIONS", e))?
            .unwrap_or_default();

        Ok(Self {
            api_base_url,
            stores_base_url,
            timeout: Duration::from_secs(timeout_secs),
            credentials_path,
            fallback_store_slug,
            remote_logout,
            order_mutations,
        })
    }

    /// Build a configuration pointing both hosts at explicit base URLs, with
    /// every other setting at its default. Used against mock servers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if either URL does not parse.
    pub fn with_base_urls(api_base_url: &str, stores_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("QUICKSHOP_API_BASE_URL", api_base_url)?,
            stores_base_url: parse_base_url("QUICKSHOP_STORES_BASE_URL", stores_base_url)?,
            timeout: Duration::from_secs(30),
            credentials_path: PathBuf::from("credentials.json"),
            fallback_store_slug: None,
            remote_logout: false,
            order_mutations: MutationMode::default(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable, treating blank values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_owned())
    }
}

fn invalid(key: &str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_owned(), err.to_string())
}

/// Parse a base URL, appending the trailing slash `Url::join` relies on.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let value = value.trim();
    let normalized = if value.ends_with('/') {
        value.to_owned()
    } else {
        format!("{value}/")
    };

    let url = Url::parse(&normalized).map_err(|e| invalid(key, e))?;
    if url.cannot_be_a_base() {
        return Err(invalid(key, "not a base URL"));
    }
    Ok(url)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(invalid(key, format!("expected a boolean, got {other:?}"))),
    }
}

fn default_credentials_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("quickshop").join("credentials.json"))
        .ok_or_else(|| ConfigError::MissingEnvVar("QUICKSHOP_CREDENTIALS_PATH".to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let mut vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        vars.entry("QUICKSHOP_CREDENTIALS_PATH".to_owned())
            .or_insert_with(|| "/tmp/creds.json".to_owned());
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_base_url.as_str(), DEFAULT_API_BASE_URL);
        assert_eq!(config.stores_base_url.as_str(), DEFAULT_STORES_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.credentials_path, PathBuf::from("/tmp/creds.json"));
        assert!(config.fallback_store_slug.is_none());
        assert!(!config.remote_logout);
        assert_eq!(config.order_mutations, MutationMode::LocalOnly);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = load(&[
            ("QUICKSHOP_API_BASE_URL", "http://localhost:8080/api2"),
        ])
        .unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8080/api2/");
        assert_eq!(
            config.api_base_url.join("orders.php").unwrap().as_str(),
            "http://localhost:8080/api2/orders.php"
        );
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("QUICKSHOP_TIMEOUT_SECS", "5"),
            ("QUICKSHOP_FALLBACK_STORE_SLUG", "yogev"),
            ("QUICKSHOP_REMOTE_LOGOUT", "yes"),
            ("QUICKSHOP_ORDER_MUTATIONS", "write-through"),
        ])
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.fallback_store_slug.unwrap().as_str(), "yogev");
        assert!(config.remote_logout);
        assert_eq!(config.order_mutations, MutationMode::WriteThrough);
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("QUICKSHOP_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "QUICKSHOP_TIMEOUT_SECS"));

        let err = load(&[("QUICKSHOP_FALLBACK_STORE_SLUG", "../x")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));

        let err = load(&[("QUICKSHOP_REMOTE_LOGOUT", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));

        let err = load(&[("QUICKSHOP_API_BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = load(&[
            ("QUICKSHOP_FALLBACK_STORE_SLUG", "  "),
        ])
        .unwrap();
        assert!(config.fallback_store_slug.is_none());
    }
}
