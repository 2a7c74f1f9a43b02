//! Request core and credential choke point of the QuickShop API client.

use std::sync::Arc;

use quickshop_core::{StoreSlug, UserRecord};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{OnceCell, RwLock, broadcast};
use tracing::{Instrument, debug, error, info_span, warn};
use url::Url;
use uuid::Uuid;

use super::{ApiError, CredentialEvent, ValidationError};
use crate::config::ClientConfig;
use crate::credentials::{self, CredentialKey, CredentialStore};

/// Header carrying the per-request correlation id.
pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Capacity of the credential event channel. Slow subscribers skip ahead.
const EVENT_CAPACITY: usize = 16;

/// QuickShop API client.
///
/// Cheap to clone; clones share the HTTP connection pool, the credential
/// cache and the event channel.
///
/// # Credentials
///
/// The bearer token, store slug and user snapshot are loaded from the
/// credential store once, on the first call that needs them. Every later
/// change goes through [`ApiClient::set_credentials`] or the clear path, which
/// update the store and the in-memory cache together and publish a
/// [`CredentialEvent`].
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    api_base: Url,
    stores_base: Url,
    remote_logout: bool,
    store: Arc<dyn CredentialStore>,
    /// In-memory credential cache
    credentials: RwLock<Credentials>,
    /// Set once stored credentials have been read
    loaded: OnceCell<()>,
    events: broadcast::Sender<CredentialEvent>,
}

#[derive(Default)]
struct Credentials {
    token: Option<SecretString>,
    store_slug: Option<StoreSlug>,
    user: Option<UserRecord>,
}

impl Credentials {
    const fn is_empty(&self) -> bool {
        self.token.is_none() && self.store_slug.is_none() && self.user.is_none()
    }
}

/// Request body variants.
pub(crate) enum Body {
    Empty,
    Json(Value),
    Multipart(reqwest::multipart::Form),
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_base", &self.inner.api_base.as_str())
            .field("stores_base", &self.inner.stores_base.as_str())
            .field("remote_logout", &self.inner.remote_logout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the configured hosts, backed by `store`.
    ///
    /// No I/O happens here; stored credentials are read on first use.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers())
            .build()?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                api_base: config.api_base_url.clone(),
                stores_base: config.stores_base_url.clone(),
                remote_logout: config.remote_logout,
                store,
                credentials: RwLock::new(Credentials::default()),
                loaded: OnceCell::new(),
                events,
            }),
        })
    }

    /// Subscribe to credential changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CredentialEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn remote_logout(&self) -> bool {
        self.inner.remote_logout
    }

    // =========================================================================
    // Credential cache
    // =========================================================================

    /// Wait until stored credentials have been loaded into memory.
    pub(crate) async fn ensure_loaded(&self) {
        self.inner
            .loaded
            .get_or_init(|| self.load_stored())
            .await;
    }

    async fn load_stored(&self) {
        let store = &self.inner.store;

        let token = read_entry(store.as_ref(), CredentialKey::AuthToken).await;
        let store_slug = read_entry(store.as_ref(), CredentialKey::StoreSlug)
            .await
            .and_then(|raw| match StoreSlug::parse(&raw) {
                Ok(slug) => Some(slug),
                Err(e) => {
                    warn!(error = %e, "ignoring invalid stored store slug");
                    None
                }
            });
        let user = read_entry(store.as_ref(), CredentialKey::UserData)
            .await
            .and_then(|raw| match serde_json::from_str::<UserRecord>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "ignoring unreadable stored user snapshot");
                    None
                }
            });

        debug!(
            token = token.is_some(),
            store_slug = store_slug.is_some(),
            user = user.is_some(),
            "loaded stored credentials"
        );

        // A user or slug without a token is the residue of an interrupted
        // sign-in; never expose it as a session.
        if token.is_none() && (store_slug.is_some() || user.is_some()) {
            warn!("discarding stored user data without a token");
            for key in [CredentialKey::UserData, CredentialKey::StoreSlug] {
                if let Err(e) = store.remove(key).await {
                    error!(key = %key, error = %e, "failed to remove orphaned credential");
                }
            }
            return;
        }

        *self.inner.credentials.write().await = Credentials {
            token: token.map(SecretString::from),
            store_slug,
            user,
        };
    }

    /// Whether a bearer token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.ensure_loaded().await;
        self.inner.credentials.read().await.token.is_some()
    }

    /// The bearer token currently held.
    pub async fn token(&self) -> Option<SecretString> {
        self.ensure_loaded().await;
        self.inner.credentials.read().await.token.clone()
    }

    /// The persisted user snapshot, without contacting the server.
    pub async fn stored_user(&self) -> Option<UserRecord> {
        self.ensure_loaded().await;
        let creds = self.inner.credentials.read().await;
        let user = creds.user.clone()?;
        Some(match &creds.token {
            Some(token) => user.with_token(token.clone()),
            None => user,
        })
    }

    /// The store slug scoping store-specific endpoints.
    pub async fn store_slug(&self) -> Option<StoreSlug> {
        self.ensure_loaded().await;
        self.inner.credentials.read().await.store_slug.clone()
    }

    pub(crate) async fn require_store_slug(&self) -> Result<StoreSlug, ApiError> {
        self.store_slug()
            .await
            .ok_or(ApiError::Validation(ValidationError::MissingStoreSlug))
    }

    /// Persist fresh credentials and cache them.
    ///
    /// Entries are written user snapshot first, then store slug, then token,
    /// all while holding the cache's write lock, so no reader observes a token
    /// without its user. The store slug is taken from the user record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if persisting fails. Whatever was written
    /// is removed again and the cache is left empty.
    pub async fn set_credentials(&self, token: SecretString, user: UserRecord) -> Result<(), ApiError> {
        self.ensure_loaded().await;

        let store_slug = user
            .store_slug
            .as_deref()
            .and_then(|raw| match StoreSlug::parse(raw) {
                Ok(slug) => Some(slug),
                Err(e) => {
                    warn!(error = %e, "login returned an unusable store slug");
                    None
                }
            });
        let mut snapshot = user;
        snapshot.auth_token = None;
        let user_json = serde_json::to_string(&snapshot)?;

        let mut creds = self.inner.credentials.write().await;
        let store = &self.inner.store;

        let persisted = async {
            store.set(CredentialKey::UserData, &user_json).await?;
            match &store_slug {
                Some(slug) => store.set(CredentialKey::StoreSlug, slug.as_str()).await?,
                None => store.remove(CredentialKey::StoreSlug).await?,
            }
            store.set(CredentialKey::AuthToken, token.expose_secret()).await
        }
        .await;

        if let Err(e) = persisted {
            error!(error = %e, "failed to persist credentials");
            *creds = Credentials::default();
            if let Err(cleanup) = store.remove_many(&CredentialKey::ALL).await {
                error!(error = %cleanup, "failed to roll back partially persisted credentials");
            }
            return Err(e.into());
        }

        *creds = Credentials {
            token: Some(token),
            store_slug,
            user: Some(snapshot),
        };
        drop(creds);

        let _ = self.inner.events.send(CredentialEvent::SignedIn);
        Ok(())
    }

    /// Store a user snapshot for a token that is already held.
    pub(crate) async fn remember_user(&self, user: &UserRecord) {
        let mut snapshot = user.clone();
        snapshot.auth_token = None;

        let mut creds = self.inner.credentials.write().await;
        if creds.token.is_none() {
            return;
        }

        match serde_json::to_string(&snapshot) {
            Ok(json) => {
                if let Err(e) = self.inner.store.set(CredentialKey::UserData, &json).await {
                    error!(error = %e, "failed to persist user snapshot");
                }
            }
            Err(e) => error!(error = %e, "failed to encode user snapshot"),
        }
        creds.user = Some(snapshot);
    }

    /// Forget all credentials, in memory first and then in the store.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store could not be cleared. The
    /// in-memory cache is empty either way.
    pub async fn clear_credentials(&self) -> Result<(), ApiError> {
        self.clear_with(CredentialEvent::SignedOut).await
    }

    pub(crate) async fn clear_with(&self, event: CredentialEvent) -> Result<(), ApiError> {
        self.ensure_loaded().await;

        let mut creds = self.inner.credentials.write().await;
        let held = !creds.is_empty();
        *creds = Credentials::default();

        let removed = self.inner.store.remove_many(&CredentialKey::ALL).await;
        drop(creds);

        if held {
            let _ = self.inner.events.send(event);
        }
        removed.map_err(ApiError::from)
    }

    /// Every persisted entry with the token masked.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store cannot be read.
    pub async fn storage_entries(&self) -> Result<Vec<(String, String)>, ApiError> {
        Ok(credentials::redacted_entries(self.inner.store.as_ref()).await?)
    }

    /// Wipe the credential store completely, including foreign keys.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store cannot be cleared.
    pub async fn clear_storage(&self) -> Result<(), ApiError> {
        self.clear_credentials().await?;
        Ok(self.inner.store.clear_all().await?)
    }

    // =========================================================================
    // Request execution
    // =========================================================================

    /// Resolve `path` against the primary API base.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.api_base.join(path)?)
    }

    /// Resolve `path` against the stores host.
    pub(crate) fn stores_url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.stores_base.join(path)?)
    }

    /// Send a request and return the status and body text.
    ///
    /// Attaches the bearer token when `authorized` is set and a token is held.
    /// Does not interpret the status.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Body,
        authorized: bool,
    ) -> Result<(StatusCode, String), ApiError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("http_request", %method, url = %url, %request_id);

        async {
            let token = if authorized {
                self.inner.credentials.read().await.token.clone()
            } else {
                None
            };

            let mut request = self
                .inner
                .http
                .request(method, url)
                .header(REQUEST_ID_HEADER, request_id.to_string());
            if let Some(token) = &token {
                request = request.bearer_auth(token.expose_secret());
            }
            request = match body {
                Body::Empty => request,
                Body::Json(json) => request.json(&json),
                Body::Multipart(form) => request.multipart(form),
            };

            debug!(bearer = token.is_some(), "sending request");
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            debug!(status = status.as_u16(), "received response");

            Ok((status, text))
        }
        .instrument(span)
        .await
    }

    /// Execute an authenticated request and decode the JSON body.
    ///
    /// A 401 clears credentials and publishes
    /// [`CredentialEvent::Invalidated`] before the error is returned. A 2xx
    /// body of the form `{"success": false, ...}` becomes [`ApiError::Api`].
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Body,
    ) -> Result<T, ApiError> {
        self.ensure_loaded().await;

        let (status, text) = self.send(method, url, body, true).await?;

        if status == StatusCode::UNAUTHORIZED {
            warn!("unauthorized, clearing credentials");
            if let Err(e) = self.clear_with(CredentialEvent::Invalidated).await {
                error!(error = %e, "failed to clear credentials after 401");
            }
            return Err(ApiError::Http { status, body: text });
        }

        if !status.is_success() {
            return Err(ApiError::Http { status, body: text });
        }

        decode_body(&text)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.execute(Method::GET, url, Body::Empty).await
    }
}

/// Decode a 2xx body, turning `success: false` envelopes into errors.
fn decode_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let value: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(text)?
    };

    if value.get("success") == Some(&Value::Bool(false)) {
        let message = ["error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .unwrap_or("request failed")
            .to_owned();
        return Err(ApiError::Api(message));
    }

    Ok(serde_json::from_value(value)?)
}

/// Append query pairs to `url`, leaving it untouched when there are none.
pub(crate) fn with_query(mut url: Url, pairs: &[(&str, String)]) -> Url {
    if !pairs.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
    }
    url
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers
}

async fn read_entry(store: &dyn CredentialStore, key: CredentialKey) -> Option<String> {
    match store.get(key).await {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            error!(key = %key, error = %e, "failed to read stored credential");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quickshop_core::UserId;

    use super::*;
    use crate::credentials::MemoryCredentialStore;

    fn client_with(store: Arc<MemoryCredentialStore>) -> ApiClient {
        let config = ClientConfig::with_base_urls("http://127.0.0.1:9/api2", "http://127.0.0.1:9").unwrap();
        ApiClient::new(&config, store).unwrap()
    }

    fn user(slug: Option<&str>) -> UserRecord {
        let mut user = UserRecord::minimal(UserId::new(7));
        user.email = "a@b.com".to_owned();
        user.store_slug = slug.map(str::to_owned);
        user
    }

    #[tokio::test]
    async fn test_loads_stored_credentials_once() {
        let store = Arc::new(MemoryCredentialStore::new());
        store.set(CredentialKey::AuthToken, "tok").await.unwrap();
        store.set(CredentialKey::StoreSlug, "yogev").await.unwrap();
        store
            .set(CredentialKey::UserData, &serde_json::to_string(&user(None)).unwrap())
            .await
            .unwrap();

        let client = client_with(store.clone());
        assert!(client.is_authenticated().await);
        assert_eq!(client.store_slug().await.unwrap().as_str(), "yogev");
        let stored = client.stored_user().await.unwrap();
        assert_eq!(stored.auth_token.unwrap().expose_secret(), "tok");

        // Later writes to the store are not re-read.
        store.remove(CredentialKey::AuthToken).await.unwrap();
        assert!(client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_user_without_token_is_discarded() {
        let store = Arc::new(MemoryCredentialStore::new());
        store
            .set(CredentialKey::UserData, &serde_json::to_string(&user(Some("yogev"))).unwrap())
            .await
            .unwrap();
        store.set(CredentialKey::StoreSlug, "yogev").await.unwrap();

        let client = client_with(store.clone());
        assert!(!client.is_authenticated().await);
        assert!(client.stored_user().await.is_none());
        assert!(client.store_slug().await.is_none());

        assert!(store.get(CredentialKey::UserData).await.unwrap().is_none());
        assert!(store.get(CredentialKey::StoreSlug).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_stored_slug_is_ignored() {
        let store = Arc::new(MemoryCredentialStore::new());
        store.set(CredentialKey::StoreSlug, "../admin").await.unwrap();
        let client = client_with(store);
        assert!(client.store_slug().await.is_none());
        assert!(matches!(
            client.require_store_slug().await,
            Err(ApiError::Validation(ValidationError::MissingStoreSlug))
        ));
    }

    #[tokio::test]
    async fn test_set_and_clear_keep_store_and_cache_in_step() {
        let store = Arc::new(MemoryCredentialStore::new());
        let client = client_with(store.clone());
        let mut events = client.subscribe();

        client
            .set_credentials(SecretString::from("tok123"), user(Some("yogev")))
            .await
            .unwrap();
        assert_eq!(events.recv().await.unwrap(), CredentialEvent::SignedIn);
        assert_eq!(
            store.get(CredentialKey::AuthToken).await.unwrap().as_deref(),
            Some("tok123")
        );
        assert_eq!(
            store.get(CredentialKey::StoreSlug).await.unwrap().as_deref(),
            Some("yogev")
        );
        let snapshot = store.get(CredentialKey::UserData).await.unwrap().unwrap();
        assert!(!snapshot.contains("tok123"));
        assert!(client.stored_user().await.is_some());

        client.clear_credentials().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), CredentialEvent::SignedOut);
        assert!(!client.is_authenticated().await);
        assert!(client.stored_user().await.is_none());
        assert!(store.entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clearing_nothing_publishes_nothing() {
        let client = client_with(Arc::new(MemoryCredentialStore::new()));
        let mut events = client.subscribe();
        client.clear_credentials().await.unwrap();
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_decode_body_rejects_failed_envelope() {
        let err = decode_body::<Value>(r#"{"success": false, "error": "no such order"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Api(ref m) if m == "no such order"));

        let ok: Value = decode_body(r#"{"success": true}"#).unwrap();
        assert_eq!(ok["success"], Value::Bool(true));

        let empty: Value = decode_body("").unwrap();
        assert!(empty.is_null());
    }

    #[test]
    fn test_with_query() {
        let url = Url::parse("http://x/api2/orders.php").unwrap();
        assert_eq!(with_query(url.clone(), &[]).as_str(), "http://x/api2/orders.php");
        assert_eq!(
            with_query(url, &[("search", "דנה לוי".to_owned()), ("limit", "3".to_owned())]).as_str(),
            "http://x/api2/orders.php?search=%D7%93%D7%A0%D7%94+%D7%9C%D7%95%D7%99&limit=3"
        );
    }
}
