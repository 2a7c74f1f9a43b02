//! Integration tests for the QuickShop client.
//!
//! Every test runs the real client against a [`wiremock`] server standing in
//! for the QuickShop backend. The primary API lives under `/api2/` on the mock
//! server and the stores host at its root.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p quickshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_lifecycle` - Login, logout, token validation and 401 handling
//! - `orders` - Order listing and optimistic edits
//! - `catalog` - Products, categories, media and uploads
//! - `credential_file` - Credentials persisted across client instances

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use quickshop_client::{ApiClient, ClientConfig, CredentialStore, MemoryCredentialStore, SessionController};
use quickshop_core::{UserId, UserRecord};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock backend plus a client wired to it.
pub struct TestBackend {
    pub server: MockServer,
    pub config: ClientConfig,
    pub store: Arc<dyn CredentialStore>,
    pub client: ApiClient,
}

impl TestBackend {
    /// Start a mock server and a client with an empty in-memory store.
    pub async fn start() -> Self {
        Self::with_store(Arc::new(MemoryCredentialStore::new())).await
    }

    /// Start a mock server and a client backed by `store`.
    pub async fn with_store(store: Arc<dyn CredentialStore>) -> Self {
        let server = MockServer::start().await;
        let config = config_for(&server);
        let client = ApiClient::new(&config, Arc::clone(&store)).unwrap();

        Self {
            server,
            config,
            store,
            client,
        }
    }

    /// A second client over the same store, as after an app restart.
    pub fn restart(&self) -> ApiClient {
        ApiClient::new(&self.config, Arc::clone(&self.store)).unwrap()
    }

    pub fn session(&self) -> SessionController {
        SessionController::new(self.client.clone())
    }

    /// Hold a token and user without going through login.
    pub async fn sign_in_as(&self, token: &str, store_slug: Option<&str>) -> UserRecord {
        let mut user = UserRecord::minimal(UserId::new(7));
        user.email = "a@b.com".to_owned();
        user.store_slug = store_slug.map(str::to_owned);
        self.client
            .set_credentials(SecretString::from(token), user.clone())
            .await
            .unwrap();
        user
    }

    /// Answer `POST auth.php` with a successful login.
    pub async fn mount_login_ok(&self, user: Value, token: &str) {
        Mock::given(method("POST"))
            .and(path(api_path("auth.php")))
            .and(body_partial_json(json!({ "action": "login" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "user": user,
                "token": token,
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer `GET ping.php` with a valid token for user 7.
    pub async fn mount_ping_ok(&self) {
        Mock::given(method("GET"))
            .and(path(api_path("ping.php")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "pong",
                "user_id": 7,
            })))
            .mount(&self.server)
            .await;
    }

    /// Number of requests the mock server has seen for `request_path`.
    pub async fn hits(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}

/// Client configuration pointing both hosts at `server`.
pub fn config_for(server: &MockServer) -> ClientConfig {
    let uri = server.uri();
    ClientConfig::with_base_urls(&format!("{uri}/api2"), &uri).unwrap()
}

/// Path of a primary-API endpoint on the mock server.
pub fn api_path(endpoint: &str) -> String {
    format!("/api2/{endpoint}")
}

/// A server-side order with the given id.
pub fn order_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "order_number": format!("QS-{id}"),
        "first_name": "Dana",
        "last_name": "Levi",
        "email": "dana@example.com",
        "total": "99.90",
        "status": status,
        "status_text": "",
        "paid_status": "1",
        "order_items": [{ "name": "Cake", "quantity": 1 }],
    })
}
