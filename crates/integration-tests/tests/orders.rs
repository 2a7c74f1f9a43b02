//! Order listing, lookup and optimistic edits.

#![allow(clippy::unwrap_used)]

use quickshop_client::api::OrderFilters;
use quickshop_client::{ApiError, MutationMode, OrdersLoader, ValidationError};
use quickshop_core::{OrderId, OrderStatus};
use quickshop_integration_tests::{TestBackend, api_path, order_json};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn mount_orders(backend: &TestBackend) {
    Mock::given(method("GET"))
        .and(path(api_path("orders.php")))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "orders": [order_json(1234, "new"), order_json(1235, "new"), order_json(1236, "ready")],
            "pagination": { "total": 42, "page": 1, "limit": 3, "totalPages": 14 },
        })))
        .mount(&backend.server)
        .await;
}

async fn loaded(backend: &TestBackend, mode: MutationMode) -> (quickshop_client::SessionController, OrdersLoader) {
    backend.sign_in_as("tok123", Some("yogev")).await;
    backend.mount_ping_ok().await;
    mount_orders(backend).await;

    let session = backend.session();
    session.check_auth_status().await;

    let loader = OrdersLoader::orders(
        backend.client.clone(),
        session.handle(),
        OrderFilters {
            limit: Some(3),
            ..OrderFilters::default()
        },
        mode,
    );
    loader.start().await;
    (session, loader)
}

#[tokio::test]
async fn test_list_reports_server_total() {
    let backend = TestBackend::start().await;
    let (_session, loader) = loaded(&backend, MutationMode::LocalOnly).await;

    let state = loader.snapshot();
    assert!(state.error.is_none(), "{:?}", state.error);
    assert!(!state.loading);
    assert_eq!(loader.total(), 42);
    assert!(state.data.unwrap().orders.len() <= 3);
}

#[tokio::test]
async fn test_list_sends_filters_and_bearer() {
    let backend = TestBackend::start().await;
    backend.sign_in_as("tok123", None).await;

    Mock::given(method("GET"))
        .and(path(api_path("orders.php")))
        .and(query_param("status", "preparing"))
        .and(query_param("search", "dana"))
        .and(query_param("start_date", "2025-01-01"))
        .and(wiremock::matchers::header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orders": [],
            "pagination": { "total": 0 },
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let page = backend
        .client
        .get_orders(&OrderFilters {
            status: Some(OrderStatus::parse("בהכנה")),
            search: Some("dana".to_owned()),
            start_date: "2025-01-01".parse().ok(),
            ..OrderFilters::default()
        })
        .await
        .unwrap();

    assert!(page.orders.is_empty());
}

#[tokio::test]
async fn test_local_status_change_makes_no_request() {
    let backend = TestBackend::start().await;
    let (_session, loader) = loaded(&backend, MutationMode::LocalOnly).await;
    let before = backend.server.received_requests().await.unwrap().len();

    loader
        .update_order_status(OrderId::new(1234), OrderStatus::parse("בהכנה"))
        .await;

    let list = loader.snapshot().data.unwrap();
    let order = list.get(OrderId::new(1234)).unwrap();
    assert_eq!(order.status, OrderStatus::Preparing);
    assert_eq!(order.status_text, "בהכנה");
    assert_eq!(backend.server.received_requests().await.unwrap().len(), before);
}

#[tokio::test]
async fn test_local_delete_decrements_total() {
    let backend = TestBackend::start().await;
    let (_session, loader) = loaded(&backend, MutationMode::LocalOnly).await;

    loader.delete_order(OrderId::new(1235)).await;

    assert_eq!(loader.total(), 41);
    let list = loader.snapshot().data.unwrap();
    assert_eq!(list.orders.len(), 2);
    assert!(list.get(OrderId::new(1235)).is_none());
    assert_eq!(backend.hits(&api_path("orders.php")).await, 1);
}

#[tokio::test]
async fn test_delete_of_unlisted_order_makes_no_request() {
    let backend = TestBackend::start().await;
    let (_session, loader) = loaded(&backend, MutationMode::LocalOnly).await;

    loader.delete_order(OrderId::new(9999)).await;

    assert_eq!(backend.hits(&api_path("orders.php")).await, 1);
    assert_eq!(loader.snapshot().data.unwrap().orders.len(), 3);
}

#[tokio::test]
async fn test_write_through_sends_status() {
    let backend = TestBackend::start().await;
    Mock::given(method("PUT"))
        .and(path(api_path("orders.php")))
        .and(body_partial_json(json!({ "id": 1234, "status": "ready" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let (_session, loader) = loaded(&backend, MutationMode::WriteThrough).await;
    loader
        .update_order_status(OrderId::new(1234), OrderStatus::Ready)
        .await;

    let list = loader.snapshot().data.unwrap();
    assert_eq!(list.get(OrderId::new(1234)).unwrap().status, OrderStatus::Ready);
    // No compensating refetch
    assert_eq!(backend.hits(&api_path("orders.php")).await, 2);
}

#[tokio::test]
async fn test_write_through_failure_refetches() {
    let backend = TestBackend::start().await;
    Mock::given(method("DELETE"))
        .and(path(api_path("orders.php")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "error": "order is locked" })),
        )
        .mount(&backend.server)
        .await;

    let (_session, loader) = loaded(&backend, MutationMode::WriteThrough).await;
    loader.delete_order(OrderId::new(1234)).await;

    // The refetch restores the server's view
    let list = loader.snapshot().data.unwrap();
    assert!(list.get(OrderId::new(1234)).is_some());
    assert_eq!(loader.total(), 42);
}

#[tokio::test]
async fn test_loader_without_session_does_not_fetch() {
    let backend = TestBackend::start().await;
    let session = backend.session();
    session.check_auth_status().await;

    let loader = OrdersLoader::orders(
        backend.client.clone(),
        session.handle(),
        OrderFilters::default(),
        MutationMode::LocalOnly,
    );
    loader.start().await;

    let state = loader.snapshot();
    assert!(state.error.is_some());
    assert!(state.data.is_none());
    assert!(backend.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_order_requires_store_slug() {
    let backend = TestBackend::start().await;
    backend.sign_in_as("tok123", None).await;

    let err = backend.client.get_order(OrderId::new(1234)).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(ValidationError::MissingStoreSlug)));
    assert!(backend.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_order_scopes_by_store() {
    let backend = TestBackend::start().await;
    backend.sign_in_as("tok123", Some("yogev")).await;

    Mock::given(method("GET"))
        .and(path(api_path("orders.php")))
        .and(query_param("id", "1234"))
        .and(query_param("store", "yogev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "order": order_json(1234, "shipped"),
        })))
        .mount(&backend.server)
        .await;

    let order = backend.client.get_order(OrderId::new(1234)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.customer_name(), "Dana Levi");
}

#[tokio::test]
async fn test_get_order_missing_is_not_found() {
    let backend = TestBackend::start().await;
    backend.sign_in_as("tok123", Some("yogev")).await;

    Mock::given(method("GET"))
        .and(path(api_path("orders.php")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&backend.server)
        .await;

    let err = backend.client.get_order(OrderId::new(1)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
