//! Products, categories, media, store info and uploads.

#![allow(clippy::unwrap_used)]

use quickshop_client::api::{ProductFilters, SortDirection};
use quickshop_client::{
    ApiError, DashboardLoader, ProductsLoader, StoreInfoLoader, ValidationError,
};
use quickshop_core::{ProductId, ProductKind, StoreSlug};
use quickshop_integration_tests::{TestBackend, api_path};
use serde_json::json;
use wiremock::matchers::{header_regex, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn product_json(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "slug": format!("p-{id}"),
        "type": "simple",
        "regular_price": "50.00",
        "sale_price": "40.00",
        "inventory_quantity": 5,
        "category_names": "Cakes, Seasonal",
        "is_active": "1",
    })
}

async fn signed_in_session(backend: &TestBackend, slug: Option<&str>) -> quickshop_client::SessionController {
    backend.sign_in_as("tok123", slug).await;
    backend.mount_ping_ok().await;
    let session = backend.session();
    session.check_auth_status().await;
    session
}

#[tokio::test]
async fn test_products_loader_uses_user_store_on_stores_host() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stores/yogev/products-manager"))
        .and(query_param("q", "cake"))
        .and(query_param("sort_dir", "DESC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [product_json(1, "Cheesecake"), product_json(2, "Carrot cake")],
            "pagination": { "current_page": 1, "per_page": 20, "total": 2, "total_pages": 1 },
            "sort": { "current": "name", "available_options": { "name": "Name" } },
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let session = signed_in_session(&backend, Some("yogev")).await;
    let loader = ProductsLoader::products(
        backend.client.clone(),
        session.handle(),
        ProductFilters {
            search: Some("cake".to_owned()),
            sort_dir: Some(SortDirection::Desc),
            ..ProductFilters::default()
        },
        None,
    );
    loader.start().await;

    let state = loader.snapshot();
    assert!(state.error.is_none(), "{:?}", state.error);
    let page = state.data.unwrap();
    assert_eq!(page.pagination.total, 2);

    let first = page.products.first().unwrap();
    assert_eq!(first.kind(), ProductKind::Simple);
    assert!(first.is_on_sale());
    assert_eq!(first.category_labels(), ["Cakes", "Seasonal"]);
}

#[tokio::test]
async fn test_products_loader_falls_back_to_configured_slug() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stores/legacy/products-manager"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let session = signed_in_session(&backend, None).await;
    let loader = ProductsLoader::products(
        backend.client.clone(),
        session.handle(),
        ProductFilters::default(),
        StoreSlug::parse("legacy").ok(),
    );
    loader.start().await;

    assert!(loader.snapshot().error.is_none());
}

#[tokio::test]
async fn test_products_loader_without_slug_reports_error() {
    let backend = TestBackend::start().await;
    let session = signed_in_session(&backend, None).await;

    let loader = ProductsLoader::products(
        backend.client.clone(),
        session.handle(),
        ProductFilters::default(),
        None,
    );
    loader.start().await;

    assert_eq!(
        loader.snapshot().error.as_deref(),
        Some(ValidationError::MissingStoreSlug.to_string().as_str())
    );
    assert_eq!(backend.hits("/api/stores/yogev/products-manager").await, 0);
}

#[tokio::test]
async fn test_store_scoped_calls_require_slug() {
    let backend = TestBackend::start().await;
    backend.sign_in_as("tok123", None).await;

    let missing = |e: &ApiError| matches!(e, ApiError::Validation(ValidationError::MissingStoreSlug));

    assert!(missing(&backend.client.get_products(&ProductFilters::default()).await.unwrap_err()));
    assert!(missing(&backend.client.get_categories().await.unwrap_err()));
    assert!(missing(&backend.client.get_product(ProductId::new(1)).await.unwrap_err()));
    assert!(backend.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_categories_accept_wrapped_and_bare_lists() {
    let backend = TestBackend::start().await;
    backend.sign_in_as("tok123", Some("yogev")).await;

    Mock::given(method("GET"))
        .and(path(api_path("api/stores/yogev/categories")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "categories": [{ "id": 1, "name": "Cakes", "slug": "cakes" }],
        })))
        .up_to_n_times(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("api/stores/yogev/categories")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Cakes" },
            { "id": 2, "name": "Cookies" },
        ])))
        .mount(&backend.server)
        .await;

    assert_eq!(backend.client.get_categories().await.unwrap().len(), 1);
    assert_eq!(backend.client.get_categories().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_product_by_id() {
    let backend = TestBackend::start().await;
    backend.sign_in_as("tok123", Some("yogev")).await;

    Mock::given(method("GET"))
        .and(path(api_path("api/stores/yogev/products")))
        .and(query_param("ids", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [product_json(2, "Carrot cake")],
        })))
        .mount(&backend.server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("api/stores/yogev/products")))
        .and(query_param("ids", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&backend.server)
        .await;

    let product = backend.client.get_product(ProductId::new(2)).await.unwrap();
    assert_eq!(product.name, "Carrot cake");

    let err = backend.client.get_product(ProductId::new(3)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_dashboard_and_store_loaders() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("dashboard.php")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "stats": { "today_orders": 3, "today_sales": "120.00", "monthly_orders": 40, "total_products": 12 },
            "weekly_sales": [
                { "date": "2025-01-01", "orders_count": 2, "total_sales": "100.00" },
                { "date": "2025-01-02", "orders_count": 1, "total_sales": "20.50" },
            ],
            "recent_orders": [],
            "popular_products": [],
        })))
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("store.php")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "store": { "id": 3, "slug": "yogev", "name": "Yogev Bakery", "primary_color": "#ff0000" },
        })))
        .mount(&backend.server)
        .await;

    let session = signed_in_session(&backend, Some("yogev")).await;

    let dashboard = DashboardLoader::dashboard(backend.client.clone(), session.handle());
    dashboard.start().await;
    let data = dashboard.snapshot().data.unwrap();
    assert_eq!(data.stats.today_orders, 3);
    assert_eq!(data.weekly_total().to_string(), "120.50");

    let store = StoreInfoLoader::store_info(backend.client.clone(), session.handle());
    store.start().await;
    let info = store.snapshot().data.unwrap();
    assert_eq!(info.name, "Yogev Bakery");
    assert_eq!(info.setting("primary_color"), Some(&json!("#ff0000")));
}

#[tokio::test]
async fn test_upload_sends_multipart_image() {
    let backend = TestBackend::start().await;
    backend.sign_in_as("tok123", Some("yogev")).await;

    Mock::given(method("POST"))
        .and(path(api_path("upload.php")))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "filename": "cake-123.png",
            "url": "https://cdn.example.com/cake-123.png",
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let result = backend
        .client
        .upload_file(vec![0x89, b'P', b'N', b'G'], "cake.png")
        .await
        .unwrap();
    assert_eq!(result.url.as_deref(), Some("https://cdn.example.com/cake-123.png"));

    let err = backend.client.upload_file(Vec::new(), "empty.png").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(ValidationError::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_refused_upload_reports_server_error() {
    let backend = TestBackend::start().await;
    backend.sign_in_as("tok123", Some("yogev")).await;

    Mock::given(method("POST"))
        .and(path(api_path("upload.php")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "file too large",
        })))
        .mount(&backend.server)
        .await;

    let err = backend
        .client
        .upload_file(vec![0xFF, 0xD8], "big.jpg")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Api(ref message) if message == "file too large"));
}
