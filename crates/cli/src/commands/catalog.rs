//! `products`, `categories` and `media`.

use quickshop_client::ProductsLoader;
use quickshop_client::api::{MediaFilters, ProductFilters, SortDirection};
use quickshop_core::{CategoryId, ProductId, StoreSlug};

use super::App;
use crate::error::CliError;
use crate::output;

pub fn filters(
    page: Option<u32>,
    limit: Option<u32>,
    category_id: Option<CategoryId>,
    search: Option<String>,
    sort_by: Option<String>,
    descending: bool,
) -> ProductFilters {
    ProductFilters {
        page,
        limit,
        category_id,
        search,
        sort_by,
        sort_dir: descending.then_some(SortDirection::Desc),
    }
}

pub async fn list_products(
    app: &App,
    store: Option<StoreSlug>,
    filters: ProductFilters,
) -> Result<(), CliError> {
    app.require_session().await?;

    if let Some(slug) = store {
        let page = app.client.get_products_for(&slug, &filters).await?;
        output::products(&page.products, page.pagination.total);
        return Ok(());
    }

    let loader = ProductsLoader::products(
        app.client.clone(),
        app.session.handle(),
        filters,
        app.config.fallback_store_slug.clone(),
    );
    loader.start().await;

    let state = loader.snapshot();
    if let Some(error) = state.error {
        return Err(CliError::Resource(error));
    }
    if let Some(page) = state.data {
        output::products(&page.products, page.pagination.total);
    }
    Ok(())
}

pub async fn show_product(app: &App, id: ProductId) -> Result<(), CliError> {
    app.require_session().await?;
    let product = app.client.get_product(id).await?;
    output::product(&product);
    Ok(())
}

pub async fn gallery(app: &App, id: ProductId) -> Result<(), CliError> {
    app.require_session().await?;
    let items = app.client.get_product_galleries(id).await?;
    output::media(&items);
    Ok(())
}

pub async fn categories(app: &App) -> Result<(), CliError> {
    app.require_session().await?;
    let categories = app.client.get_categories().await?;
    output::categories(&categories);
    Ok(())
}

pub async fn media(
    app: &App,
    page: Option<u32>,
    limit: Option<u32>,
    filter_type: Option<String>,
) -> Result<(), CliError> {
    app.require_session().await?;
    let items = app
        .client
        .get_media(&MediaFilters {
            page,
            limit,
            filter_type,
        })
        .await?;
    output::media(&items);
    Ok(())
}
