//! Catalog endpoints: products, categories, galleries and media.

use quickshop_core::{Category, MediaItem, Product, ProductId, StoreSlug};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use super::client::with_query;
use super::types::{MediaFilters, ProductFilters, ProductPage, extract_list};
use super::{ApiClient, ApiError, ValidationError};

#[derive(Deserialize)]
struct ProductLookup {
    #[serde(default)]
    data: Vec<Product>,
}

impl ApiClient {
    /// List products of the current store.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingStoreSlug` without a network call if
    /// no store slug is known; otherwise see [`Self::get_products_for`].
    pub async fn get_products(&self, filters: &ProductFilters) -> Result<ProductPage, ApiError> {
        let slug = self.require_store_slug().await?;
        self.get_products_for(&slug, filters).await
    }

    /// List products of `slug` through the products manager on the stores
    /// host.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NotSignedIn` without a network call if no
    /// token is held, and `ApiError` for request failures.
    #[instrument(skip(self), fields(store = %slug))]
    pub async fn get_products_for(
        &self,
        slug: &StoreSlug,
        filters: &ProductFilters,
    ) -> Result<ProductPage, ApiError> {
        if !self.is_authenticated().await {
            return Err(ValidationError::NotSignedIn.into());
        }

        let url = self.stores_url(&format!("api/stores/{slug}/products-manager"))?;
        self.get(with_query(url, &filters.query_pairs())).await
    }

    /// Fetch a single product of the current store.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingStoreSlug` without a network call if
    /// no store slug is known, `ApiError::NotFound` if the product does not
    /// exist, and `ApiError` for request failures.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let slug = self.require_store_slug().await?;
        let url = with_query(
            self.api_url(&format!("api/stores/{slug}/products"))?,
            &[("ids", id.to_string())],
        );

        let lookup: ProductLookup = self.get(url).await?;
        lookup
            .data
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("product {id}")))
    }

    /// List categories of the current store.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingStoreSlug` without a network call if
    /// no store slug is known, and `ApiError` for request failures.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        let slug = self.require_store_slug().await?;
        let url = self.api_url(&format!("api/stores/{slug}/categories"))?;
        let value: Value = self.get(url).await?;
        extract_list(value, &["data", "categories"])
    }

    /// List gallery images of a product.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingStoreSlug` without a network call if
    /// no store slug is known, and `ApiError` for request failures.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product_galleries(&self, product_id: ProductId) -> Result<Vec<MediaItem>, ApiError> {
        let slug = self.require_store_slug().await?;
        let url = with_query(
            self.api_url(&format!("api/stores/{slug}/product-galleries"))?,
            &[("product_id", product_id.to_string())],
        );
        let value: Value = self.get(url).await?;
        extract_list(value, &["data", "galleries", "images"])
    }

    /// List the store's media library.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingStoreSlug` without a network call if
    /// no store slug is known, and `ApiError` for request failures.
    #[instrument(skip(self))]
    pub async fn get_media(&self, filters: &MediaFilters) -> Result<Vec<MediaItem>, ApiError> {
        let slug = self.require_store_slug().await?;
        let url = with_query(
            self.api_url(&format!("api/stores/{slug}/media"))?,
            &filters.query_pairs(),
        );
        let value: Value = self.get(url).await?;
        extract_list(value, &["data", "media", "items"])
    }
}
