//! Dashboard, store info and products loaders.

use async_trait::async_trait;
use quickshop_core::{DashboardData, StoreInfo, StoreSlug};
use tokio::sync::RwLock;
use tracing::debug;

use super::{ResourceLoader, ResourceSource};
use crate::api::{ApiClient, ApiError, ProductFilters, ProductPage, ValidationError};
use crate::session::{SessionHandle, SessionState};

pub type DashboardLoader = ResourceLoader<DashboardSource>;
pub type StoreInfoLoader = ResourceLoader<StoreInfoSource>;
pub type ProductsLoader = ResourceLoader<ProductsSource>;

#[derive(Debug, Default)]
pub struct DashboardSource;

#[async_trait]
impl ResourceSource for DashboardSource {
    type Output = DashboardData;
    const NAME: &'static str = "dashboard";

    async fn fetch(&self, client: &ApiClient, _session: &SessionState) -> Result<DashboardData, ApiError> {
        client.get_dashboard_data().await
    }
}

impl DashboardLoader {
    #[must_use]
    pub fn dashboard(client: ApiClient, session: SessionHandle) -> Self {
        Self::new(client, session, DashboardSource)
    }
}

#[derive(Debug, Default)]
pub struct StoreInfoSource;

#[async_trait]
impl ResourceSource for StoreInfoSource {
    type Output = StoreInfo;
    const NAME: &'static str = "store_info";

    async fn fetch(&self, client: &ApiClient, _session: &SessionState) -> Result<StoreInfo, ApiError> {
        client.get_store_info().await
    }
}

impl StoreInfoLoader {
    #[must_use]
    pub fn store_info(client: ApiClient, session: SessionHandle) -> Self {
        Self::new(client, session, StoreInfoSource)
    }
}

/// Products of the signed-in user's store.
#[derive(Debug, Default)]
pub struct ProductsSource {
    filters: RwLock<ProductFilters>,
    /// Used when the user record carries no store slug.
    fallback_slug: Option<StoreSlug>,
}

impl ProductsSource {
    #[must_use]
    pub fn new(filters: ProductFilters, fallback_slug: Option<StoreSlug>) -> Self {
        Self {
            filters: RwLock::new(filters),
            fallback_slug,
        }
    }

    /// Store slug to query: the user's own, else the fallback.
    fn resolve_slug(&self, session: &SessionState) -> Result<StoreSlug, ValidationError> {
        let own = session
            .user()
            .and_then(|user| user.store_slug.as_deref())
            .and_then(|slug| StoreSlug::parse(slug).ok());

        if own.is_none() && self.fallback_slug.is_some() {
            debug!("user has no store slug, using fallback");
        }

        own.or_else(|| self.fallback_slug.clone())
            .ok_or(ValidationError::MissingStoreSlug)
    }
}

#[async_trait]
impl ResourceSource for ProductsSource {
    type Output = ProductPage;
    const NAME: &'static str = "products";

    async fn fetch(&self, client: &ApiClient, session: &SessionState) -> Result<ProductPage, ApiError> {
        let slug = self.resolve_slug(session)?;
        let filters = self.filters.read().await.clone();
        client.get_products_for(&slug, &filters).await
    }
}

impl ProductsLoader {
    #[must_use]
    pub fn products(
        client: ApiClient,
        session: SessionHandle,
        filters: ProductFilters,
        fallback_slug: Option<StoreSlug>,
    ) -> Self {
        Self::new(client, session, ProductsSource::new(filters, fallback_slug))
    }

    /// Replace the filters used by the next refresh.
    pub async fn set_filters(&self, filters: ProductFilters) {
        *self.source().filters.write().await = filters;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quickshop_core::{UserId, UserRecord};
    use secrecy::SecretString;

    use super::*;

    fn signed_in(store_slug: Option<&str>) -> SessionState {
        let mut user = UserRecord::minimal(UserId::new(1));
        user.store_slug = store_slug.map(str::to_owned);
        SessionState::Authenticated {
            user,
            token: SecretString::from("tok"),
        }
    }

    #[test]
    fn test_slug_from_user() {
        let source = ProductsSource::new(ProductFilters::default(), StoreSlug::parse("fallback").ok());
        let slug = source.resolve_slug(&signed_in(Some("yogev"))).unwrap();
        assert_eq!(slug.as_str(), "yogev");
    }

    #[test]
    fn test_slug_falls_back() {
        let source = ProductsSource::new(ProductFilters::default(), StoreSlug::parse("fallback").ok());
        let slug = source.resolve_slug(&signed_in(None)).unwrap();
        assert_eq!(slug.as_str(), "fallback");

        let slug = source.resolve_slug(&signed_in(Some("not a slug"))).unwrap();
        assert_eq!(slug.as_str(), "fallback");
    }

    #[test]
    fn test_slug_missing_without_fallback() {
        let source = ProductsSource::default();
        assert_eq!(
            source.resolve_slug(&signed_in(None)),
            Err(ValidationError::MissingStoreSlug)
        );
    }
}
