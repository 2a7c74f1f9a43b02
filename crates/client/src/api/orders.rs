//! Order endpoints.

use quickshop_core::{Order, OrderId, OrderStatus};
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

use super::client::{Body, with_query};
use super::types::{DataEnvelope, OrderFilters, OrderPage};
use super::{ApiClient, ApiError};

#[derive(Deserialize)]
struct OrderEnvelope {
    order: Option<Order>,
}

impl ApiClient {
    /// List orders.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_orders(&self, filters: &OrderFilters) -> Result<OrderPage, ApiError> {
        let url = with_query(self.api_url("orders.php")?, &filters.query_pairs());
        self.get(url).await
    }

    /// Fetch a single order of the current store.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingStoreSlug` without a network call if
    /// no store slug is known, `ApiError::NotFound` if the answer carries no
    /// order, and `ApiError` for request failures.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        let slug = self.require_store_slug().await?;
        let url = with_query(
            self.api_url("orders.php")?,
            &[("id", id.to_string()), ("store", slug.to_string())],
        );

        let envelope: OrderEnvelope = self.get(url).await?;
        envelope
            .order
            .ok_or_else(|| ApiError::NotFound(format!("order {id}")))
    }

    /// Change an order's status on the server. Returns the updated order when
    /// the server echoes it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the server refuses.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: &OrderStatus,
    ) -> Result<Option<Order>, ApiError> {
        let url = self.api_url("orders.php")?;
        let body = serde_json::json!({ "id": id, "status": status.code() });
        let envelope: DataEnvelope<Order> = self.execute(Method::PUT, url, Body::Json(body)).await?;
        Ok(envelope.data)
    }

    /// Delete an order on the server.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the server refuses.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: OrderId) -> Result<(), ApiError> {
        let url = self.api_url("orders.php")?;
        let body = serde_json::json!({ "id": id });
        self.execute::<serde_json::Value>(Method::DELETE, url, Body::Json(body))
            .await?;
        Ok(())
    }
}
