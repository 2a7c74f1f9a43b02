//! Orders loader with optimistic status changes and deletions.

use async_trait::async_trait;
use quickshop_core::{OrderId, OrderList, OrderStatus};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use super::{MutationMode, ResourceLoader, ResourceSource};
use crate::api::{ApiClient, ApiError, OrderFilters};
use crate::session::{SessionHandle, SessionState};

pub type OrdersLoader = ResourceLoader<OrdersSource>;

#[derive(Debug, Default)]
pub struct OrdersSource {
    filters: RwLock<OrderFilters>,
    mode: MutationMode,
}

impl OrdersSource {
    #[must_use]
    pub fn new(filters: OrderFilters, mode: MutationMode) -> Self {
        Self {
            filters: RwLock::new(filters),
            mode,
        }
    }
}

#[async_trait]
impl ResourceSource for OrdersSource {
    type Output = OrderList;
    const NAME: &'static str = "orders";

    async fn fetch(&self, client: &ApiClient, _session: &SessionState) -> Result<OrderList, ApiError> {
        let filters = self.filters.read().await.clone();
        let page = client.get_orders(&filters).await?;
        Ok(OrderList {
            orders: page.orders,
            total: page.pagination.total,
        })
    }
}

impl OrdersLoader {
    #[must_use]
    pub fn orders(
        client: ApiClient,
        session: SessionHandle,
        filters: OrderFilters,
        mode: MutationMode,
    ) -> Self {
        Self::new(client, session, OrdersSource::new(filters, mode))
    }

    /// Replace the filters used by the next refresh.
    pub async fn set_filters(&self, filters: OrderFilters) {
        *self.source().filters.write().await = filters;
    }

    #[must_use]
    pub const fn mutation_mode(&self) -> MutationMode {
        self.source().mode
    }

    /// Total matching orders on the server, as last reported and adjusted by
    /// local deletions.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.snapshot().data.map_or(0, |list| list.total)
    }

    /// Change an order's status in the loaded list.
    ///
    /// The edit is visible immediately. An order missing from the list is
    /// left alone. In [`MutationMode::WriteThrough`] the change is then sent
    /// to the server, and a failure refetches.
    #[instrument(skip(self), fields(order_id = %id, status = %status.code()))]
    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) {
        let applied = self
            .update(|list| list.set_status(id, status.clone()))
            .unwrap_or(false);

        if !applied {
            warn!("order not in loaded list, ignoring status change");
            return;
        }

        if self.mutation_mode() == MutationMode::WriteThrough {
            if let Err(e) = self.client().update_order_status(id, &status).await {
                warn!(error = %e, "status update rejected, refetching");
                self.refresh().await;
                return;
            }
            info!("order status sent");
        }
    }

    /// Remove an order from the loaded list and decrement the total.
    ///
    /// Same missing-order and write-through rules as
    /// [`update_order_status`](Self::update_order_status).
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: OrderId) {
        let removed = self.update(|list| list.remove(id)).unwrap_or(false);

        if !removed {
            warn!("order not in loaded list, ignoring delete");
            return;
        }

        if self.mutation_mode() == MutationMode::WriteThrough {
            if let Err(e) = self.client().delete_order(id).await {
                warn!(error = %e, "delete rejected, refetching");
                self.refresh().await;
                return;
            }
            info!("order deleted on server");
        }
    }
}
