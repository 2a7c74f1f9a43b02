//! `orders` subcommands.

use chrono::NaiveDate;
use quickshop_client::OrdersLoader;
use quickshop_client::api::OrderFilters;
use quickshop_core::{OrderId, OrderStatus};
use tracing::info;

use super::App;
use crate::error::CliError;
use crate::output;

pub fn filters(
    page: Option<u32>,
    limit: Option<u32>,
    status: Option<&str>,
    search: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> OrderFilters {
    OrderFilters {
        page,
        limit,
        status: status.map(OrderStatus::parse),
        search,
        start_date,
        end_date,
    }
}

pub async fn list(app: &App, filters: OrderFilters) -> Result<(), CliError> {
    app.require_session().await?;

    let loader = OrdersLoader::orders(
        app.client.clone(),
        app.session.handle(),
        filters,
        app.config.order_mutations,
    );
    loader.start().await;

    let state = loader.snapshot();
    match (state.data, state.error) {
        (_, Some(error)) => Err(CliError::Resource(error)),
        (Some(list), None) => {
            output::orders(&list);
            Ok(())
        }
        (None, None) => Ok(()),
    }
}

pub async fn show(app: &App, id: OrderId) -> Result<(), CliError> {
    app.require_session().await?;
    let order = app.client.get_order(id).await?;
    output::order(&order);
    Ok(())
}

pub async fn set_status(app: &App, id: OrderId, status: &str) -> Result<(), CliError> {
    let status = OrderStatus::parse(status);
    if let OrderStatus::Other(raw) = &status {
        return Err(CliError::UnknownStatus(raw.clone()));
    }

    app.require_session().await?;
    let updated = app.client.update_order_status(id, &status).await?;

    info!(order_id = %id, status = %status.code(), "order status updated");
    match updated {
        Some(order) => output::order(&order),
        None => output::line(&format!("Order {id} is now {}.", status.label())),
    }
    Ok(())
}

pub async fn delete(app: &App, id: OrderId, confirmed: bool) -> Result<(), CliError> {
    if !confirmed {
        return Err(CliError::Unconfirmed(id.as_i64()));
    }

    app.require_session().await?;
    app.client.delete_order(id).await?;

    info!(order_id = %id, "order deleted");
    output::line(&format!("Order {id} deleted."));
    Ok(())
}
