//! Order wire models and the in-memory order list.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, OrderItemId};
use super::status::{OrderStatus, PaymentStatus};

/// A store order as returned by `orders.php` and `dashboard.php`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub total_formatted: String,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_method_text: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::flag::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub paid_status: Option<bool>,
    #[serde(default)]
    pub delivery_method: Option<String>,
    #[serde(default)]
    pub order_notes: Option<String>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
}

impl Order {
    /// Customer's full name.
    #[must_use]
    pub fn customer_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    /// Payment state derived from `paid_status` and the payment method.
    #[must_use]
    pub fn payment_status(&self) -> PaymentStatus {
        if self.paid_status == Some(true) {
            PaymentStatus::Paid
        } else if self
            .payment_method
            .as_deref()
            .is_some_and(|m| m.starts_with("cash"))
        {
            PaymentStatus::Cash
        } else {
            PaymentStatus::AwaitingPayment
        }
    }

    /// Replace the status and its display text.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status_text = status.label().to_owned();
        self.status = status;
    }

    /// Case-insensitive match against the customer name, order id and order
    /// number. An empty query matches everything.
    #[must_use]
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.customer_name().to_lowercase().contains(&query)
            || self.id.to_string().contains(&query)
            || self
                .order_number
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&query))
    }
}

/// A single line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<OrderItemId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub total_formatted: Option<String>,
}

impl OrderItem {
    /// Name to show for this line, preferring the newer `name` field.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.product_name.as_deref())
            .unwrap_or_default()
    }
}

/// A page of orders together with the server-side total.
///
/// Local edits keep `total` consistent with removals so a list view can keep
/// showing the right count without a refetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderList {
    pub orders: Vec<Order>,
    pub total: u64,
}

impl OrderList {
    /// Set the status of the order with `id`. Returns `false` if it is not in
    /// the list.
    pub fn set_status(&mut self, id: OrderId, status: OrderStatus) -> bool {
        match self.orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.set_status(status);
                true
            }
            None => false,
        }
    }

    /// Remove the order with `id`, decrementing `total`. Returns `false` if it
    /// is not in the list.
    pub fn remove(&mut self, id: OrderId) -> bool {
        let before = self.orders.len();
        self.orders.retain(|o| o.id != id);
        let removed = self.orders.len() < before;
        if removed {
            self.total = self.total.saturating_sub(1);
        }
        removed
    }

    /// Look up an order by id.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }
}
