//! Dashboard snapshot returned by `dashboard.php`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::order::Order;

/// Headline counters.
///
/// Sales sums are `null` on the wire when the store has no sales in the
/// period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub today_orders: u64,
    #[serde(default)]
    pub today_sales: Option<Decimal>,
    #[serde(default)]
    pub monthly_orders: u64,
    #[serde(default)]
    pub monthly_sales: Option<Decimal>,
    #[serde(default)]
    pub total_products: u64,
}

/// One day of the weekly sales chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySales {
    pub date: NaiveDate,
    #[serde(default)]
    pub orders_count: u64,
    #[serde(default)]
    pub total_sales: Decimal,
}

/// A best-selling product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularProduct {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default)]
    pub regular_price: Decimal,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub orders_count: u64,
    #[serde(default)]
    pub total_quantity: u64,
}

/// Full dashboard snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub stats: DashboardStats,
    #[serde(default)]
    pub weekly_sales: Vec<WeeklySales>,
    #[serde(default)]
    pub recent_orders: Vec<Order>,
    #[serde(default)]
    pub popular_products: Vec<PopularProduct>,
}

impl DashboardData {
    /// Sum of the weekly sales chart.
    #[must_use]
    pub fn weekly_total(&self) -> Decimal {
        self.weekly_sales.iter().map(|d| d.total_sales).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_decodes_dashboard_with_null_sales() {
        let data: DashboardData = serde_json::from_value(serde_json::json!({
            "stats": {
                "today_orders": 0,
                "today_sales": null,
                "monthly_orders": 156,
                "monthly_sales": 12450.75,
                "total_products": 89
            },
            "weekly_sales": [
                {"date": "2024-01-15", "orders_count": 5, "total_sales": 320.50},
                {"date": "2024-01-14", "orders_count": 8, "total_sales": "450.25"}
            ],
            "recent_orders": [],
            "popular_products": []
        }))
        .unwrap();

        assert_eq!(data.stats.today_sales, None);
        assert_eq!(data.stats.total_products, 89);
        assert_eq!(
            data.weekly_sales.first().unwrap().date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(data.weekly_total(), Decimal::from_str("770.75").unwrap());
    }
}
