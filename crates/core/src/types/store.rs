//! Store profile returned by `store.php`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::{StoreId, UserId};

/// Store profile and settings.
///
/// The backend returns well over a hundred theme and delivery settings. The
/// fields the client acts on are typed; everything else is kept verbatim in
/// `settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub id: StoreId,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub total_products: Option<u64>,
    #[serde(default)]
    pub today_orders: Option<u64>,
    #[serde(default)]
    pub today_sales: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "super::flag::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl StoreInfo {
    /// Public storefront URL: the custom domain when configured, otherwise
    /// the path under `stores_base`.
    #[must_use]
    pub fn storefront_url(&self, stores_base: &str) -> String {
        match self.custom_domain.as_deref().map(str::trim) {
            Some(domain) if !domain.is_empty() => format!("https://{domain}"),
            _ => format!("{}/{}", stores_base.trim_end_matches('/'), self.slug),
        }
    }

    /// Look up a raw setting by name.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store(json: serde_json::Value) -> StoreInfo {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_keeps_untyped_settings() {
        let s = store(serde_json::json!({
            "id": 9,
            "slug": "yogev",
            "name": "Yogev Bakery",
            "primary_color": "#000",
            "delivery_enabled": 1,
            "is_active": 1
        }));
        assert_eq!(s.is_active, Some(true));
        assert_eq!(s.setting("primary_color"), Some(&serde_json::json!("#000")));
        assert!(s.setting("slug").is_none());
    }

    #[test]
    fn test_storefront_url() {
        let mut s = store(serde_json::json!({"id": 1, "slug": "yogev"}));
        assert_eq!(
            s.storefront_url("https://quick-shop.co.il/"),
            "https://quick-shop.co.il/yogev"
        );
        s.custom_domain = Some("shop.example".to_owned());
        assert_eq!(s.storefront_url("https://quick-shop.co.il/"), "https://shop.example");
    }
}
