//! Catalog wire models: products, variants, categories and media.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::id::{CategoryId, MediaId, ProductId, VariantId};

/// Product structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    #[default]
    #[serde(alias = "regular")]
    Simple,
    Variable,
    #[serde(other)]
    Unknown,
}

/// A product as returned by the products manager endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, rename = "type")]
    pub kind: ProductKind,
    /// Structure as reported by the products manager, which supersedes `type`.
    #[serde(default)]
    pub product_type: Option<ProductKind>,
    #[serde(default)]
    pub regular_price: Decimal,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub inventory_quantity: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub gallery_urls: Vec<String>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub options: Vec<ProductOption>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub category_names: Vec<String>,
    #[serde(default)]
    pub product_url: String,
    #[serde(default)]
    pub badge_text: Option<String>,
    #[serde(default)]
    pub badge_color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(
        default,
        deserialize_with = "super::flag::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_active: Option<bool>,
    #[serde(
        default,
        deserialize_with = "super::flag::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_hidden: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Product {
    /// Whether a sale price below the regular price is set.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.sale_price
            .is_some_and(|sale| sale > Decimal::ZERO && sale < self.regular_price)
    }

    /// Price a customer pays right now.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        match self.sale_price {
            Some(sale) if self.is_on_sale() => sale,
            _ => self.regular_price,
        }
    }

    /// Discount in whole percent, if on sale.
    #[must_use]
    pub fn discount_percent(&self) -> Option<Decimal> {
        if !self.is_on_sale() {
            return None;
        }
        let off = self.regular_price - self.effective_price();
        Some((off * Decimal::ONE_HUNDRED / self.regular_price).round())
    }

    /// Whether the product should be listed in the storefront.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.is_active.unwrap_or(true) && !self.is_hidden.unwrap_or(false)
    }

    /// Effective product structure.
    #[must_use]
    pub fn kind(&self) -> ProductKind {
        self.product_type.unwrap_or(self.kind)
    }

    /// Main image, falling back to the first gallery image.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .or_else(|| self.gallery().first().map(String::as_str))
    }

    /// Gallery images in display order.
    #[must_use]
    pub fn gallery(&self) -> &[String] {
        if self.gallery_urls.is_empty() {
            &self.images
        } else {
            &self.gallery_urls
        }
    }

    /// Category names, from whichever field the endpoint filled in.
    #[must_use]
    pub fn category_labels(&self) -> &[String] {
        if self.category_names.is_empty() {
            &self.categories
        } else {
            &self.category_names
        }
    }

    /// Stock summed over variants for variable products, otherwise the
    /// product's own inventory.
    #[must_use]
    pub fn total_inventory(&self) -> i64 {
        if self.kind() == ProductKind::Variable && !self.variants.is_empty() {
            self.variants.iter().map(|v| v.inventory_quantity).sum()
        } else {
            self.inventory_quantity
        }
    }
}

/// Accepts either a JSON list of strings or a single comma-separated string.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(items) => items,
        Raw::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
        Raw::Null(()) => Vec::new(),
    })
}

/// A purchasable variant of a variable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub regular_price: Decimal,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub inventory_quantity: i64,
    /// Option name to chosen value, e.g. `{"size": "L"}`.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    #[serde(default)]
    pub display_type: Option<String>,
    #[serde(default)]
    pub color_code: Option<String>,
}

/// An option axis of a variable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub display_type: Option<String>,
}

/// A catalog category. Fields the client does not model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An uploaded media file or gallery image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(default)]
    pub id: Option<MediaId>,
    #[serde(default, alias = "image_url", alias = "file_url")]
    pub url: Option<String>,
    #[serde(default, alias = "file_name")]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn product(json: serde_json::Value) -> Product {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_decodes_manager_product() {
        let p = product(serde_json::json!({
            "id": 5,
            "name": "Sourdough",
            "type": "variable",
            "regular_price": 40,
            "sale_price": "30",
            "inventory_quantity": 0,
            "images": ["a.jpg", "b.jpg"],
            "variants": [
                {"id": 1, "sku": "S", "regular_price": 40, "inventory_quantity": 3, "options": {"size": "S"}},
                {"id": 2, "sku": "L", "regular_price": 40, "inventory_quantity": 4, "options": {"size": "L"}}
            ],
            "is_active": "1",
            "is_hidden": 0
        }));

        assert_eq!(p.kind(), ProductKind::Variable);
        assert_eq!(p.total_inventory(), 7);
        assert_eq!(p.thumbnail(), Some("a.jpg"));
        assert!(p.is_visible());
        assert!(p.is_on_sale());
        assert_eq!(p.effective_price(), Decimal::from(30));
        assert_eq!(p.discount_percent(), Some(Decimal::from(25)));
    }

    #[test]
    fn test_kind_aliases_and_unknown() {
        let p = product(serde_json::json!({"id": 1, "type": "regular"}));
        assert_eq!(p.kind, ProductKind::Simple);
        let p = product(serde_json::json!({"id": 1, "type": "bundle"}));
        assert_eq!(p.kind, ProductKind::Unknown);
    }

    #[test]
    fn test_manager_fields_supersede_legacy_ones() {
        let p = product(serde_json::json!({
            "id": 1,
            "type": "simple",
            "product_type": "variable",
            "images": ["old.jpg"],
            "image_url": "main.jpg",
            "gallery_urls": ["g1.jpg"],
            "categories": ["x"],
            "category_names": "Bread, Cakes"
        }));
        assert_eq!(p.kind(), ProductKind::Variable);
        assert_eq!(p.thumbnail(), Some("main.jpg"));
        assert_eq!(p.gallery(), ["g1.jpg".to_owned()]);
        assert_eq!(p.category_labels(), ["Bread".to_owned(), "Cakes".to_owned()]);
    }

    #[test]
    fn test_sale_price_above_regular_is_ignored() {
        let p = product(serde_json::json!({
            "id": 1,
            "regular_price": "10.00",
            "sale_price": "12.00"
        }));
        assert!(!p.is_on_sale());
        assert_eq!(p.effective_price(), Decimal::from_str("10.00").unwrap());
        assert_eq!(p.discount_percent(), None);
    }

    #[test]
    fn test_category_keeps_unknown_fields() {
        let c: Category =
            serde_json::from_str(r#"{"id": 3, "name": "Bread", "parent_id": 1}"#).unwrap();
        assert_eq!(c.name, "Bread");
        assert_eq!(c.extra.get("parent_id"), Some(&serde_json::json!(1)));
    }
}
