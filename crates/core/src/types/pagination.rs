//! Pagination metadata returned alongside list endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Pagination block of `orders.php`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersPagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default, rename = "totalPages")]
    pub total_pages: u32,
}

/// Pagination block of the products manager endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductsPagination {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// Sort metadata of the products manager endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortInfo {
    #[serde(default)]
    pub current: String,
    /// Sort key to display label.
    #[serde(default)]
    pub available_options: BTreeMap<String, String>,
}
