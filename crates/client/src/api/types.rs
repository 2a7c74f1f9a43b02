//! Request filters and response shapes of the QuickShop API.

use std::fmt;

use chrono::{NaiveDate, Utc};
use quickshop_core::{
    CategoryId, Order, OrderStatus, OrdersPagination, Product, ProductsPagination, SortInfo,
    StoreId, UserId, UserRecord, user::split_name,
};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;

// =============================================================================
// Authentication
// =============================================================================

/// Result of a login attempt.
///
/// Wrong credentials are an expected outcome, not an error: they come back
/// as [`LoginOutcome::Rejected`] so callers check the value rather than rely
/// on error propagation.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Credentials were accepted and persisted.
    SignedIn {
        user: UserRecord,
        token: SecretString,
    },
    /// The server refused the credentials.
    Rejected { error: String },
}

impl LoginOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }

    /// Rejection message, if the login was refused.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::SignedIn { .. } => None,
            Self::Rejected { error } => Some(error),
        }
    }
}

/// Body of `POST auth.php`.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<LoginUser>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// User block of a successful login. The backend sends either a combined
/// `name` or separate name fields.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginUser {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    #[serde(default)]
    pub store_slug: Option<String>,
}

impl LoginUser {
    /// Normalize into the snapshot persisted under `user_data`.
    pub(crate) fn into_record(self) -> UserRecord {
        let (first_name, last_name) = split_name(
            self.name.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        );

        UserRecord {
            id: self.id,
            email: self.email,
            first_name,
            last_name,
            phone: self.phone.unwrap_or_default(),
            auth_token: None,
            created_at: Utc::now(),
            store_slug: self.store_slug.filter(|s| !s.trim().is_empty()),
            store_id: self.store_id,
        }
    }
}

/// Body of `GET ping.php`.
#[derive(Debug, Clone, Deserialize)]
pub struct PingResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

// =============================================================================
// Filters
// =============================================================================

/// Query parameters of `GET orders.php`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl OrderFilters {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "page", self.page);
        push_opt(&mut pairs, "limit", self.limit);
        push_opt(&mut pairs, "status", self.status.as_ref().map(OrderStatus::code));
        push_text(&mut pairs, "search", self.search.as_deref());
        push_opt(&mut pairs, "start_date", self.start_date);
        push_opt(&mut pairs, "end_date", self.end_date);
        pairs
    }
}

/// Sort direction for the products manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        })
    }
}

/// Query parameters of the products manager endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category_id: Option<CategoryId>,
    /// Free-text search, sent as `q`.
    pub search: Option<String>,
    /// Sort key, sent as `sort`.
    pub sort_by: Option<String>,
    pub sort_dir: Option<SortDirection>,
}

impl ProductFilters {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "page", self.page.filter(|p| *p > 0));
        push_opt(&mut pairs, "limit", self.limit.filter(|l| *l > 0));
        push_opt(&mut pairs, "category_id", self.category_id);
        push_text(&mut pairs, "q", self.search.as_deref());
        push_text(&mut pairs, "sort", self.sort_by.as_deref());
        push_opt(&mut pairs, "sort_dir", self.sort_dir);
        pairs
    }
}

/// Query parameters of `api/stores/{slug}/media`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub filter_type: Option<String>,
}

impl MediaFilters {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "page", self.page);
        push_opt(&mut pairs, "limit", self.limit);
        push_text(&mut pairs, "filter_type", self.filter_type.as_deref());
        pairs
    }
}

fn push_opt<T: ToString>(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        pairs.push((key, value.to_string()));
    }
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        pairs.push((key, value.to_owned()));
    }
}

// =============================================================================
// Responses
// =============================================================================

/// One page of `GET orders.php`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPage {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub pagination: OrdersPagination,
}

/// One page of the products manager endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(default, rename = "data")]
    pub products: Vec<Product>,
    #[serde(default)]
    pub pagination: ProductsPagination,
    #[serde(default)]
    pub sort: Option<SortInfo>,
}

/// Body of `POST upload.php`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// `{success, data?}` envelope used by order mutations.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Pull a list out of a response that is either a bare array or an object
/// carrying the array under one of `keys`.
pub(crate) fn extract_list<T: DeserializeOwned>(value: Value, keys: &[&str]) -> Result<Vec<T>, ApiError> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(mut map) => {
            let list = keys
                .iter()
                .find_map(|key| map.remove(*key).filter(Value::is_array));
            match list {
                Some(list) => Ok(serde_json::from_value(list)?),
                None => Err(ApiError::Decode(serde::de::Error::custom(format!(
                    "expected a list under one of {keys:?}"
                )))),
            }
        }
        Value::Null => Ok(Vec::new()),
        other => Err(ApiError::Decode(serde::de::Error::custom(format!(
            "expected a list, got {other}"
        )))),
    }
}
