//! Core types for QuickShop.
//!
//! This module provides type-safe wrappers and wire models for the store
//! management API.

pub mod dashboard;
pub mod flag;
pub mod id;
pub mod order;
pub mod pagination;
pub mod product;
pub mod slug;
pub mod status;
pub mod store;
pub mod user;

pub use dashboard::{DashboardData, DashboardStats, PopularProduct, WeeklySales};
pub use id::*;
pub use order::{Order, OrderItem, OrderList};
pub use pagination::{OrdersPagination, ProductsPagination, SortInfo};
pub use product::{Category, MediaItem, Product, ProductKind, ProductOption, ProductVariant};
pub use slug::{SlugError, StoreSlug};
pub use status::*;
pub use store::StoreInfo;
pub use user::UserRecord;
