//! QuickShop Core - Shared domain types.
//!
//! This crate provides the types used across the QuickShop store-management
//! client:
//! - `client` - Credential store, API client, session controller and loaders
//! - `cli` - Command-line surface driving the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no persistence. Wire formats of the QuickShop API are expressed
//! here through `serde` so every consumer decodes them the same way.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, store slugs, order statuses, users, orders,
//!   products, dashboard snapshots and store info

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
