//! Authentication session.
//!
//! [`SessionController`] drives a [`SessionState`] machine from the
//! [`ApiClient`](crate::ApiClient): it checks stored credentials on startup,
//! runs login and logout, and follows credential invalidations published by
//! the client. Consumers observe the state through a [`SessionHandle`].

mod controller;
mod state;

pub use controller::{SessionController, SessionHandle};
pub use state::{SessionEvent, SessionState, reduce};
