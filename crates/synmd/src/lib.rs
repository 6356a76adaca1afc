//! synmd - in-memory Remote State Store for the SynM console
//!
//! Serves the roster, per-entity detail, intent actions and server
//! settings over HTTP, guarded by a single shared key.

pub mod actions;
pub mod auth;
pub mod middleware;
pub mod routes;
pub mod seed;
pub mod server;
pub mod state;

pub use server::app;
pub use state::{create_shared_store, SharedStore, StoreState};
