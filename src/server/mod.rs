//! HTTP front end.
//!
//! Thin layer over the dispatcher: route, authenticate, decode JSON, hand
//! off, serialize the typed result back.

mod auth;
mod routes;

pub use routes::{router, AppState};
