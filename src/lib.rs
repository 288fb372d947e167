//! Stateless HTTP authentication for axum routes.
//!
//! Every request to a protected route carries its own credentials
//! (`Authorization: Basic ...`); nothing is remembered between requests.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
