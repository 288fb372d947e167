/*
 * Responsibility
 * - routes() の re-export
 */
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{PROFILE_PATH, PROTECTED_RESOURCE_PATH, routes};
