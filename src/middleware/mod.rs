/*
 * Responsibility
 * - middlware の公開インターフェース (re-export)
 * - auth::apply(...) / http::apply(...)
 */
pub mod auth;
pub mod http;
