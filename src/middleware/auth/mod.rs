/*
 * Responsibility
 * - 認証 middleware (require_auth) と終端処理 (terminator) の公開
 */
pub mod require_auth;
pub mod terminator;

pub use require_auth::{AuthPhase, Decision, RequestAuthContext, apply};
pub use terminator::{Denial, Terminator};
