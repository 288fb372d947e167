/*
 * Responsibility
 * - URL 構造を定義
 * - /health は公開、/private 配下は認証 middleware の内側
 * - 認証ポリシーの解決はここ (ルート登録時) で行い、失敗は起動失敗にする
 */
use axum::{Router, routing::get};

use crate::api::handlers::{health::health, protected};
use crate::middleware;
use crate::services::auth::ConfigurationError;
use crate::state::AppState;

pub const PROTECTED_RESOURCE_PATH: &str = "/private/success.html";
pub const PROFILE_PATH: &str = "/private/profile";

pub fn routes(state: &AppState) -> Result<Router<AppState>, ConfigurationError> {
    let policy = state.security.resolve(&state.protected)?;

    tracing::info!(
        client = policy.client.name(),
        authorizers = ?policy.authorizers,
        deny_status = policy.deny_status.as_u16(),
        "protecting /private routes"
    );

    let private: Router<AppState> = Router::new()
        .route(PROTECTED_RESOURCE_PATH, get(protected::success))
        .route(PROFILE_PATH, get(protected::profile));

    Ok(Router::new()
        .route("/health", get(health))
        .merge(middleware::auth::apply(private, policy)))
}
