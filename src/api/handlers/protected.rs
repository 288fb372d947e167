/*
 * Responsibility
 * - 認証 middleware の下流にある保護リソース
 * - ここに到達した時点で認証/認可は済んでいる
 */
use axum::Json;

use crate::api::extractors::CurrentProfile;
use crate::services::auth::UserProfile;

pub const SUCCESS_BODY: &str = "authenticationSuccess";

/// GET /private/success.html
pub async fn success() -> &'static str {
    SUCCESS_BODY
}

/// GET /private/profile
pub async fn profile(CurrentProfile(profile): CurrentProfile) -> Json<UserProfile> {
    Json(profile)
}
