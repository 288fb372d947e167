use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use crate::services::auth::UserProfile;

/// Handler で、認証済み UserProfile を受け取るための extractor
/// middleware が UserProfile を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（認証がかかってない・ミドルウェア未設定）
pub struct CurrentProfile(pub UserProfile);

impl<S> FromRequestParts<S> for CurrentProfile
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserProfile>()
            .cloned()
            .map(CurrentProfile)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
