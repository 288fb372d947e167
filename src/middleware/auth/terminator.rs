/*
 * Responsibility
 * - 認証判定の結果を HTTP に反映する (deny: 401/403 応答, allow: 下流へ委譲)
 * - self を消費するので 1 リクエストにつき終端処理はちょうど 1 回
 */
use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Rejection written by the terminator.
#[derive(Debug, Clone)]
pub struct Denial {
    pub status: StatusCode,
    pub body: String,
    /// Sent as `WWW-Authenticate` when the status is 401.
    pub challenge: Option<HeaderValue>,
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        // String bodies are served as text/plain; charset=utf-8
        let mut res = (self.status, self.body).into_response();

        if self.status == StatusCode::UNAUTHORIZED
            && let Some(challenge) = self.challenge
        {
            res.headers_mut().insert(header::WWW_AUTHENTICATE, challenge);
        }

        res
    }
}

/// Single-use exit of the authentication middleware.
pub struct Terminator {
    next: Next,
}

impl Terminator {
    pub fn new(next: Next) -> Self {
        Self { next }
    }

    /// Hands the request to the protected handler. The response is theirs.
    pub async fn allow(self, req: Request<Body>) -> Response {
        self.next.run(req).await
    }

    /// Ends the exchange without touching the downstream handler.
    pub fn deny(self, denial: Denial) -> Response {
        denial.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_denial_carries_challenge() {
        let res = Denial {
            status: StatusCode::UNAUTHORIZED,
            body: "Unauthorized".into(),
            challenge: Some(HeaderValue::from_static("Basic realm=\"Restricted\"")),
        }
        .into_response();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers().get(header::WWW_AUTHENTICATE).expect("challenge"),
            "Basic realm=\"Restricted\""
        );
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).expect("content type"),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn forbidden_denial_has_no_challenge() {
        let res = Denial {
            status: StatusCode::FORBIDDEN,
            body: "Unauthorized".into(),
            challenge: Some(HeaderValue::from_static("Basic realm=\"Restricted\"")),
        }
        .into_response();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(res.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
