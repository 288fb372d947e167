/*
 * Responsibility
 * - 保護ルートに認証/認可を掛ける middleware (stateless: セッションを参照も作成もしない)
 * - Client で認証 → Authorizer で認可 → 下流へ委譲 or 401/403 で終端
 * - 成功時は UserProfile を request extensions に載せる (handler は CurrentProfile で受け取る)
 */
//! Per-request decision:
//!
//! ```text
//! Received → Authenticating → Authenticated | Unauthenticated
//!          → Authorizing → Allowed | Denied → Completed
//! ```

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, request::Parts},
    middleware::{self, Next},
    response::Response,
};

use super::terminator::{Denial, Terminator};
use crate::services::auth::{AuthFailure, AuthPolicy, UserProfile};

/// Lifecycle of one request's authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Received,
    Authenticating,
    Authenticated,
    Unauthenticated,
    Authorizing,
    Allowed,
    Denied,
    Completed,
}

impl AuthPhase {
    fn can_advance_to(self, next: AuthPhase) -> bool {
        use AuthPhase::*;
        matches!(
            (self, next),
            (Received, Authenticating)
                | (Authenticating, Authenticated | Unauthenticated)
                | (Authenticated, Authorizing)
                | (Authorizing, Allowed | Denied)
                | (Unauthenticated | Allowed | Denied, Completed)
        )
    }
}

/// Outcome of the decision pipeline.
#[derive(Debug)]
pub enum Decision {
    Allow(UserProfile),
    Unauthenticated(AuthFailure),
    /// Authenticated, but the named authorizer refused.
    Denied {
        profile_id: String,
        authorizer: String,
    },
}

/// Request-scoped state. Lives on the middleware's stack and is dropped with it.
#[derive(Debug)]
pub struct RequestAuthContext {
    phase: AuthPhase,
    path: String,
}

impl RequestAuthContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            phase: AuthPhase::Received,
            path: path.into(),
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    fn advance(&mut self, next: AuthPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "invalid auth transition {:?} -> {:?}",
            self.phase,
            next
        );
        tracing::trace!(path = %self.path, from = ?self.phase, to = ?next, "auth phase");
        self.phase = next;
    }

    /// Runs authentication then authorization. Never writes a response.
    pub async fn decide(&mut self, policy: &AuthPolicy, parts: &Parts) -> Decision {
        self.advance(AuthPhase::Authenticating);
        let profile = match policy.client.try_authenticate(&parts.headers).await {
            Ok(profile) => {
                self.advance(AuthPhase::Authenticated);
                profile
            }
            Err(failure) => {
                self.advance(AuthPhase::Unauthenticated);
                return Decision::Unauthenticated(failure);
            }
        };

        self.advance(AuthPhase::Authorizing);
        if let Some(refused_by) = policy.authorizers.first_refusal(&profile, parts) {
            self.advance(AuthPhase::Denied);
            return Decision::Denied {
                profile_id: profile.id,
                authorizer: refused_by.to_string(),
            };
        }

        self.advance(AuthPhase::Allowed);
        Decision::Allow(profile)
    }

    fn complete(&mut self) {
        self.advance(AuthPhase::Completed);
    }
}

impl Drop for RequestAuthContext {
    fn drop(&mut self) {
        // The future was dropped mid-decision (peer went away); nothing is written.
        if !matches!(
            self.phase,
            AuthPhase::Received | AuthPhase::Completed
        ) {
            tracing::debug!(
                path = %self.path,
                phase = ?self.phase,
                "authentication abandoned"
            );
        }
    }
}

/// Protects every route of `router` with `policy`.
///
/// The policy is resolved once and shared by all requests through one `Arc`.
///
/// 例：
/// ```ignore
/// let policy = security.resolve(&HandlerOptions::default().with_client_name("BasicAuthClient"))?;
/// let private = middleware::auth::require_auth::apply(private, policy);
/// ```
pub fn apply<S>(router: Router<S>, policy: AuthPolicy) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(
        Arc::new(policy),
        require_authentication,
    ))
}

async fn require_authentication(
    State(policy): State<Arc<AuthPolicy>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let terminator = Terminator::new(next);
    let (mut parts, body) = req.into_parts();
    let mut ctx = RequestAuthContext::new(parts.uri.path());

    let decision = ctx.decide(&policy, &parts).await;
    ctx.complete();

    match decision {
        Decision::Allow(profile) => {
            tracing::debug!(
                client = policy.client.name(),
                user = %profile.id,
                "request authenticated"
            );
            // middleware → extractor への受け渡し
            parts.extensions.insert(profile);
            terminator.allow(Request::from_parts(parts, body)).await
        }
        Decision::Unauthenticated(failure) => {
            tracing::warn!(
                client = policy.client.name(),
                path = %parts.uri.path(),
                reason = failure.reason(),
                error = %failure,
                "authentication failed"
            );
            terminator.deny(Denial {
                status: StatusCode::UNAUTHORIZED,
                body: policy.unauthorized_body.to_string(),
                challenge: Some(policy.challenge.clone()),
            })
        }
        Decision::Denied {
            profile_id,
            authorizer,
        } => {
            tracing::warn!(
                client = policy.client.name(),
                path = %parts.uri.path(),
                user = %profile_id,
                authorizer = %authorizer,
                "authorization denied"
            );
            terminator.deny(Denial {
                status: policy.deny_status,
                body: policy.unauthorized_body.to_string(),
                challenge: Some(policy.challenge.clone()),
            })
        }
    }
}
