/*
 * Responsibility
 * - 資格情報を検証して UserProfile を返す Authenticator の契約
 * - テスト用の実装 (固定ペア / username == password)
 * - 失敗は常に AuthenticationError として返す (panic しない)
 */
use async_trait::async_trait;
use subtle::ConstantTimeEq;
use thiserror::Error;

use super::{
    credentials::UsernamePasswordCredentials,
    profile::{USERNAME_ATTRIBUTE, UserProfile},
};

/// Authentication outcome other than success.
///
/// `BackendUnavailable` is kept apart from `InvalidCredentials` so callers can
/// log the difference; both end up as "not authenticated" on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("malformed credentials: {0}")]
    MalformedCredentials(&'static str),
    #[error("credential backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// Constant-time comparison of two byte slices.
pub(crate) fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.ct_eq(b).into()
}

fn username_profile(username: &str) -> UserProfile {
    UserProfile::new(username).with_attribute(USERNAME_ATTRIBUTE, username)
}

/// Validates credentials against an identity source.
///
/// Implementations are shared by every in-flight request, so `authenticate`
/// must not mutate shared state.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(
        &self,
        credentials: &UsernamePasswordCredentials,
    ) -> Result<UserProfile, AuthenticationError>;
}

/// Accepts exactly one configured username/password pair.
#[derive(Clone)]
pub struct FixedCredentialsAuthenticator {
    username: String,
    password: String,
}

impl FixedCredentialsAuthenticator {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl Authenticator for FixedCredentialsAuthenticator {
    async fn authenticate(
        &self,
        credentials: &UsernamePasswordCredentials,
    ) -> Result<UserProfile, AuthenticationError> {
        // Both halves are always compared.
        let user_ok = ct_eq(credentials.username().as_bytes(), self.username.as_bytes());
        let pass_ok = ct_eq(credentials.password().as_bytes(), self.password.as_bytes());
        if user_ok & pass_ok {
            Ok(username_profile(credentials.username()))
        } else {
            Err(AuthenticationError::InvalidCredentials)
        }
    }
}

/// Development authenticator: accepts any non-blank username whose password
/// equals the username.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTestAuthenticator;

#[async_trait]
impl Authenticator for SimpleTestAuthenticator {
    async fn authenticate(
        &self,
        credentials: &UsernamePasswordCredentials,
    ) -> Result<UserProfile, AuthenticationError> {
        if credentials.username().trim().is_empty() {
            return Err(AuthenticationError::MalformedCredentials("blank username"));
        }
        if credentials.password().trim().is_empty() {
            return Err(AuthenticationError::MalformedCredentials("blank password"));
        }
        if !ct_eq(
            credentials.username().as_bytes(),
            credentials.password().as_bytes(),
        ) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(username_profile(credentials.username()))
    }
}
