/*
 * Responsibility
 * - リクエストから取り出した資格情報 (username/password) の型
 * - リクエスト単位で生成され、Authenticator に渡された後は破棄される
 */
use std::fmt;

/// Username/password pair carried by a single request.
///
/// The password is never printed: `Debug` redacts it so the value can be
/// attached to tracing spans without leaking secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct UsernamePasswordCredentials {
    username: String,
    password: String,
}

impl UsernamePasswordCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for UsernamePasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsernamePasswordCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
