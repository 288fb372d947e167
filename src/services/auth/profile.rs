/*
 * Responsibility
 * - 認証成功時に Authenticator が生成する「認証済み主体」の型
 * - Authorizer と下流 handler が参照する (リクエストを跨いで共有しない)
 */
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Attribute holding the username the credentials were presented with.
pub const USERNAME_ATTRIBUTE: &str = "username";

/// Authenticated identity produced by an `Authenticator`.
///
/// - `id` is the authenticated username
/// - `client_name` is stamped by the `Client` that produced the profile
/// - `roles` are coarse-grained permissions consumed by role authorizers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub client_name: Option<String>,
    pub roles: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client_name: None,
            roles: BTreeSet::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
