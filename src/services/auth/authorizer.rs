/*
 * Responsibility
 * - 認証済み UserProfile に対する認可判定 (Authorizer) の契約と組み込み実装
 * - Authorizer 名 → Authorizer の registry
 * - 名前の列を「全て true なら許可」の RequireAll に解決する
 */
use std::{collections::HashMap, fmt, sync::Arc};

use axum::http::request::Parts;

use super::{profile::UserProfile, security::ConfigurationError};

/// Access decision over an authenticated profile and the request head.
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, profile: &UserProfile, request: &Parts) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&UserProfile, &Parts) -> bool + Send + Sync,
{
    fn is_authorized(&self, profile: &UserProfile, request: &Parts) -> bool {
        self(profile, request)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn is_authorized(&self, _profile: &UserProfile, _request: &Parts) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl Authorizer for DenyAll {
    fn is_authorized(&self, _profile: &UserProfile, _request: &Parts) -> bool {
        false
    }
}

/// Profile must carry every listed role.
#[derive(Debug, Clone)]
pub struct RequireAllRoles(Vec<String>);

impl RequireAllRoles {
    pub fn new<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }
}

impl Authorizer for RequireAllRoles {
    fn is_authorized(&self, profile: &UserProfile, _request: &Parts) -> bool {
        self.0.iter().all(|role| profile.has_role(role))
    }
}

/// Profile must carry at least one listed role. An empty list allows everyone.
#[derive(Debug, Clone)]
pub struct RequireAnyRole(Vec<String>);

impl RequireAnyRole {
    pub fn new<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }
}

impl Authorizer for RequireAnyRole {
    fn is_authorized(&self, profile: &UserProfile, _request: &Parts) -> bool {
        self.0.is_empty() || self.0.iter().any(|role| profile.has_role(role))
    }
}

type NamedAuthorizer = (String, Arc<dyn Authorizer>);

/// Ordered "all must pass" composite. Stops at the first refusal.
#[derive(Clone, Default)]
pub struct RequireAll {
    authorizers: Vec<NamedAuthorizer>,
}

impl fmt::Debug for RequireAll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.authorizers.iter().map(|(name, _)| name))
            .finish()
    }
}

impl RequireAll {
    /// Runs the authorizers in order.
    ///
    /// Returns the name of the first authorizer that refused, or `None` when
    /// access is allowed.
    pub fn first_refusal(&self, profile: &UserProfile, request: &Parts) -> Option<&str> {
        self.authorizers
            .iter()
            .find(|(_, authorizer)| !authorizer.is_authorized(profile, request))
            .map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.authorizers.is_empty()
    }
}

impl Authorizer for RequireAll {
    fn is_authorized(&self, profile: &UserProfile, request: &Parts) -> bool {
        self.first_refusal(profile, request).is_none()
    }
}

/// Authorizer name → authorizer. Names are unique.
#[derive(Clone, Default)]
pub struct AuthorizerRegistry {
    authorizers: HashMap<String, Arc<dyn Authorizer>>,
}

impl fmt::Debug for AuthorizerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.authorizers.keys()).finish()
    }
}

impl AuthorizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        name: impl Into<String>,
        authorizer: impl Authorizer + 'static,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if self.authorizers.contains_key(&name) {
            return Err(ConfigurationError::DuplicateAuthorizer(name));
        }
        self.authorizers.insert(name, Arc::new(authorizer));
        Ok(self)
    }

    /// Resolves names into a `RequireAll`, keeping their order.
    pub fn require_all<S: AsRef<str>>(&self, names: &[S]) -> Result<RequireAll, ConfigurationError> {
        let authorizers = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.authorizers
                    .get(name)
                    .map(|a| (name.to_string(), Arc::clone(a)))
                    .ok_or_else(|| ConfigurationError::UnknownAuthorizer(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RequireAll { authorizers })
    }
}
