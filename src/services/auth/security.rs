/*
 * Responsibility
 * - Client / Authorizer registry をまとめたプロセス共通の SecurityConfig
 * - ルート単位の HandlerOptions (client 名, authorizer 名, deny status)
 * - HandlerOptions をルート登録時に解決する (未知の名前は起動失敗)
 */
use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use thiserror::Error;

use super::{
    authorizer::{AuthorizerRegistry, RequireAll},
    client::{Client, ClientRegistry},
};

pub const DEFAULT_UNAUTHORIZED_BODY: &str = "Unauthorized";
pub const DEFAULT_REALM: &str = "Restricted";

/// Misconfiguration detected while wiring routes. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("client already registered: {0}")]
    DuplicateClient(String),
    #[error("unknown client: {0}")]
    UnknownClient(String),
    #[error("authorizer already registered: {0}")]
    DuplicateAuthorizer(String),
    #[error("unknown authorizer: {0}")]
    UnknownAuthorizer(String),
    #[error("deny status must be 401 or 403, got {0}")]
    InvalidDenyStatus(u16),
    #[error("realm is not a valid header value: {0}")]
    InvalidRealm(String),
}

/// Registries shared read-only by every request.
#[derive(Debug, Clone, Default)]
pub struct SecurityConfig {
    pub clients: ClientRegistry,
    pub authorizers: AuthorizerRegistry,
}

impl SecurityConfig {
    pub fn new(clients: ClientRegistry, authorizers: AuthorizerRegistry) -> Self {
        Self {
            clients,
            authorizers,
        }
    }

    /// Resolves route options once, at registration time.
    pub fn resolve(&self, options: &HandlerOptions) -> Result<AuthPolicy, ConfigurationError> {
        if options.deny_status != StatusCode::UNAUTHORIZED
            && options.deny_status != StatusCode::FORBIDDEN
        {
            return Err(ConfigurationError::InvalidDenyStatus(
                options.deny_status.as_u16(),
            ));
        }

        let challenge = HeaderValue::from_str(&format!("Basic realm=\"{}\"", options.realm))
            .map_err(|_| ConfigurationError::InvalidRealm(options.realm.clone()))?;

        let client = self.clients.find(&options.client_name)?;
        let authorizers = self.authorizers.require_all(options.authorizer_names.as_slice())?;

        Ok(AuthPolicy {
            client,
            authorizers: Arc::new(authorizers),
            deny_status: options.deny_status,
            unauthorized_body: Arc::from(options.unauthorized_body.as_str()),
            challenge,
        })
    }
}

/// Per-route selection of client and authorizers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOptions {
    pub client_name: String,
    pub authorizer_names: Vec<String>,
    /// Status used when authorization (not authentication) fails.
    pub deny_status: StatusCode,
    pub unauthorized_body: String,
    pub realm: String,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            authorizer_names: Vec::new(),
            deny_status: StatusCode::UNAUTHORIZED,
            unauthorized_body: DEFAULT_UNAUTHORIZED_BODY.to_string(),
            realm: DEFAULT_REALM.to_string(),
        }
    }
}

impl HandlerOptions {
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    pub fn with_authorizer_name(mut self, name: impl Into<String>) -> Self {
        self.authorizer_names.push(name.into());
        self
    }

    pub fn with_deny_status(mut self, status: StatusCode) -> Self {
        self.deny_status = status;
        self
    }

    pub fn with_unauthorized_body(mut self, body: impl Into<String>) -> Self {
        self.unauthorized_body = body.into();
        self
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }
}

/// `HandlerOptions` after name resolution. Clones share every registry entry.
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    pub client: Arc<Client>,
    pub authorizers: Arc<RequireAll>,
    pub deny_status: StatusCode,
    pub unauthorized_body: Arc<str>,
    /// `WWW-Authenticate` value sent with 401 responses.
    pub challenge: HeaderValue,
}
