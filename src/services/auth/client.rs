/*
 * Responsibility
 * - Extractor と Authenticator を名前付きで束ねる Client
 * - Client 名 → Client の registry (起動時に構築、以降 read-only)
 */
use std::{collections::HashMap, fmt, sync::Arc};

use axum::http::HeaderMap;
use thiserror::Error;

use super::{
    authenticator::{AuthenticationError, Authenticator},
    extractor::{BasicAuthExtractor, CredentialsExtractor, ExtractionError},
    profile::UserProfile,
    security::ConfigurationError,
};

/// "Not authenticated". The variant only feeds logging; callers decide the
/// response from the fact that authentication failed, not from why.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("credential extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthenticationError),
}

impl AuthFailure {
    /// Short label for log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Extraction(ExtractionError::MissingHeader) => "missing_credentials",
            Self::Extraction(_) => "malformed_credentials",
            Self::Authentication(AuthenticationError::BackendUnavailable(_)) => {
                "backend_unavailable"
            }
            Self::Authentication(_) => "invalid_credentials",
        }
    }
}

/// Named binding of one credentials extractor and one authenticator.
#[derive(Clone)]
pub struct Client {
    name: String,
    extractor: Arc<dyn CredentialsExtractor>,
    authenticator: Arc<dyn Authenticator>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").field("name", &self.name).finish()
    }
}

impl Client {
    pub fn new(
        name: impl Into<String>,
        extractor: Arc<dyn CredentialsExtractor>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            name: name.into(),
            extractor,
            authenticator,
        }
    }

    /// Direct Basic-auth client: `Authorization: Basic ...` checked by `authenticator`.
    pub fn direct_basic_auth(
        name: impl Into<String>,
        authenticator: impl Authenticator + 'static,
    ) -> Self {
        Self::new(name, Arc::new(BasicAuthExtractor), Arc::new(authenticator))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extracts credentials and, only if that succeeds, authenticates them.
    pub async fn try_authenticate(&self, headers: &HeaderMap) -> Result<UserProfile, AuthFailure> {
        let credentials = self.extractor.extract(headers)?;
        let mut profile = self.authenticator.authenticate(&credentials).await?;
        profile.client_name = Some(self.name.clone());
        Ok(profile)
    }
}

/// Client name → client. Names are unique.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Arc<Client>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, client: Client) -> Result<Self, ConfigurationError> {
        if self.clients.contains_key(client.name()) {
            return Err(ConfigurationError::DuplicateClient(client.name().to_string()));
        }
        self.clients
            .insert(client.name().to_string(), Arc::new(client));
        Ok(self)
    }

    pub fn find(&self, name: &str) -> Result<Arc<Client>, ConfigurationError> {
        self.clients
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownClient(name.to_string()))
    }
}
