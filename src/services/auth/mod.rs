pub mod authenticator;
pub mod authorizer;
pub mod client;
pub mod credentials;
pub mod extractor;
pub mod factory;
pub mod profile;
pub mod security;
pub mod store;

pub use authenticator::{
    AuthenticationError, Authenticator, FixedCredentialsAuthenticator, SimpleTestAuthenticator,
};
pub use authorizer::{
    AllowAll, Authorizer, AuthorizerRegistry, DenyAll, RequireAll, RequireAllRoles, RequireAnyRole,
};
pub use client::{AuthFailure, Client, ClientRegistry};
pub use credentials::UsernamePasswordCredentials;
pub use extractor::{BasicAuthExtractor, CredentialsExtractor, ExtractionError};
pub use factory::{build_security, protected_route_options};
pub use profile::{USERNAME_ATTRIBUTE, UserProfile};
pub use security::{AuthPolicy, ConfigurationError, HandlerOptions, SecurityConfig};
pub use store::{InMemoryCredentialStore, StoreError, hash_password};
