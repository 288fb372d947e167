//! Factory: build the process-wide `SecurityConfig` and route options from `Config`.
use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::{
    AllowAll, AuthorizerRegistry, Client, ClientRegistry, DenyAll, HandlerOptions,
    InMemoryCredentialStore, RequireAllRoles, RequireAnyRole, SecurityConfig,
    SimpleTestAuthenticator,
};

pub const IS_AUTHENTICATED: &str = "isAuthenticated";
pub const DENY_ALL: &str = "denyAll";
pub const REQUIRE_ANY_ROLE: &str = "requireAnyRole";
pub const REQUIRE_ALL_ROLES: &str = "requireAllRoles";

pub fn build_security(config: &Config) -> Result<SecurityConfig, AppError> {
    let name = config.auth_client_name.as_str();
    let client = if config.auth_users.is_empty() {
        tracing::warn!("AUTH_USERS is empty; using the username == password test authenticator");
        Client::direct_basic_auth(name, SimpleTestAuthenticator)
    } else {
        let store = InMemoryCredentialStore::from_entries(
            config.auth_users.iter().map(String::as_str),
        )?;
        tracing::info!(users = config.auth_users.len(), client = name, "loaded credential store");
        Client::direct_basic_auth(name, store)
    };

    let clients = ClientRegistry::new().register(client)?;

    let mut authorizers = AuthorizerRegistry::new()
        .register(IS_AUTHENTICATED, AllowAll)?
        .register(DENY_ALL, DenyAll)?;
    if !config.auth_require_any_role.is_empty() {
        authorizers = authorizers.register(
            REQUIRE_ANY_ROLE,
            RequireAnyRole::new(config.auth_require_any_role.iter().cloned()),
        )?;
    }
    if !config.auth_require_all_roles.is_empty() {
        authorizers = authorizers.register(
            REQUIRE_ALL_ROLES,
            RequireAllRoles::new(config.auth_require_all_roles.iter().cloned()),
        )?;
    }

    Ok(SecurityConfig::new(clients, authorizers))
}

pub fn protected_route_options(config: &Config) -> HandlerOptions {
    config.auth_authorizers.iter().fold(
        HandlerOptions::default()
            .with_client_name(&config.auth_client_name)
            .with_deny_status(config.auth_deny_status)
            .with_unauthorized_body(&config.auth_unauthorized_body)
            .with_realm(&config.auth_realm),
        |options, name| options.with_authorizer_name(name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CLIENT_NAME;
    use crate::services::auth::{
        ConfigurationError, StoreError, UserProfile, hash_password,
    };
    use axum::http::Request;

    fn config(pairs: &[(&str, String)]) -> Config {
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        })
        .expect("config")
    }

    fn hashed(password: &str) -> String {
        hash_password(password).expect("hash")
    }

    #[test]
    fn default_config_resolves() {
        let config = config(&[]);
        let security = build_security(&config).expect("security");
        let policy = security
            .resolve(&protected_route_options(&config))
            .expect("policy");
        assert_eq!(policy.client.name(), DEFAULT_CLIENT_NAME);
        assert!(policy.authorizers.is_empty());
    }

    #[test]
    fn client_is_registered_under_the_configured_name() {
        let config = config(&[("AUTH_CLIENT_NAME", "ApiClient".to_string())]);
        let security = build_security(&config).expect("security");
        let policy = security
            .resolve(&protected_route_options(&config))
            .expect("policy");
        assert_eq!(policy.client.name(), "ApiClient");

        let err = security
            .resolve(&HandlerOptions::default().with_client_name(DEFAULT_CLIENT_NAME))
            .unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownClient(DEFAULT_CLIENT_NAME.into()));
    }

    #[test]
    fn unknown_authorizer_in_config_fails_resolution() {
        let config = config(&[("AUTH_AUTHORIZERS", "isAdmin".to_string())]);
        let security = build_security(&config).expect("security");
        let err = security
            .resolve(&protected_route_options(&config))
            .unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownAuthorizer("isAdmin".into()));
    }

    #[test]
    fn role_authorizer_is_registered_on_demand() {
        let config = config(&[
            ("AUTH_USERS", format!("alice:{}:admin", hashed("pw"))),
            ("AUTH_REQUIRE_ANY_ROLE", "admin".to_string()),
            ("AUTH_AUTHORIZERS", REQUIRE_ANY_ROLE.to_string()),
        ]);
        let security = build_security(&config).expect("security");
        assert!(security.resolve(&protected_route_options(&config)).is_ok());
    }

    #[test]
    fn all_roles_authorizer_is_registered_on_demand() {
        let without = config(&[("AUTH_AUTHORIZERS", REQUIRE_ALL_ROLES.to_string())]);
        assert_eq!(
            build_security(&without)
                .expect("security")
                .resolve(&protected_route_options(&without))
                .unwrap_err(),
            ConfigurationError::UnknownAuthorizer(REQUIRE_ALL_ROLES.into())
        );

        let with = config(&[
            ("AUTH_REQUIRE_ALL_ROLES", "admin,auditor".to_string()),
            ("AUTH_AUTHORIZERS", REQUIRE_ALL_ROLES.to_string()),
        ]);
        let policy = build_security(&with)
            .expect("security")
            .resolve(&protected_route_options(&with))
            .expect("policy");

        let (parts, _) = Request::builder()
            .uri("/private/success.html")
            .body(())
            .expect("request")
            .into_parts();
        let both = UserProfile::new("alice").with_roles(["admin", "auditor"]);
        let one = UserProfile::new("bob").with_roles(["admin"]);
        assert_eq!(policy.authorizers.first_refusal(&both, &parts), None);
        assert_eq!(
            policy.authorizers.first_refusal(&one, &parts),
            Some(REQUIRE_ALL_ROLES)
        );
    }

    #[test]
    fn malformed_users_fail_startup() {
        let config = config(&[("AUTH_USERS", "alice".to_string())]);
        assert!(matches!(
            build_security(&config),
            Err(AppError::Users(StoreError::InvalidEntry(_)))
        ));
    }
}
