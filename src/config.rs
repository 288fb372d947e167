/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, 認証 client/authorizer の選択, ユーザー定義など)
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::StatusCode;

use crate::services::auth::security::{DEFAULT_REALM, DEFAULT_UNAUTHORIZED_BODY};

pub const DEFAULT_CLIENT_NAME: &str = "BasicAuthClient";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub auth_client_name: String,
    pub auth_authorizers: Vec<String>,
    pub auth_deny_status: StatusCode,
    pub auth_unauthorized_body: String,
    pub auth_realm: String,
    /// `username:<argon2 PHC>[:role|role]`, separated by `;` (PHC strings contain `,`).
    /// Empty means the development authenticator.
    pub auth_users: Vec<String>,
    pub auth_require_any_role: Vec<String>,
    pub auth_require_all_roles: Vec<String>,

    pub http_timeout: Duration,
    pub http_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (the process environment in `from_env`).
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let auth_client_name = var("AUTH_CLIENT_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string());

        let auth_authorizers = split_list(var("AUTH_AUTHORIZERS"), ',');

        let auth_deny_status = match var("AUTH_DENY_STATUS").as_deref().map(str::trim) {
            None | Some("") | Some("401") => StatusCode::UNAUTHORIZED,
            Some("403") => StatusCode::FORBIDDEN,
            Some(_) => return Err(ConfigError::Invalid("AUTH_DENY_STATUS")),
        };

        let auth_unauthorized_body = var("AUTH_UNAUTHORIZED_BODY")
            .unwrap_or_else(|| DEFAULT_UNAUTHORIZED_BODY.to_string());

        let auth_realm = var("AUTH_REALM").unwrap_or_else(|| DEFAULT_REALM.to_string());

        let auth_users = split_list(var("AUTH_USERS"), ';');
        let auth_require_any_role = split_list(var("AUTH_REQUIRE_ANY_ROLE"), ',');
        let auth_require_all_roles = split_list(var("AUTH_REQUIRE_ALL_ROLES"), ',');

        let http_timeout = match var("HTTP_TIMEOUT_SECONDS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("HTTP_TIMEOUT_SECONDS"))?,
            None => Duration::from_secs(30),
        };

        let http_body_limit_bytes = match var("HTTP_BODY_LIMIT_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid("HTTP_BODY_LIMIT_BYTES"))?,
            None => 1024 * 1024,
        };

        Ok(Self {
            addr,
            app_env,
            auth_client_name,
            auth_authorizers,
            auth_deny_status,
            auth_unauthorized_body,
            auth_realm,
            auth_users,
            auth_require_any_role,
            auth_require_all_roles,
            http_timeout,
            http_body_limit_bytes,
        })
    }
}

fn split_list(raw: Option<String>, sep: char) -> Vec<String> {
    raw.unwrap_or_default()
        .split(sep)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
