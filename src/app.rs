/*
 * Responsibility
 * - Config読み込み → SecurityConfig 生成 → Router 組み立て
 * - 認証ポリシーはここで解決し、不正なら起動しない
 * - axum::serve() で起動
 */
use std::{panic, process};

use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::AppError;
use crate::middleware::http::{self, HttpLimits};
use crate::services::auth::{build_security, protected_route_options};
use crate::{api, state::AppState};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,stateless_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config)?;

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState, AppError> {
    let security = build_security(config)?;
    Ok(AppState::new(security, protected_route_options(config)))
}

/// Fails when the protected routes reference unknown clients or authorizers.
pub fn build_router(state: AppState, config: &Config) -> Result<Router, AppError> {
    let router = api::routes(&state)?.with_state(state);

    Ok(http::apply(
        router,
        HttpLimits {
            timeout: config.http_timeout,
            body_limit_bytes: config.http_body_limit_bytes,
        },
    ))
}
