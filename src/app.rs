/*
 * Responsibility
 * - Config読み込み → gate 構築 → Router 組み立て
 * - Middleware の適用 (recovery / logger / CORS / JWT)
 * - axum::serve() で起動
 */
use std::net::SocketAddr;
use std::panic;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{api, config::Config, middleware, state::AppState};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,token_gate=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing as well; the recovery layer turns them into 500s.
        tracing::error!(%info, "panic");
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    init_panic_hook();

    let config = Config::from_env()?;
    tracing::info!(
        "starting token gate demo in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    // A misconfigured gate stops startup here.
    let gate = config.jwt().resolve()?;
    tracing::debug!(?gate, "jwt gate ready");

    Ok(AppState::new(Arc::new(gate)))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(&state))
        .with_state(state);

    // Innermost first: the logger sees the 500 produced by recovery.
    let router = middleware::recovery::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::logger::apply(router)
}
