mod admin;
mod config;
mod db;
mod errors;
mod export;
mod guard;
mod intake;
mod layout;
mod models;
mod notify;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::guard::audit::PgAuditSink;
use crate::guard::{AdminGuard, RateLimiter};
use crate::layout::{DocumentLibrary, LayoutConfig};
use crate::notify::Mailer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Gatehouse site v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    let limiter = Arc::new(RateLimiter::in_memory());
    let audit = Arc::new(PgAuditSink::new(db.clone()));
    let guard = Arc::new(AdminGuard::new(
        config.admin_key.clone(),
        limiter.clone(),
        audit,
    ));

    let mailer = Mailer::from_config(&config)?;

    let documents = Arc::new(DocumentLibrary::load()?);
    let layout_config = LayoutConfig::default();
    info!(
        "Layout: {}x{}pt page, {}pt margins",
        layout_config.page_width, layout_config.page_height, layout_config.margin
    );

    let state = AppState {
        db,
        config: config.clone(),
        guard,
        limiter,
        mailer,
        documents,
        layout_config,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
