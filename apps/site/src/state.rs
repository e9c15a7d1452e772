use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::Config;
use crate::guard::client::TrustProxy;
use crate::guard::{AdminGuard, RateLimiter};
use crate::layout::{DocumentLibrary, LayoutConfig};
use crate::notify::Mailer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Session, rate-limit and audit chain for the admin surface.
    pub guard: Arc<AdminGuard>,
    /// Shared with `guard`; public forms use their own hashed-IP buckets.
    pub limiter: Arc<RateLimiter>,
    pub mailer: Mailer,
    pub documents: Arc<DocumentLibrary>,
    pub layout_config: LayoutConfig,
}

impl FromRef<AppState> for TrustProxy {
    fn from_ref(state: &AppState) -> Self {
        TrustProxy(state.config.trust_proxy)
    }
}

#[cfg(test)]
pub fn test_state(admin_key: Option<&str>) -> AppState {
    test_state_with_sink(admin_key, Arc::new(crate::guard::audit::MemoryAuditSink::default()))
}

/// State for router tests. The pool connects lazily, so requests rejected
/// before persistence never touch a database.
#[cfg(test)]
pub fn test_state_with_sink(
    admin_key: Option<&str>,
    audit: Arc<dyn crate::guard::AuditSink>,
) -> AppState {
    let config = Config::for_tests(admin_key);
    let db = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .unwrap();
    let limiter = Arc::new(RateLimiter::in_memory());
    let guard = Arc::new(AdminGuard::new(
        config.admin_key.clone(),
        limiter.clone(),
        audit,
    ));

    AppState {
        db,
        mailer: Mailer::from_config(&config).unwrap(),
        config,
        guard,
        limiter,
        documents: Arc::new(DocumentLibrary::load().unwrap()),
        layout_config: LayoutConfig::default(),
    }
}
