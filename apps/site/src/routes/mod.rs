pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::admin::handlers as admin;
use crate::intake::handlers as intake;
use crate::layout::handlers as docs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Public forms
        .route("/api/waitlist", post(intake::handle_waitlist))
        .route("/api/apply", post(intake::handle_apply))
        // Downloadable documents
        .route("/docs/primer.pdf", get(docs::handle_primer))
        .route("/docs/whitepaper.pdf", get(docs::handle_whitepaper))
        // Admin
        .route("/admin/login", post(admin::handle_login))
        .route("/admin/logout", post(admin::handle_logout))
        .route("/admin/signups", get(admin::handle_list_signups))
        .route(
            "/admin/signups/:id/status",
            post(admin::handle_update_status),
        )
        .route("/admin/signups/:id/notes", post(admin::handle_update_notes))
        .route("/admin/export.csv", get(admin::handle_export_csv))
        .route("/admin/audit", get(admin::handle_audit_log))
        .with_state(state)
}
