//! Route handlers and router assembly.

pub mod auth;
pub mod cost_sheets;
pub mod deals;
pub mod quotations;

use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/deals", post(deals::create).get(deals::list))
        .route("/api/deals/{id}", get(deals::get))
        .route("/api/deals/{id}/stage", put(deals::update_stage))
        .route("/api/quotations/request", post(quotations::request))
        .route("/api/quotations", get(quotations::list))
        .route(
            "/api/quotations/stats/pending-count",
            get(quotations::pending_count),
        )
        .route(
            "/api/quotations/stats/notifications",
            get(quotations::notifications),
        )
        .route("/api/quotations/stats/mark-read", put(quotations::mark_read))
        .route(
            "/api/quotations/deal/{deal_id}",
            get(quotations::list_for_deal),
        )
        .route(
            "/api/quotations/{id}",
            get(quotations::get).put(quotations::update),
        )
        .route("/api/quotations/{id}/approve", post(quotations::approve))
        .route("/api/quotations/{id}/reject", post(quotations::reject))
        .route("/api/quotations/{id}/margin", put(quotations::set_margin))
        .route(
            "/api/cost-sheets/deal/{deal_id}",
            put(cost_sheets::save).get(cost_sheets::get_latest),
        )
        .route(
            "/api/cost-sheets/deal/{deal_id}/versions",
            get(cost_sheets::list_versions),
        )
        // The React dev server runs on a different origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
