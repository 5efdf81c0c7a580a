//! # Meridian API
//!
//! REST server for Meridian CRM.
//!
//! ## Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          REST Endpoints                                 │
//! │                                                                         │
//! │  POST /api/auth/login                      email+password → JWT        │
//! │                                                                         │
//! │  POST /api/deals                           create deal                  │
//! │  GET  /api/deals                           list (stage/assignee filter) │
//! │  GET  /api/deals/{id}                      fetch one                    │
//! │  PUT  /api/deals/{id}/stage                move pipeline stage          │
//! │                                                                         │
//! │  POST /api/quotations/request              create pending quotation     │
//! │  POST /api/quotations/{id}/approve         approve, recompute totals    │
//! │  POST /api/quotations/{id}/reject          reject                       │
//! │  PUT  /api/quotations/{id}                 edit while pending           │
//! │  PUT  /api/quotations/{id}/margin          set margin on approved       │
//! │  GET  /api/quotations                      admin list (status filter)   │
//! │  GET  /api/quotations/deal/{deal_id}       list for a deal              │
//! │  GET  /api/quotations/{id}                 fetch one + derived prices   │
//! │  GET  /api/quotations/stats/pending-count  admin dashboard              │
//! │  GET  /api/quotations/stats/notifications  unread approved list         │
//! │  PUT  /api/quotations/stats/mark-read      bulk mark-read (owner-scoped)│
//! │                                                                         │
//! │  PUT  /api/cost-sheets/deal/{deal_id}           save (flag: new version)│
//! │  GET  /api/cost-sheets/deal/{deal_id}           latest version          │
//! │  GET  /api/cost-sheets/deal/{deal_id}/versions  all versions            │
//! │                                                                         │
//! │  GET  /health                              liveness                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `MERIDIAN_HTTP_PORT` - HTTP listen port (default: 8080)
//! - `MERIDIAN_DB_PATH` - SQLite database path (default: ./meridian.db)
//! - `MERIDIAN_JWT_SECRET` - Secret for JWT signing
//! - `MERIDIAN_JWT_LIFETIME_SECS` - Token lifetime (default: 86400)

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod workflow;

// Re-exports
pub use config::ApiConfig;
pub use error::ApiError;

use auth::JwtManager;
use meridian_db::Database;
use workflow::QuotationWorkflow;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub workflow: QuotationWorkflow,
    pub jwt: JwtManager,
    pub config: ApiConfig,
}

impl AppState {
    /// Builds the application state from a connected database and config.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);
        let workflow = QuotationWorkflow::new(db.clone());
        AppState {
            db,
            workflow,
            jwt,
            config,
        }
    }
}
