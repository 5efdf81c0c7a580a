//! # meridian-db: Database Layer for Meridian CRM
//!
//! This crate provides database access for Meridian CRM.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Meridian CRM Data Flow                            │
//! │                                                                         │
//! │  API handler (approve_quotation)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   meridian-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐ │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │ (quotation.rs) │    │  (embedded)  │ │   │
//! │  │   │               │    │                │    │              │ │   │
//! │  │   │ SqlitePool    │◄───│ DealRepo       │    │ 001_init.sql │ │   │
//! │  │   │ WAL mode      │    │ QuotationRepo  │    │              │ │   │
//! │  │   │ FK enforced   │    │ CostSheetRepo  │    │              │ │   │
//! │  │   └───────────────┘    │ UserRepo       │    └──────────────┘ │   │
//! │  │                        └────────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (deal, quotation, etc.)
//!
//! ## Transactions
//!
//! The quotation workflow mirrors its status onto the parent deal. Every
//! repository method that performs such a multi-table write (request,
//! approve, reject, cost-sheet version branch) runs both statements inside
//! a single sqlx transaction, so the mirror can never drift from the
//! quotation row.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cost_sheet::CostSheetRepository;
pub use repository::deal::DealRepository;
pub use repository::quotation::QuotationRepository;
pub use repository::user::UserRepository;
