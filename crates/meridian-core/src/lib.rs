//! # meridian-core: Pure Business Logic for Meridian CRM
//!
//! This crate is the **heart** of Meridian CRM. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Meridian CRM Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Frontend (React SPA)                        │   │
//! │  │    Pipeline UI ──► Quotation UI ──► Approval UI ──► Cost Sheet  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over REST                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    API Server (axum)                            │   │
//! │  │    request, approve, reject, set margin, save cost sheet        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ meridian-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ costsheet │  │   │
//! │  │   │   Deal    │  │   Money   │  │ GST math  │  │ aggregate │  │   │
//! │  │   │ Quotation │  │  GstCalc  │  │  margins  │  │ versions  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  meridian-db (Database Layer)                   │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Deal, Quotation, User, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Line item, surcharge, and margin calculations
//! - [`costsheet`] - Project cost-sheet aggregation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use meridian_core::money::Money;
//! use meridian_core::types::GstRate;
//! use meridian_core::pricing::line_item_totals;
//!
//! // Create money from paise (never from floats!)
//! let unit_price = Money::from_paise(5_000_000); // ₹50,000.00
//!
//! // Two laptops at 18% GST
//! let line = line_item_totals(2, unit_price, GstRate::Eighteen);
//! assert_eq!(line.total.paise(), 11_800_000); // ₹1,18,000.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod costsheet;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use meridian_core::Money` instead of
// `use meridian_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single quotation
///
/// ## Business Reason
/// Prevents runaway item lists and keeps quotation documents printable.
/// Can be made configurable per-tenant in future versions.
pub const MAX_QUOTATION_ITEMS: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
