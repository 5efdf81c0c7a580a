//! # Domain Types
//!
//! Core domain types used throughout Meridian CRM.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Deal       │   │    Quotation    │   │  QuotationItem  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  deal_number    │   │  deal_id (FK)   │   │  quotation_id   │       │
//! │  │  stage          │   │  status         │   │  unit_price     │       │
//! │  │  quotation_stat │   │  amount_paise   │   │  target_price   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     GstRate     │   │ QuotationStatus │   │   MarginType    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  closed slab    │   │  Pending        │   │  Percentage     │       │
//! │  │  set: 0/5/12/   │   │  Approved       │   │  Amount         │       │
//! │  │  18/28 %        │   │  Rejected       │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Deals have two identifiers:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `deal_number`: `OPP-YYMMDD-NNNN` - human-readable, printed on documents

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;

// =============================================================================
// GST Rate
// =============================================================================

/// GST slab rate.
///
/// ## Why a closed enum?
/// GST is charged at a fixed set of slab rates. Accepting a free-form
/// percentage would let a typo (1.8 instead of 18) silently flow into
/// every downstream total; parsing into the slab set rejects bad input
/// before any arithmetic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[serde(try_from = "u8", into = "u8")]
#[repr(i32)]
pub enum GstRate {
    Zero = 0,
    Five = 5,
    Twelve = 12,
    Eighteen = 18,
    TwentyEight = 28,
}

impl GstRate {
    /// All slab rates, in ascending order.
    pub const ALL: [GstRate; 5] = [
        GstRate::Zero,
        GstRate::Five,
        GstRate::Twelve,
        GstRate::Eighteen,
        GstRate::TwentyEight,
    ];

    /// Parses a whole percentage into a slab rate.
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::types::GstRate;
    ///
    /// assert_eq!(GstRate::from_percent(18), Ok(GstRate::Eighteen));
    /// assert!(GstRate::from_percent(15).is_err());
    /// ```
    pub fn from_percent(pct: u8) -> Result<Self, ValidationError> {
        match pct {
            0 => Ok(GstRate::Zero),
            5 => Ok(GstRate::Five),
            12 => Ok(GstRate::Twelve),
            18 => Ok(GstRate::Eighteen),
            28 => Ok(GstRate::TwentyEight),
            _ => Err(ValidationError::NotAllowed {
                field: "gst_rate".to_string(),
                allowed: GstRate::ALL.iter().map(|r| r.percent().to_string()).collect(),
            }),
        }
    }

    /// Returns the rate as a whole percentage.
    #[inline]
    pub const fn percent(&self) -> u8 {
        *self as i32 as u8
    }

    /// Returns the rate in basis points (1800 bps = 18%).
    #[inline]
    pub const fn bps(&self) -> u32 {
        (*self as i32 as u32) * 100
    }

    /// Checks if the rate is the zero slab.
    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self, GstRate::Zero)
    }
}

impl Default for GstRate {
    fn default() -> Self {
        GstRate::Zero
    }
}

impl TryFrom<u8> for GstRate {
    type Error = ValidationError;

    fn try_from(pct: u8) -> Result<Self, Self::Error> {
        GstRate::from_percent(pct)
    }
}

impl From<GstRate> for u8 {
    fn from(rate: GstRate) -> u8 {
        rate.percent()
    }
}

// =============================================================================
// User & Role
// =============================================================================

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Reviews and approves quotations, sees all deals.
    Admin,
    /// Owns deals, requests quotations, sets margins.
    Salesperson,
}

impl Role {
    /// Checks whether this role carries admin privileges.
    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A system user (admin or salesperson).
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Login identifier, unique.
    pub email: String,
    /// Argon2 hash; never serialized to clients.
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Deal Stage
// =============================================================================

/// Pipeline stage of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    /// Freshly captured lead.
    New,
    /// Contact made, need confirmed.
    Qualified,
    /// Proposal/quotation in play.
    Proposition,
    /// Closed won.
    Won,
    /// Closed lost.
    Lost,
}

impl Default for DealStage {
    fn default() -> Self {
        DealStage::New
    }
}

// =============================================================================
// Quotation Status
// =============================================================================

/// The status of a quotation request.
///
/// ## Transition Table
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │   from \ to    Pending      Approved         Rejected               │
/// │   ─────────    ───────      ────────         ────────               │
/// │   Pending         -            ✓                ✓                   │
/// │   Approved        ✗            ✗ (already)      ✓ (revoke)          │
/// │   Rejected        ✗            ✓ (re-approve)   ✗ (already)         │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
/// Both approve and reject go through [`QuotationStatus::check_transition`];
/// there are no per-endpoint ad hoc guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    /// Awaiting admin review.
    Pending,
    /// Admin approved; vendor prices and totals are authoritative.
    Approved,
    /// Admin rejected.
    Rejected,
}

impl QuotationStatus {
    /// Returns true if moving from `self` to `to` is a legal transition.
    pub fn can_transition(self, to: QuotationStatus) -> bool {
        use QuotationStatus::*;
        matches!(
            (self, to),
            (Pending, Approved) | (Pending, Rejected) | (Rejected, Approved) | (Approved, Rejected)
        )
    }

    /// Validates a transition, returning a domain error when illegal.
    pub fn check_transition(self, to: QuotationStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else if self == to {
            Err(CoreError::AlreadyInStatus { status: self })
        } else {
            Err(CoreError::TransitionNotAllowed { from: self, to })
        }
    }
}

impl Default for QuotationStatus {
    fn default() -> Self {
        QuotationStatus::Pending
    }
}

impl std::fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            QuotationStatus::Pending => "pending",
            QuotationStatus::Approved => "approved",
            QuotationStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Margin Type
// =============================================================================

/// How the salesperson's margin is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MarginType {
    /// Markup as basis points of the vendor price.
    Percentage,
    /// Flat paise added to the vendor price.
    Amount,
}

// =============================================================================
// Deal
// =============================================================================

/// A sales opportunity moving through the pipeline.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Deal {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-readable business id: `OPP-YYMMDD-NNNN`.
    pub deal_number: String,

    pub customer_name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,

    /// OEM whose equipment the deal is built around.
    pub oem: Option<String>,

    /// Expected revenue in paise.
    pub expected_revenue_paise: i64,

    /// Expected margin in paise, if projected.
    pub expected_margin_paise: Option<i64>,

    pub stage: DealStage,

    /// Salesperson who owns the deal.
    pub assigned_to: String,

    /// Mirror of the most recently acted-upon quotation's status.
    /// Denormalized cache, written only by the quotation workflow in the
    /// same transaction as the quotation itself. `None` until the first
    /// quotation is requested.
    pub quotation_status: Option<QuotationStatus>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Deal {
    /// Returns the expected revenue as Money.
    #[inline]
    pub fn expected_revenue(&self) -> Money {
        Money::from_paise(self.expected_revenue_paise)
    }
}

// =============================================================================
// Quotation
// =============================================================================

/// A quotation request tied to a deal.
///
/// Line items live in [`QuotationItem`] rows, ordered by position.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Quotation {
    pub id: String,
    pub deal_id: String,

    /// Salesperson who raised the request.
    pub requested_by: String,
    /// Admin who approved it, once approved.
    pub approved_by: Option<String>,

    pub status: QuotationStatus,

    pub freight_charges_paise: i64,
    #[ts(as = "u8")]
    pub freight_gst_rate: GstRate,
    pub freight_gst_amount_paise: i64,

    pub installation_charges_paise: i64,
    #[ts(as = "u8")]
    pub installation_gst_rate: GstRate,
    pub installation_gst_amount_paise: i64,

    /// Set by the salesperson after approval; applied at render time only.
    pub margin_type: Option<MarginType>,
    /// Basis points for percentage margins, paise for amount margins.
    pub margin_value: i64,

    /// Grand total at approval time, pre-margin. Recomputed only by approve.
    pub amount_paise: i64,

    /// Cleared on approve/reject, set by the requester's mark-read.
    pub is_read: bool,

    pub remarks_for_admin: Option<String>,
    pub remarks_for_salesperson: Option<String>,

    #[ts(as = "Option<String>")]
    pub valid_until: Option<NaiveDate>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Quotation {
    /// Returns the freight charges as Money.
    #[inline]
    pub fn freight_charges(&self) -> Money {
        Money::from_paise(self.freight_charges_paise)
    }

    /// Returns the installation charges as Money.
    #[inline]
    pub fn installation_charges(&self) -> Money {
        Money::from_paise(self.installation_charges_paise)
    }

    /// Returns the approval-time grand total as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }
}

// =============================================================================
// Quotation Item
// =============================================================================

/// A line item on a quotation.
///
/// `unit_price_paise` is the vendor cost price and is admin-controlled after
/// approval. `target_price_paise` is what the salesperson originally asked
/// for; it is frozen at request time and survives every later edit.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct QuotationItem {
    pub id: String,
    pub quotation_id: String,
    /// Zero-based order within the quotation.
    pub position: i64,

    pub product_name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,

    pub quantity: i64,
    pub unit_price_paise: i64,
    pub target_price_paise: i64,

    #[ts(as = "u8")]
    pub gst_rate: GstRate,
    /// Computed at approval; zero while pending.
    pub gst_amount_paise: i64,
    /// Computed at approval; zero while pending.
    pub total_paise: i64,
}

impl QuotationItem {
    /// Returns the vendor unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paise(self.unit_price_paise)
    }

    /// Returns the salesperson's original target price as Money.
    #[inline]
    pub fn target_price(&self) -> Money {
        Money::from_paise(self.target_price_paise)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gst_rate_from_percent() {
        assert_eq!(GstRate::from_percent(0), Ok(GstRate::Zero));
        assert_eq!(GstRate::from_percent(28), Ok(GstRate::TwentyEight));
        assert!(GstRate::from_percent(15).is_err());
        assert!(GstRate::from_percent(100).is_err());
    }

    #[test]
    fn test_gst_rate_bps() {
        assert_eq!(GstRate::Eighteen.bps(), 1800);
        assert_eq!(GstRate::Zero.bps(), 0);
    }

    #[test]
    fn test_gst_rate_serde_as_number() {
        let rate: GstRate = serde_json::from_str("18").unwrap();
        assert_eq!(rate, GstRate::Eighteen);
        assert_eq!(serde_json::to_string(&GstRate::Five).unwrap(), "5");
        assert!(serde_json::from_str::<GstRate>("15").is_err());
    }

    #[test]
    fn test_transition_table() {
        use QuotationStatus::*;
        assert!(Pending.can_transition(Approved));
        assert!(Pending.can_transition(Rejected));
        assert!(Rejected.can_transition(Approved));
        assert!(Approved.can_transition(Rejected));

        // Self-transitions are refused
        assert!(!Approved.can_transition(Approved));
        assert!(!Rejected.can_transition(Rejected));
        assert!(!Pending.can_transition(Pending));
        // Nothing goes back to pending
        assert!(!Approved.can_transition(Pending));
        assert!(!Rejected.can_transition(Pending));
    }

    #[test]
    fn test_check_transition_error() {
        let err = QuotationStatus::Approved
            .check_transition(QuotationStatus::Approved)
            .unwrap_err();
        assert_eq!(err.to_string(), "Quotation is already approved");

        let err = QuotationStatus::Approved
            .check_transition(QuotationStatus::Pending)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot move quotation from approved to pending"
        );
    }

    #[test]
    fn test_deal_stage_default() {
        assert_eq!(DealStage::default(), DealStage::New);
    }
}
