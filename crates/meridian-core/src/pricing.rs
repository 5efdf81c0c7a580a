//! # Pricing Calculator
//!
//! Pure, stateless pricing functions for quotations. No side effects; safe
//! to call repeatedly with identical inputs.
//!
//! ## Where Pricing Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Quotation Pricing Flow                              │
//! │                                                                         │
//! │  APPROVAL TIME (persisted)                                             │
//! │    admin unit price ──► line_item_totals ──► gst_amount, total         │
//! │    freight/installation ──► surcharge_totals                           │
//! │    Σ everything ──► quotation.amount (pre-margin)                      │
//! │                                                                         │
//! │  RENDER TIME (derived, never persisted)                                │
//! │    vendor price ──► margin_adjusted_unit_price ──► client price        │
//! │    client price ──► line_item_totals ──► client-facing totals          │
//! │                                                                         │
//! │  The stored unit price stays the vendor price, so the margin can       │
//! │  change without re-editing a single line item.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{GstRate, MarginType, QuotationItem};

// =============================================================================
// Result Types
// =============================================================================

/// Totals for one line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTotals {
    /// quantity × unit price, before GST.
    pub base: Money,
    pub gst_amount: Money,
    /// base + GST.
    pub total: Money,
}

/// Totals for a freight or installation surcharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeTotals {
    pub gst_amount: Money,
    /// charge + GST.
    pub total: Money,
}

/// Grand totals for a whole quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationTotals {
    /// Sum of all line item totals (post-margin when a margin is given).
    pub items_total: Money,
    pub freight: SurchargeTotals,
    pub installation: SurchargeTotals,
    /// items_total + freight.total + installation.total.
    pub grand_total: Money,
}

// =============================================================================
// Margin
// =============================================================================

/// The salesperson's markup, resolved from its stored (type, value) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Margin {
    /// No margin recorded yet (pre-approval, or explicitly zero).
    None,
    /// Markup in basis points of the vendor price (2000 bps = 20%).
    Percentage { bps: u32 },
    /// Flat paise added to each unit's vendor price.
    Amount { value: Money },
}

impl Margin {
    /// Resolves the stored `(margin_type, margin_value)` pair into a margin.
    ///
    /// A missing type or a non-positive value is treated as no margin, so a
    /// zero or absent markup can never corrupt a price.
    pub fn from_stored(margin_type: Option<MarginType>, value: i64) -> Margin {
        if value <= 0 {
            return Margin::None;
        }
        match margin_type {
            None => Margin::None,
            Some(MarginType::Percentage) => Margin::Percentage { bps: value as u32 },
            Some(MarginType::Amount) => Margin::Amount {
                value: Money::from_paise(value),
            },
        }
    }
}

// =============================================================================
// Pricing Functions
// =============================================================================

/// Computes base, GST, and total for one line item.
///
/// ## Example
/// ```rust
/// use meridian_core::money::Money;
/// use meridian_core::pricing::line_item_totals;
/// use meridian_core::types::GstRate;
///
/// let line = line_item_totals(2, Money::from_paise(5_000_000), GstRate::Eighteen);
/// assert_eq!(line.base.paise(), 10_000_000);
/// assert_eq!(line.gst_amount.paise(), 1_800_000);
/// assert_eq!(line.total.paise(), 11_800_000);
/// ```
pub fn line_item_totals(quantity: i64, unit_price: Money, rate: GstRate) -> LineTotals {
    let base = unit_price.multiply_quantity(quantity);
    let gst_amount = base.calculate_gst(rate);
    LineTotals {
        base,
        gst_amount,
        total: base + gst_amount,
    }
}

/// Computes GST and total for a surcharge (freight or installation).
///
/// Same formula as a line item with quantity 1; kept separate because
/// surcharges carry their own slab rate independent of any item's.
pub fn surcharge_totals(charge: Money, rate: GstRate) -> SurchargeTotals {
    let gst_amount = charge.calculate_gst(rate);
    SurchargeTotals {
        gst_amount,
        total: charge + gst_amount,
    }
}

/// Derives the client-facing unit price from the vendor price and margin.
///
/// Invoked at render time (quotation detail, PDF); the stored unit price
/// remains the vendor price.
///
/// ## Example
/// ```rust
/// use meridian_core::money::Money;
/// use meridian_core::pricing::{margin_adjusted_unit_price, Margin};
///
/// let vendor = Money::from_paise(10_000); // ₹100.00
///
/// let pct = Margin::Percentage { bps: 2_000 }; // 20%
/// assert_eq!(margin_adjusted_unit_price(vendor, &pct).paise(), 12_000);
///
/// let flat = Margin::Amount { value: Money::from_paise(2_000) };
/// assert_eq!(margin_adjusted_unit_price(vendor, &flat).paise(), 12_000);
///
/// assert_eq!(margin_adjusted_unit_price(vendor, &Margin::None), vendor);
/// ```
pub fn margin_adjusted_unit_price(vendor_price: Money, margin: &Margin) -> Money {
    match margin {
        Margin::None => vendor_price,
        Margin::Percentage { bps } => vendor_price + vendor_price.percentage(*bps),
        Margin::Amount { value } => vendor_price + *value,
    }
}

/// Computes the full set of client-facing totals for a quotation.
///
/// Each item's unit price is margin-adjusted before GST, so GST is charged
/// on the price the client actually pays. With `Margin::None` this yields
/// exactly the approval-time amount.
pub fn quotation_totals(
    items: &[QuotationItem],
    margin: &Margin,
    freight: Money,
    freight_rate: GstRate,
    installation: Money,
    installation_rate: GstRate,
) -> QuotationTotals {
    let items_total = items.iter().fold(Money::zero(), |acc, item| {
        let client_price = margin_adjusted_unit_price(item.unit_price(), margin);
        acc + line_item_totals(item.quantity, client_price, item.gst_rate).total
    });

    let freight = surcharge_totals(freight, freight_rate);
    let installation = surcharge_totals(installation, installation_rate);

    QuotationTotals {
        items_total,
        freight,
        installation,
        grand_total: items_total + freight.total + installation.total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
