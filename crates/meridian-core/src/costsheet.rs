//! # Cost Sheet Calculator
//!
//! Aggregates product, manpower, overhead, and custom charges for a deal
//! into a project cost and net margin figure. Pure functions; persistence
//! and versioning live in meridian-db.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Manpower lines are costed over a fixed three-year support window.
pub const MANPOWER_MONTHS: i64 = 36;

// =============================================================================
// Line Types
// =============================================================================

/// One product line on a cost sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductCost {
    pub name: String,
    pub quantity: i64,
    pub oem_price_paise: i64,
}

impl ProductCost {
    /// quantity × OEM price.
    pub fn cost(&self) -> Money {
        Money::from_paise(self.oem_price_paise).multiply_quantity(self.quantity)
    }
}

/// One manpower profile on a cost sheet, costed over three years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ManpowerCost {
    /// e.g. "L2 Support Engineer"
    pub profile: String,
    pub monthly_cost_paise: i64,
    pub headcount: i64,
}

impl ManpowerCost {
    /// monthly cost × headcount × 36 months.
    pub fn three_year_cost(&self) -> Money {
        Money::from_paise(self.monthly_cost_paise)
            .multiply_quantity(self.headcount)
            .multiply_quantity(MANPOWER_MONTHS)
    }
}

/// A free-form extra charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomCharge {
    pub label: String,
    pub amount_paise: i64,
}

/// Fixed overhead fields on a cost sheet.
///
/// All values in paise except `admin_overhead_bps`, which is charged as a
/// share of (product cost + manpower cost).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Overheads {
    pub freight_paise: i64,
    pub installation_paise: i64,
    pub gst_paise: i64,
    pub admin_overhead_bps: u32,
    pub finance_paise: i64,
    pub insurance_paise: i64,
    pub gem_paise: i64,
    pub misc_paise: i64,
}

// =============================================================================
// Summary
// =============================================================================

/// The computed bottom line of a cost sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostSummary {
    pub product_cost_paise: i64,
    pub manpower_cost_paise: i64,
    /// (product + manpower) × admin_overhead_bps / 10000.
    pub admin_overhead_paise: i64,
    pub total_project_cost_paise: i64,
    /// revenue − total project cost. Negative when the deal loses money.
    pub net_margin_paise: i64,
    /// net margin as basis points of revenue; 0 when revenue is 0.
    pub net_margin_bps: i64,
}

/// Aggregates every cost bucket into the project total and net margin.
///
/// ## Example
/// ```rust
/// use meridian_core::costsheet::{aggregate, Overheads, ProductCost};
/// use meridian_core::money::Money;
///
/// let products = vec![ProductCost { name: "Server".into(), quantity: 2, oem_price_paise: 40_000_00 }];
/// let summary = aggregate(Money::from_paise(100_000_00), &products, &[], &Overheads::default(), &[]);
/// assert_eq!(summary.total_project_cost_paise, 80_000_00);
/// assert_eq!(summary.net_margin_paise, 20_000_00);
/// assert_eq!(summary.net_margin_bps, 2_000); // 20%
/// ```
pub fn aggregate(
    revenue: Money,
    products: &[ProductCost],
    manpower: &[ManpowerCost],
    overheads: &Overheads,
    custom_charges: &[CustomCharge],
) -> CostSummary {
    let product_cost = products.iter().fold(Money::zero(), |acc, p| acc + p.cost());
    let manpower_cost = manpower
        .iter()
        .fold(Money::zero(), |acc, m| acc + m.three_year_cost());

    let admin_overhead = (product_cost + manpower_cost).percentage(overheads.admin_overhead_bps);

    let custom_total = custom_charges
        .iter()
        .fold(Money::zero(), |acc, c| acc + Money::from_paise(c.amount_paise));

    let total_project_cost = product_cost
        + manpower_cost
        + admin_overhead
        + Money::from_paise(overheads.finance_paise)
        + Money::from_paise(overheads.insurance_paise)
        + Money::from_paise(overheads.gem_paise)
        + Money::from_paise(overheads.misc_paise)
        + Money::from_paise(overheads.freight_paise)
        + Money::from_paise(overheads.installation_paise)
        + Money::from_paise(overheads.gst_paise)
        + custom_total;

    let net_margin = revenue - total_project_cost;

    // Zero revenue means the margin percentage is meaningless; report 0
    // instead of dividing by zero.
    let net_margin_bps = if revenue.is_zero() {
        0
    } else {
        ((net_margin.paise() as i128 * 10_000) / revenue.paise() as i128) as i64
    };

    CostSummary {
        product_cost_paise: product_cost.paise(),
        manpower_cost_paise: manpower_cost.paise(),
        admin_overhead_paise: admin_overhead.paise(),
        total_project_cost_paise: total_project_cost.paise(),
        net_margin_paise: net_margin.paise(),
        net_margin_bps,
    }
}

// =============================================================================
// Cost Sheet Entity
// =============================================================================

/// A persisted cost sheet version for a deal.
///
/// `version` starts at 1; saving with the "create new version" flag clones
/// the latest sheet into `version + 1` and clears the predecessor's
/// `is_latest`. Old versions are never deleted.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct CostSheet {
    pub id: String,
    pub deal_id: String,
    pub version: i64,
    pub is_latest: bool,

    pub revenue_paise: i64,
    pub products: Vec<ProductCost>,
    pub manpower: Vec<ManpowerCost>,
    pub overheads: Overheads,
    pub custom_charges: Vec<CustomCharge>,

    pub summary: CostSummary,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_products() -> Vec<ProductCost> {
        vec![
            ProductCost {
                name: "Core switch".to_string(),
                quantity: 2,
                oem_price_paise: 1_500_000, // ₹15,000 each
            },
            ProductCost {
                name: "Access point".to_string(),
                quantity: 10,
                oem_price_paise: 400_000, // ₹4,000 each
            },
        ]
    }

    #[test]
    fn test_product_cost() {
        let products = sample_products();
        assert_eq!(products[0].cost().paise(), 3_000_000);
        assert_eq!(products[1].cost().paise(), 4_000_000);
    }

    #[test]
    fn test_manpower_three_year_cost() {
        let m = ManpowerCost {
            profile: "Resident engineer".to_string(),
            monthly_cost_paise: 5_000_000, // ₹50,000/month
            headcount: 2,
        };
        // 50,000 × 2 × 36 = ₹36,00,000
        assert_eq!(m.three_year_cost().paise(), 360_000_000);
    }

    #[test]
    fn test_aggregate_with_admin_overhead() {
        // product 70,000 + manpower 0; admin overhead 10% = 7,000
        let products = sample_products();
        let overheads = Overheads {
            admin_overhead_bps: 1_000,
            freight_paise: 100_000,
            ..Overheads::default()
        };
        let summary = aggregate(
            Money::from_paise(10_000_000),
            &products,
            &[],
            &overheads,
            &[CustomCharge {
                label: "Site survey".to_string(),
                amount_paise: 50_000,
            }],
        );

        assert_eq!(summary.product_cost_paise, 7_000_000);
        assert_eq!(summary.admin_overhead_paise, 700_000);
        // 70,000 + 7,000 + 1,000 freight + 500 custom = ₹78,500
        assert_eq!(summary.total_project_cost_paise, 7_850_000);
        assert_eq!(summary.net_margin_paise, 2_150_000);
        assert_eq!(summary.net_margin_bps, 2_150); // 21.5%
    }

    #[test]
    fn test_aggregate_zero_revenue_reports_zero_margin_percent() {
        let summary = aggregate(Money::zero(), &sample_products(), &[], &Overheads::default(), &[]);
        assert_eq!(summary.net_margin_bps, 0);
        assert!(summary.net_margin_paise < 0);
    }

    #[test]
    fn test_aggregate_empty_sheet() {
        let summary = aggregate(Money::zero(), &[], &[], &Overheads::default(), &[]);
        assert_eq!(summary.total_project_cost_paise, 0);
        assert_eq!(summary.net_margin_paise, 0);
        assert_eq!(summary.net_margin_bps, 0);
    }
}
