//! Request and response shapes for the REST surface.
//!
//! All numeric money fields are integer paise; GST rates are whole slab
//! percents and deserialize through the closed [`GstRate`] set, so malformed
//! numeric input fails at the boundary with a 400 before any arithmetic runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use meridian_core::costsheet::{CustomCharge, ManpowerCost, Overheads, ProductCost};
use meridian_core::{DealStage, GstRate, MarginType, Quotation, QuotationItem, QuotationStatus, Role};

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

// =============================================================================
// Deals
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDealBody {
    pub customer_name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub oem: Option<String>,
    #[serde(default)]
    pub expected_revenue_paise: i64,
    pub expected_margin_paise: Option<i64>,
    #[serde(default)]
    pub stage: DealStage,
    /// Defaults to the caller when omitted.
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDealStageBody {
    pub stage: DealStage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DealListQuery {
    pub stage: Option<DealStage>,
    pub assigned_to: Option<String>,
}

// =============================================================================
// Quotations - Requests
// =============================================================================

/// One line item as submitted by a client (salesperson request or admin edit).
#[derive(Debug, Clone, Deserialize)]
pub struct QuotationItemBody {
    pub product_name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub quantity: i64,
    pub unit_price_paise: i64,
    pub gst_rate: GstRate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestQuotationBody {
    pub deal_id: String,
    pub items: Vec<QuotationItemBody>,
    pub remarks_for_admin: Option<String>,
    pub valid_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApproveQuotationBody {
    /// The full item list; the admin may have edited vendor prices, brand,
    /// model, description, or GST rates. Target prices are preserved
    /// server-side regardless of what is submitted.
    pub items: Vec<QuotationItemBody>,
    #[serde(default)]
    pub freight_charges_paise: i64,
    #[serde(default)]
    pub freight_gst_rate: GstRate,
    #[serde(default)]
    pub installation_charges_paise: i64,
    #[serde(default)]
    pub installation_gst_rate: GstRate,
    pub remarks_for_salesperson: Option<String>,
    pub valid_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RejectQuotationBody {
    pub remarks_for_salesperson: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuotationBody {
    pub items: Vec<QuotationItemBody>,
    pub remarks_for_admin: Option<String>,
    pub valid_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetMarginBody {
    pub margin_type: MarginType,
    /// Basis points for percentage margins, paise for amount margins.
    pub margin_value: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkReadBody {
    pub quotation_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotationListQuery {
    pub status: Option<QuotationStatus>,
}

// =============================================================================
// Quotations - Responses
// =============================================================================

/// A line item with derived client-facing prices alongside the stored
/// vendor figures. The client prices apply the recorded margin at read
/// time; nothing here is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct QuotationItemView {
    #[serde(flatten)]
    pub item: QuotationItem,
    pub client_unit_price_paise: i64,
    pub client_total_paise: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuotationTotalsView {
    pub items_total_paise: i64,
    pub freight_total_paise: i64,
    pub installation_total_paise: i64,
    pub grand_total_paise: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuotationDetail {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub items: Vec<QuotationItemView>,
    pub totals: QuotationTotalsView,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingCountResponse {
    pub pending: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationsResponse {
    pub unread_count: usize,
    pub quotations: Vec<Quotation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkReadResponse {
    pub marked: u64,
}

// =============================================================================
// Cost Sheets
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SaveCostSheetBody {
    #[serde(default)]
    pub revenue_paise: i64,
    #[serde(default)]
    pub products: Vec<ProductCost>,
    #[serde(default)]
    pub manpower: Vec<ManpowerCost>,
    #[serde(default)]
    pub overheads: Overheads,
    #[serde(default)]
    pub custom_charges: Vec<CustomCharge>,
    /// When true, the save branches a new version instead of mutating the
    /// current latest in place.
    #[serde(default)]
    pub create_new_version: bool,
}
