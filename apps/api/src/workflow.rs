//! # Quotation Workflow
//!
//! The state machine governing quotation requests, approval, rejection,
//! pending edits, margins, and read-tracking.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Quotation Workflow                                 │
//! │                                                                         │
//! │  salesperson                admin                    salesperson        │
//! │  ───────────                ─────                    ───────────        │
//! │                                                                         │
//! │  request ──► PENDING ──┬──► approve ──► APPROVED ──► set margin         │
//! │     │          ▲       │       │            │              │            │
//! │     │          │       │       │   (totals recomputed,     │            │
//! │  edit while    │       │       │    is_read cleared)       │            │
//! │  pending ──────┘       │       │            │              ▼            │
//! │                        │       │            └──► notifications /        │
//! │                        └──► reject ──► REJECTED       mark-read         │
//! │                                                                         │
//! │  Every transition mirrors the deal's quotation_status in the same      │
//! │  database transaction (see meridian-db).                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status legality is decided solely by the transition table on
//! [`QuotationStatus`]; approve and reject share the same check.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use meridian_core::pricing::{
    line_item_totals, margin_adjusted_unit_price, quotation_totals, Margin,
};
use meridian_core::validation::{
    validate_item_count, validate_margin_value, validate_price_paise, validate_product_name,
    validate_quantity,
};
use meridian_core::{CoreError, Money, Quotation, QuotationItem, QuotationStatus};
use meridian_db::Database;

use crate::auth::AuthUser;
use crate::dto::{
    ApproveQuotationBody, MarkReadBody, MarkReadResponse, NotificationsResponse,
    QuotationDetail, QuotationItemBody, QuotationItemView, QuotationTotalsView,
    RejectQuotationBody, RequestQuotationBody, SetMarginBody, UpdateQuotationBody,
};
use crate::error::ApiError;

/// Orchestrates quotation operations over the repositories and the pricing
/// calculator. Stateless apart from the database handle.
#[derive(Clone)]
pub struct QuotationWorkflow {
    db: Database,
}

impl QuotationWorkflow {
    /// Creates a new workflow over the given database.
    pub fn new(db: Database) -> Self {
        QuotationWorkflow { db }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Salesperson requests a quotation for a deal.
    ///
    /// The submitted price of each item becomes both the initial vendor
    /// price and the permanent target price; computed fields stay zero until
    /// approval. The parent deal is flagged pending in the same transaction.
    pub async fn request(
        &self,
        actor: &AuthUser,
        body: RequestQuotationBody,
    ) -> Result<QuotationDetail, ApiError> {
        if body.deal_id.trim().is_empty() {
            return Err(ApiError::validation("deal_id is required"));
        }

        self.db
            .deals()
            .get_by_id(&body.deal_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Deal", &body.deal_id))?;

        let quotation_id = Uuid::new_v4().to_string();
        let items = normalize_items(&quotation_id, &body.items)?;

        let now = Utc::now();
        let quotation = Quotation {
            id: quotation_id.clone(),
            deal_id: body.deal_id,
            requested_by: actor.id.clone(),
            approved_by: None,
            status: QuotationStatus::Pending,
            freight_charges_paise: 0,
            freight_gst_rate: Default::default(),
            freight_gst_amount_paise: 0,
            installation_charges_paise: 0,
            installation_gst_rate: Default::default(),
            installation_gst_amount_paise: 0,
            margin_type: None,
            margin_value: 0,
            amount_paise: 0,
            is_read: false,
            remarks_for_admin: body.remarks_for_admin,
            remarks_for_salesperson: None,
            valid_until: body.valid_until,
            created_at: now,
            updated_at: now,
        };

        self.db.quotations().insert_request(&quotation, &items).await?;

        info!(
            quotation_id = %quotation.id,
            deal_id = %quotation.deal_id,
            requested_by = %actor.id,
            items = items.len(),
            "Quotation requested"
        );

        Ok(build_detail(quotation, items))
    }

    /// Admin approves a quotation, recomputing every total.
    ///
    /// Target prices recorded at request time are preserved by position,
    /// regardless of what the admin submits; rows the admin appended beyond
    /// the original list take their own submitted price as target.
    pub async fn approve(
        &self,
        actor: &AuthUser,
        id: &str,
        body: ApproveQuotationBody,
    ) -> Result<QuotationDetail, ApiError> {
        actor.require_admin()?;

        let mut quotation = self.load(id).await?;
        quotation
            .status
            .check_transition(QuotationStatus::Approved)?;

        validate_price_paise("freight_charges", body.freight_charges_paise)?;
        validate_price_paise("installation_charges", body.installation_charges_paise)?;

        let existing_items = self.db.quotations().get_items(id).await?;
        let mut items = normalize_items(id, &body.items)?;

        // Target prices survive the approval verbatim; admin edits cannot
        // overwrite what the salesperson originally asked for.
        for (position, item) in items.iter_mut().enumerate() {
            if let Some(original) = existing_items.get(position) {
                item.target_price_paise = original.target_price_paise;
            }
        }

        // Recompute every line from the admin-supplied vendor prices.
        for item in items.iter_mut() {
            let line = line_item_totals(item.quantity, item.unit_price(), item.gst_rate);
            item.gst_amount_paise = line.gst_amount.paise();
            item.total_paise = line.total.paise();
        }

        // Approval-time amount is pre-margin; the margin is recorded by the
        // salesperson afterwards and applied only at render time.
        let totals = quotation_totals(
            &items,
            &Margin::None,
            Money::from_paise(body.freight_charges_paise),
            body.freight_gst_rate,
            Money::from_paise(body.installation_charges_paise),
            body.installation_gst_rate,
        );

        quotation.status = QuotationStatus::Approved;
        quotation.approved_by = Some(actor.id.clone());
        quotation.freight_charges_paise = body.freight_charges_paise;
        quotation.freight_gst_rate = body.freight_gst_rate;
        quotation.freight_gst_amount_paise = totals.freight.gst_amount.paise();
        quotation.installation_charges_paise = body.installation_charges_paise;
        quotation.installation_gst_rate = body.installation_gst_rate;
        quotation.installation_gst_amount_paise = totals.installation.gst_amount.paise();
        quotation.amount_paise = totals.grand_total.paise();
        quotation.is_read = false;
        quotation.remarks_for_salesperson = body.remarks_for_salesperson;
        quotation.valid_until = body.valid_until;
        quotation.updated_at = Utc::now();

        self.db.quotations().store_approval(&quotation, &items).await?;

        info!(
            quotation_id = %id,
            approved_by = %actor.id,
            amount = quotation.amount_paise,
            "Quotation approved"
        );

        Ok(build_detail(quotation, items))
    }

    /// Admin rejects a quotation. No recomputation.
    pub async fn reject(
        &self,
        actor: &AuthUser,
        id: &str,
        body: RejectQuotationBody,
    ) -> Result<QuotationDetail, ApiError> {
        actor.require_admin()?;

        let quotation = self.load(id).await?;
        quotation
            .status
            .check_transition(QuotationStatus::Rejected)?;

        self.db
            .quotations()
            .store_rejection(id, &quotation.deal_id, body.remarks_for_salesperson.as_deref())
            .await?;

        info!(quotation_id = %id, rejected_by = %actor.id, "Quotation rejected");

        self.get_detail(id).await
    }

    /// Requester or admin edits a quotation while it is still pending.
    pub async fn update_pending(
        &self,
        actor: &AuthUser,
        id: &str,
        body: UpdateQuotationBody,
    ) -> Result<QuotationDetail, ApiError> {
        let quotation = self.load(id).await?;

        if quotation.status != QuotationStatus::Pending {
            return Err(ApiError::forbidden(format!(
                "Only pending quotations can be edited (status is {})",
                quotation.status
            )));
        }

        if quotation.requested_by != actor.id && !actor.role.is_admin() {
            return Err(ApiError::forbidden(
                "Only the requester or an admin can edit this quotation",
            ));
        }

        let items = normalize_items(id, &body.items)?;

        self.db
            .quotations()
            .update_pending(id, &items, body.remarks_for_admin.as_deref(), body.valid_until)
            .await?;

        debug!(quotation_id = %id, editor = %actor.id, "Pending quotation updated");

        self.get_detail(id).await
    }

    /// Salesperson records a margin on an approved quotation.
    ///
    /// Items and vendor prices are untouched; the margin is applied to the
    /// derived client prices at read time.
    pub async fn set_margin(
        &self,
        actor: &AuthUser,
        id: &str,
        body: SetMarginBody,
    ) -> Result<QuotationDetail, ApiError> {
        let quotation = self.load(id).await?;

        if quotation.requested_by != actor.id && !actor.role.is_admin() {
            return Err(ApiError::forbidden(
                "Only the requester or an admin can set the margin",
            ));
        }

        if quotation.status != QuotationStatus::Approved {
            return Err(CoreError::MarginRequiresApproval {
                status: quotation.status,
            }
            .into());
        }

        validate_margin_value(body.margin_value)?;

        self.db
            .quotations()
            .set_margin(id, body.margin_type, body.margin_value)
            .await?;

        info!(
            quotation_id = %id,
            margin_type = ?body.margin_type,
            margin_value = body.margin_value,
            "Margin recorded"
        );

        self.get_detail(id).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetches one quotation with items, derived client prices, and totals.
    pub async fn get_detail(&self, id: &str) -> Result<QuotationDetail, ApiError> {
        let quotation = self.load(id).await?;
        let items = self.db.quotations().get_items(id).await?;
        Ok(build_detail(quotation, items))
    }

    /// Admin list of quotations, optionally filtered by status.
    pub async fn list(
        &self,
        actor: &AuthUser,
        status: Option<QuotationStatus>,
    ) -> Result<Vec<Quotation>, ApiError> {
        actor.require_admin()?;
        Ok(self.db.quotations().list(status).await?)
    }

    /// All quotations for one deal.
    pub async fn list_for_deal(&self, deal_id: &str) -> Result<Vec<Quotation>, ApiError> {
        Ok(self.db.quotations().list_for_deal(deal_id).await?)
    }

    /// Admin dashboard: count of quotations awaiting review.
    pub async fn pending_count(&self, actor: &AuthUser) -> Result<i64, ApiError> {
        actor.require_admin()?;
        Ok(self.db.quotations().pending_count().await?)
    }

    /// The caller's approved-but-unread quotations.
    pub async fn notifications(&self, actor: &AuthUser) -> Result<NotificationsResponse, ApiError> {
        let quotations = self.db.quotations().unread_approved_for(&actor.id).await?;
        Ok(NotificationsResponse {
            unread_count: quotations.len(),
            quotations,
        })
    }

    /// Bulk mark-read, scoped to the caller's own quotations.
    pub async fn mark_read(
        &self,
        actor: &AuthUser,
        body: MarkReadBody,
    ) -> Result<MarkReadResponse, ApiError> {
        let marked = self
            .db
            .quotations()
            .mark_read(&body.quotation_ids, &actor.id)
            .await?;
        Ok(MarkReadResponse { marked })
    }

    async fn load(&self, id: &str) -> Result<Quotation, ApiError> {
        self.db
            .quotations()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Quotation", id))
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Validates and normalizes submitted items into fresh rows: the submitted
/// price becomes both the vendor price and the target price, and computed
/// fields start at zero (meaningful only after approval).
fn normalize_items(
    quotation_id: &str,
    bodies: &[QuotationItemBody],
) -> Result<Vec<QuotationItem>, ApiError> {
    validate_item_count(bodies.len())?;

    let mut items = Vec::with_capacity(bodies.len());
    for (position, body) in bodies.iter().enumerate() {
        validate_product_name(&body.product_name)?;
        validate_quantity(body.quantity)?;
        validate_price_paise("unit_price", body.unit_price_paise)?;

        items.push(QuotationItem {
            id: Uuid::new_v4().to_string(),
            quotation_id: quotation_id.to_string(),
            position: position as i64,
            product_name: body.product_name.trim().to_string(),
            description: body.description.clone(),
            brand: body.brand.clone(),
            model: body.model.clone(),
            quantity: body.quantity,
            unit_price_paise: body.unit_price_paise,
            target_price_paise: body.unit_price_paise,
            gst_rate: body.gst_rate,
            gst_amount_paise: 0,
            total_paise: 0,
        });
    }

    Ok(items)
}

/// Assembles the detail view: stored rows plus margin-derived client prices.
fn build_detail(quotation: Quotation, items: Vec<QuotationItem>) -> QuotationDetail {
    let margin = Margin::from_stored(quotation.margin_type, quotation.margin_value);

    let totals = quotation_totals(
        &items,
        &margin,
        quotation.freight_charges(),
        quotation.freight_gst_rate,
        quotation.installation_charges(),
        quotation.installation_gst_rate,
    );

    let item_views = items
        .into_iter()
        .map(|item| {
            let client_unit_price = margin_adjusted_unit_price(item.unit_price(), &margin);
            let line = line_item_totals(item.quantity, client_unit_price, item.gst_rate);
            QuotationItemView {
                client_unit_price_paise: client_unit_price.paise(),
                client_total_paise: line.total.paise(),
                item,
            }
        })
        .collect();

    QuotationDetail {
        items: item_views,
        totals: QuotationTotalsView {
            items_total_paise: totals.items_total.paise(),
            freight_total_paise: totals.freight.total.paise(),
            installation_total_paise: totals.installation.total.paise(),
            grand_total_paise: totals.grand_total.paise(),
        },
        quotation,
    }
}
